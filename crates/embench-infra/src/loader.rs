//! Model construction from a static descriptor.
//!
//! [`load_model`] dispatches on [`ModelMeta::loader`] and returns a
//! type-erased [`BoxEmbeddingModel`], so callers can hold models from any
//! provider side by side.

use std::sync::Arc;

use embench_core::embedding::{BoxEmbeddingModel, ModelOptions};
use embench_types::model::{ModelLoader, ModelMeta};

use crate::openai::{OpenAiBinding, OpenAiEmbeddingModel};

/// Build the embedding model described by `meta`.
///
/// Construction never touches the network: provider clients and tokenizers
/// are built lazily on the first `embed` call.
pub fn load_model(meta: Arc<ModelMeta>, options: &ModelOptions) -> BoxEmbeddingModel {
    tracing::debug!(
        loader = %meta.loader,
        model = %meta.model_name,
        "Loading embedding model"
    );
    match meta.loader {
        ModelLoader::OpenAi => {
            let binding = OpenAiBinding::from_options(options);
            BoxEmbeddingModel::new(OpenAiEmbeddingModel::new(meta, binding, options))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::catalog;
    use embench_core::embedding::EmbeddingModel;

    #[test]
    fn test_load_openai_model() {
        let meta = Arc::new(catalog::text_embedding_3_small());
        let model = load_model(meta, &ModelOptions::default().with_api_key("sk-test"));
        assert_eq!(model.model_name(), "text-embedding-3-small");
        assert_eq!(model.dimension(), 1536);
        assert_eq!(model.max_tokens(), Some(8191));
    }

    #[tokio::test]
    async fn test_loaded_model_short_circuits_empty_batch() {
        let meta = Arc::new(catalog::text_embedding_3_large());
        let model = load_model(meta, &ModelOptions::default());
        // No texts means no client is needed, so a missing key is fine.
        let vectors = model.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[test]
    fn test_load_all_catalog_models() {
        let options = ModelOptions::default();
        let models: Vec<_> = catalog::all()
            .into_iter()
            .map(|meta| load_model(Arc::new(meta), &options))
            .collect();
        assert_eq!(models.len(), 3);
        assert!(format!("{:?}", models[0]).contains("text-embedding-3-small"));
    }
}
