//! Known OpenAI embedding models.

use embench_types::model::{EmbeddingDtype, ModelLoader, ModelMeta, Similarity};

const EMBEDDINGS_GUIDE: &str = "https://platform.openai.com/docs/guides/embeddings";

/// Input token limit shared by all current OpenAI embedding models.
pub const OPENAI_MAX_TOKENS: usize = 8191;

fn openai_model(model_name: &str, embd_dim: usize) -> ModelMeta {
    ModelMeta {
        loader: ModelLoader::OpenAi,
        model_name: model_name.to_string(),
        embd_dtype: EmbeddingDtype::Float32,
        embd_dim,
        max_tokens: Some(OPENAI_MAX_TOKENS),
        similarity: Similarity::Cosine,
        reference: Some(EMBEDDINGS_GUIDE.to_string()),
    }
}

pub fn text_embedding_3_small() -> ModelMeta {
    openai_model("text-embedding-3-small", 1536)
}

pub fn text_embedding_3_large() -> ModelMeta {
    openai_model("text-embedding-3-large", 3072)
}

pub fn text_embedding_ada_002() -> ModelMeta {
    openai_model("text-embedding-ada-002", 1536)
}

/// Every model in the catalog.
pub fn all() -> Vec<ModelMeta> {
    vec![
        text_embedding_3_small(),
        text_embedding_3_large(),
        text_embedding_ada_002(),
    ]
}

/// Look up a catalog entry by provider-side model name.
pub fn find(model_name: &str) -> Option<ModelMeta> {
    all().into_iter().find(|meta| meta.model_name == model_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_entries() {
        let large = text_embedding_3_large();
        assert_eq!(large.embd_dim, 3072);
        assert_eq!(large.max_tokens, Some(8191));
        assert_eq!(large.loader, ModelLoader::OpenAi);
        assert_eq!(large.similarity, Similarity::Cosine);
        assert_eq!(text_embedding_3_small().embd_dim, 1536);
    }

    #[test]
    fn test_catalog_names_are_unique() {
        let models = all();
        let mut names: Vec<_> = models.iter().map(|m| m.model_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), models.len());
    }

    #[test]
    fn test_find() {
        assert_eq!(find("text-embedding-ada-002"), Some(text_embedding_ada_002()));
        assert!(find("text-embedding-4").is_none());
    }
}
