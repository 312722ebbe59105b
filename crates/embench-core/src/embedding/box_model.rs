//! BoxEmbeddingModel -- object-safe dynamic dispatch wrapper for EmbeddingModel.
//!
//! 1. Define an object-safe `EmbeddingModelDyn` trait with boxed futures
//! 2. Blanket-impl `EmbeddingModelDyn` for all `T: EmbeddingModel`
//! 3. `BoxEmbeddingModel` wraps `Box<dyn EmbeddingModelDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use embench_types::error::EmbeddingError;
use embench_types::model::ModelMeta;

use super::model::EmbeddingModel;

/// Object-safe version of [`EmbeddingModel`] with boxed futures.
///
/// A blanket implementation is provided for all types implementing
/// `EmbeddingModel`.
pub trait EmbeddingModelDyn: Send + Sync {
    fn embed_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send + 'a>>;

    fn metadata_dyn(&self) -> &ModelMeta;
}

impl<T: EmbeddingModel> EmbeddingModelDyn for T {
    fn embed_boxed<'a>(
        &'a self,
        texts: &'a [String],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, EmbeddingError>> + Send + 'a>> {
        Box::pin(self.embed(texts))
    }

    fn metadata_dyn(&self) -> &ModelMeta {
        self.metadata()
    }
}

/// Type-erased embedding model for runtime selection.
///
/// Lets a benchmark run hold models from different providers in one
/// collection. Since `EmbeddingModel` uses RPITIT, it cannot be used as a
/// trait object directly; `BoxEmbeddingModel` itself implements
/// `EmbeddingModel` by delegating to the inner `EmbeddingModelDyn`.
pub struct BoxEmbeddingModel {
    inner: Box<dyn EmbeddingModelDyn + Send + Sync>,
}

impl BoxEmbeddingModel {
    /// Wrap a concrete `EmbeddingModel` in a type-erased box.
    pub fn new<T: EmbeddingModel + 'static>(model: T) -> Self {
        Self {
            inner: Box::new(model),
        }
    }
}

impl EmbeddingModel for BoxEmbeddingModel {
    fn metadata(&self) -> &ModelMeta {
        self.inner.metadata_dyn()
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.inner.embed_boxed(texts).await
    }
}

impl std::fmt::Debug for BoxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxEmbeddingModel")
            .field("model_name", &self.metadata().model_name)
            .finish()
    }
}
