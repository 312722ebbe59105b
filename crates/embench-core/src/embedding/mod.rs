//! Embedding model abstractions for embench.
//!
//! - `EmbeddingModel`: RPITIT trait every embedding model implements
//! - `BoxEmbeddingModel`: Object-safe wrapper for dynamic dispatch
//! - `ProviderBinding`: client/tokenizer/error-classification hooks of a remote API
//! - `ApiEmbeddingModel`: remote-provider model with token clipping and retry
//! - `RetryPolicy`: classified retry with exponential backoff

pub mod api;
pub mod box_model;
pub mod model;
pub mod provider;
pub mod retry;

pub use api::ApiEmbeddingModel;
pub use box_model::BoxEmbeddingModel;
pub use model::{EmbeddingModel, ModelOptions};
pub use provider::{EmbeddingClient, ProviderBinding, Tokenizer};
pub use retry::{RetryClass, RetryPolicy};
