//! Infrastructure layer for embench.
//!
//! Contains implementations of the provider traits defined in `embench-core`:
//! the OpenAI embedding binding (async-openai client, tiktoken tokenizer),
//! its model catalog, loader dispatch from `ModelMeta`, harness config
//! loading, and environment credential lookup.

pub mod config;
pub mod loader;
pub mod openai;
pub mod secret;
