//! Core contracts for embench.
//!
//! Two abstraction layers make heterogeneous benchmark inputs look identical
//! to scoring code:
//! - `dataset`: retrieval datasets with lazily materialized, memoized
//!   corpus/queries/relevance views and instruction prefixing
//! - `embedding`: embedding models, including API-backed models with token
//!   clipping and classified retry
//!
//! Concrete provider bindings live in `embench-infra`.

pub mod dataset;
pub mod embedding;
