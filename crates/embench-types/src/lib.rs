//! Shared domain types for embench.
//!
//! Dataset and model descriptors, benchmark records, relevance judgments,
//! configuration, and the error taxonomy shared by every other crate.
//!
//! Zero infrastructure dependencies -- only serde and thiserror.

pub mod config;
pub mod dataset;
pub mod error;
pub mod model;
