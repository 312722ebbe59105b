//! Retrieval dataset abstractions.
//!
//! - `RecordSet`: ordered container of `{id, text}` records
//! - `add_instruction`: instruction-prefix transformation
//! - `DatasetSource`: loading hooks a concrete dataset supplies
//! - `RetrievalDataset`: memoizing wrapper exposing corpus/queries/relevance

pub mod instruction;
pub mod record;
pub mod retrieval;
pub mod source;

pub use instruction::add_instruction;
pub use record::RecordSet;
pub use retrieval::{DatasetOptions, RetrievalDataset};
pub use source::{DatasetContext, DatasetSource};
