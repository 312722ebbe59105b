//! DatasetSource trait definition.
//!
//! A source is the per-dataset loading logic: it knows how to turn raw files
//! under the dataset root into records and relevance judgments. Sources never
//! cache anything themselves; `RetrievalDataset` memoizes their output.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use embench_types::dataset::{DatasetMeta, RelevanceMap};
use embench_types::error::DatasetError;

use super::record::RecordSet;

/// What a source gets to see while loading: the resolved root directory and
/// the dataset's metadata.
#[derive(Debug, Clone)]
pub struct DatasetContext {
    pub(crate) root: PathBuf,
    pub(crate) meta: Arc<DatasetMeta>,
}

impl DatasetContext {
    /// Absolute `{data_path}/{dataset_name}` directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta(&self) -> &DatasetMeta {
        &self.meta
    }
}

/// Loading hooks for one retrieval dataset.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition). Every hook has
/// a default that fails with [`DatasetError::Unimplemented`]; a usable source
/// overrides all three. The failure only surfaces when the corresponding view
/// is first requested, never at construction.
pub trait DatasetSource: Send + Sync {
    /// Leaderboard this dataset reports under. Must be non-empty;
    /// `RetrievalDataset::new` rejects sources that leave it blank.
    const LEADERBOARD: &'static str = "";

    /// Load corpus documents as `{id, text}` records.
    fn corpus(
        &self,
        _ctx: &DatasetContext,
    ) -> impl Future<Output = Result<RecordSet, DatasetError>> + Send {
        async { Err(DatasetError::Unimplemented { hook: "corpus" }) }
    }

    /// Load queries as `{id, text}` records.
    fn queries(
        &self,
        _ctx: &DatasetContext,
    ) -> impl Future<Output = Result<RecordSet, DatasetError>> + Send {
        async { Err(DatasetError::Unimplemented { hook: "queries" }) }
    }

    /// Load graded judgments keyed by query id, then corpus id.
    fn relevance(
        &self,
        _ctx: &DatasetContext,
    ) -> impl Future<Output = Result<RelevanceMap, DatasetError>> + Send {
        async { Err(DatasetError::Unimplemented { hook: "relevance" }) }
    }
}
