//! Memoizing retrieval dataset wrapper.
//!
//! `RetrievalDataset` owns a [`DatasetSource`] and exposes its three views
//! (corpus, queries, relevance). Each view is loaded on first request, has its
//! instruction prefix applied once, and is cached for the lifetime of the
//! dataset. Concurrent first requests share a single load.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;

use embench_types::config::HarnessConfig;
use embench_types::dataset::{DatasetMeta, RelevanceMap};
use embench_types::error::DatasetError;

use super::instruction::add_instruction;
use super::record::RecordSet;
use super::source::{DatasetContext, DatasetSource};

/// Construction-time options for a [`RetrievalDataset`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetOptions {
    pub query_instruction: Option<String>,
    pub corpus_instruction: Option<String>,
}

impl DatasetOptions {
    /// Options carrying the harness-wide default instructions.
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            query_instruction: config.query_instruction.clone(),
            corpus_instruction: config.corpus_instruction.clone(),
        }
    }

    pub fn with_query_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.query_instruction = Some(instruction.into());
        self
    }

    pub fn with_corpus_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.corpus_instruction = Some(instruction.into());
        self
    }
}

/// A retrieval benchmark dataset with lazily materialized views.
pub struct RetrievalDataset<S> {
    source: S,
    ctx: DatasetContext,
    query_instruction: Option<String>,
    corpus_instruction: Option<String>,
    corpus: OnceCell<RecordSet>,
    queries: OnceCell<RecordSet>,
    relevance: OnceCell<RelevanceMap>,
}

impl<S> std::fmt::Debug for RetrievalDataset<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalDataset")
            .field("dataset_name", &self.ctx.meta.dataset_name)
            .field("root", &self.ctx.root)
            .field("corpus_loaded", &self.corpus.initialized())
            .field("queries_loaded", &self.queries.initialized())
            .field("relevance_loaded", &self.relevance.initialized())
            .finish()
    }
}

impl<S: DatasetSource> RetrievalDataset<S> {
    /// Create a dataset rooted at `{data_path}/{dataset_name}`.
    ///
    /// Fails with [`DatasetError::Configuration`] when the source does not
    /// declare a leaderboard. No data is loaded here.
    pub fn new(
        data_path: impl AsRef<Path>,
        meta: Arc<DatasetMeta>,
        source: S,
        options: DatasetOptions,
    ) -> Result<Self, DatasetError> {
        if S::LEADERBOARD.trim().is_empty() {
            return Err(DatasetError::Configuration(format!(
                "dataset '{}' does not declare a leaderboard",
                meta.dataset_name
            )));
        }

        let root = normalize_root(&data_path.as_ref().join(&meta.dataset_name))?;

        Ok(Self {
            source,
            ctx: DatasetContext { root, meta },
            query_instruction: options.query_instruction,
            corpus_instruction: options.corpus_instruction,
            corpus: OnceCell::new(),
            queries: OnceCell::new(),
            relevance: OnceCell::new(),
        })
    }

    /// Corpus records, with the corpus instruction applied if configured.
    ///
    /// The source is consulted at most once; later calls return the cached
    /// set. A failed load is not cached.
    pub async fn corpus(&self) -> Result<&RecordSet, DatasetError> {
        self.corpus
            .get_or_try_init(|| async {
                let corpus = self.source.corpus(&self.ctx).await?;
                let corpus = match self.corpus_instruction.as_deref() {
                    Some(instruction) => add_instruction(corpus, instruction),
                    None => corpus,
                };
                tracing::info!(
                    dataset = %self.ctx.meta.dataset_name,
                    records = corpus.len(),
                    "Materialized corpus"
                );
                Ok::<_, DatasetError>(corpus)
            })
            .await
    }

    /// Query records, with the query instruction applied if configured.
    pub async fn queries(&self) -> Result<&RecordSet, DatasetError> {
        self.queries
            .get_or_try_init(|| async {
                let queries = self.source.queries(&self.ctx).await?;
                let queries = match self.query_instruction.as_deref() {
                    Some(instruction) => add_instruction(queries, instruction),
                    None => queries,
                };
                tracing::info!(
                    dataset = %self.ctx.meta.dataset_name,
                    records = queries.len(),
                    "Materialized queries"
                );
                Ok::<_, DatasetError>(queries)
            })
            .await
    }

    /// Relevance judgments, loaded once and cached.
    pub async fn relevance(&self) -> Result<&RelevanceMap, DatasetError> {
        self.relevance
            .get_or_try_init(|| async {
                let relevance = self.source.relevance(&self.ctx).await?;
                tracing::info!(
                    dataset = %self.ctx.meta.dataset_name,
                    queries = relevance.len(),
                    "Materialized relevance judgments"
                );
                Ok::<_, DatasetError>(relevance)
            })
            .await
    }

    /// Force materialization of corpus, queries, and relevance.
    pub async fn prepare_data(&self) -> Result<(), DatasetError> {
        self.corpus().await?;
        self.queries().await?;
        self.relevance().await?;
        Ok(())
    }

    /// Query ids that have judgments but no matching query record, sorted.
    ///
    /// Loading code is responsible for keeping these consistent; this is a
    /// check for test suites and sanity tooling, not enforced on access.
    pub async fn check_consistency(&self) -> Result<Vec<String>, DatasetError> {
        let queries = self.queries().await?;
        let relevance = self.relevance().await?;

        let known: HashSet<&str> = queries.iter().map(|r| r.id.as_str()).collect();
        let mut orphans: Vec<String> = relevance
            .keys()
            .filter(|id| !known.contains(id.as_str()))
            .cloned()
            .collect();
        orphans.sort();
        Ok(orphans)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn leaderboard(&self) -> &'static str {
        S::LEADERBOARD
    }
}

/// Absolute form of `path` with `.` and `..` folded away.
///
/// Folding is lexical; symlinks are left unresolved so the root can be
/// computed before the directory exists.
fn normalize_root(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

// Metadata passthrough.
impl<S> RetrievalDataset<S> {
    pub fn metadata(&self) -> &DatasetMeta {
        &self.ctx.meta
    }

    pub fn dataset_name(&self) -> &str {
        &self.ctx.meta.dataset_name
    }

    pub fn category(&self) -> Option<&str> {
        self.ctx.meta.category.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.ctx.meta.display_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.ctx.meta.description.as_deref()
    }

    pub fn reference(&self) -> Option<&str> {
        self.ctx.meta.reference.as_deref()
    }

    /// Absolute directory the source loads from.
    pub fn root(&self) -> &Path {
        &self.ctx.root
    }

    pub fn query_instruction(&self) -> Option<&str> {
        self.query_instruction.as_deref()
    }

    pub fn corpus_instruction(&self) -> Option<&str> {
        self.corpus_instruction.as_deref()
    }
}
