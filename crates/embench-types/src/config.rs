//! Harness configuration types.
//!
//! `HarnessConfig` represents the top-level `embench.toml` that controls the
//! data root, retry behavior for API-backed models, and default instructions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration for a benchmark run.
///
/// Loaded from `embench.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Base directory that dataset names are resolved against.
    #[serde(default = "default_data_path")]
    pub data_path: PathBuf,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Instruction prepended to every query unless a dataset overrides it.
    #[serde(default)]
    pub query_instruction: Option<String>,

    /// Instruction prepended to every corpus document unless a dataset overrides it.
    #[serde(default)]
    pub corpus_instruction: Option<String>,
}

fn default_data_path() -> PathBuf {
    PathBuf::from("data")
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            retry: RetryConfig::default(),
            query_instruction: None,
            corpus_instruction: None,
        }
    }
}

/// Retry budget and backoff curve for remote provider calls.
///
/// Retry `n` (0-based) waits `min(initial_backoff_ms * 2^n, max_backoff_ms)`
/// plus up to `jitter_ms` of random jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts = `num_retries + 1`.
    #[serde(default = "default_num_retries")]
    pub num_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

fn default_num_retries() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    1_000
}

fn default_max_backoff_ms() -> u64 {
    60_000
}

fn default_jitter_ms() -> u64 {
    500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            num_retries: default_num_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}
