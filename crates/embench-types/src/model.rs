//! Embedding model descriptors.
//!
//! A [`ModelMeta`] is a static catalog record: which loader builds the model,
//! the provider-side model name, and the shape of the vectors it produces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which binding knows how to construct a model from its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelLoader {
    #[serde(rename = "openai")]
    OpenAi,
}

impl fmt::Display for ModelLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelLoader::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for ModelLoader {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "openai" => Ok(ModelLoader::OpenAi),
            other => Err(format!("unknown model loader: '{other}'")),
        }
    }
}

/// Numeric type of the returned embedding components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingDtype {
    Float32,
    Float16,
    Int8,
    Binary,
}

impl fmt::Display for EmbeddingDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddingDtype::Float32 => write!(f, "float32"),
            EmbeddingDtype::Float16 => write!(f, "float16"),
            EmbeddingDtype::Int8 => write!(f, "int8"),
            EmbeddingDtype::Binary => write!(f, "binary"),
        }
    }
}

impl FromStr for EmbeddingDtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float32" => Ok(EmbeddingDtype::Float32),
            "float16" => Ok(EmbeddingDtype::Float16),
            "int8" => Ok(EmbeddingDtype::Int8),
            "binary" => Ok(EmbeddingDtype::Binary),
            other => Err(format!("unknown embedding dtype: '{other}'")),
        }
    }
}

/// Similarity function the scorer should use for this model's vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Similarity {
    Cosine,
    Dot,
    Euclidean,
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Cosine => write!(f, "cosine"),
            Similarity::Dot => write!(f, "dot"),
            Similarity::Euclidean => write!(f, "euclidean"),
        }
    }
}

impl FromStr for Similarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cosine" => Ok(Similarity::Cosine),
            "dot" => Ok(Similarity::Dot),
            "euclidean" => Ok(Similarity::Euclidean),
            other => Err(format!("unknown similarity: '{other}'")),
        }
    }
}

/// Static descriptor for an embedding model.
///
/// Created once at catalog-definition time and shared by every model
/// instance built from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMeta {
    pub loader: ModelLoader,
    /// Provider-side model identifier (e.g., "text-embedding-3-small").
    pub model_name: String,
    pub embd_dtype: EmbeddingDtype,
    pub embd_dim: usize,
    /// Inputs longer than this many tokens are clipped before submission.
    #[serde(default)]
    pub max_tokens: Option<usize>,
    pub similarity: Similarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}
