//! Search Error Types
//!
//! Error handling for the text-indexing and query-construction pipeline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// External capabilities the pipeline delegates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Tokenizer,
    Stemmer,
    Vectorizer,
    Identifier,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tokenizer => write!(f, "tokenizer"),
            Self::Stemmer => write!(f, "stemmer"),
            Self::Vectorizer => write!(f, "vectorizer"),
            Self::Identifier => write!(f, "language identifier"),
        }
    }
}

/// Search pipeline errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{capability} failed: {message}")]
    Capability {
        capability: Capability,
        message: String,
    },

    #[error("Failed to read resource {path}: {source}")]
    Resource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed YAML resource: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("Malformed JSON resource: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern for rule '{rule}': {source}")]
    Pattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed term vector: {0}")]
    MalformedVector(String),

    #[error("Unsupported language detected in: {0}")]
    UnsupportedLanguage(String),
}

impl SearchError {
    /// Wrap a failure reported by an external capability.
    pub fn capability(capability: Capability, message: impl Into<String>) -> Self {
        Self::Capability {
            capability,
            message: message.into(),
        }
    }

    /// The capability that failed, if this is a capability failure.
    pub fn failed_capability(&self) -> Option<Capability> {
        match self {
            Self::Capability { capability, .. } => Some(*capability),
            _ => None,
        }
    }
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
