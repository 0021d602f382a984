//! Error types for sealdex search
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//! Absent keys (a gram or document missing from the index) are not errors;
//! they resolve to empty results or zero score contributions.

use sealdex_crypto::CipherError;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type alias for sealdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage that produced an empty or unusable result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationStage {
    /// The document source could not be read
    SourceRead,
    /// Document tokenization produced no tokens
    Tokenization,
    /// Document n-gram generation produced no grams
    NgramGeneration,
    /// Query tokenization produced no tokens
    QueryTokenization,
    /// Query n-gram generation produced no grams
    QueryNgramGeneration,
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValidationStage::SourceRead => "source read",
            ValidationStage::Tokenization => "tokenization",
            ValidationStage::NgramGeneration => "n-gram generation",
            ValidationStage::QueryTokenization => "query tokenization",
            ValidationStage::QueryNgramGeneration => "query n-gram generation",
        };
        f.write_str(name)
    }
}

/// Error types for sealdex
#[derive(Debug, Error)]
pub enum Error {
    /// A pipeline stage produced an empty or unreadable result
    #[error("Validation error at {stage}: {detail}")]
    Validation {
        /// Failing stage
        stage: ValidationStage,
        /// Human-readable description
        detail: String,
    },

    /// Cipher failure, surfaced unchanged
    #[error("Crypto error: {0}")]
    Crypto(#[from] CipherError),

    /// Persisted snapshot does not match the term → document → positions shape
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Snapshot could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration file unreadable or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error outside a validation stage (snapshot or stop-word files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a validation error for the given stage
    pub fn validation(stage: ValidationStage, detail: impl Into<String>) -> Self {
        Error::Validation {
            stage,
            detail: detail.into(),
        }
    }

    /// Stage of a validation error, if this is one
    pub fn validation_stage(&self) -> Option<ValidationStage> {
        match self {
            Error::Validation { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
