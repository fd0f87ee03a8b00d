//! Error types for rxtrace-ir
//!
//! Provides unified error handling across the crate.

use thiserror::Error;

use crate::config::ConfigError;
use crate::features::instrumentation::domain::ConstructKind;
use crate::shared::models::SourcePosition;

/// Main error type for rxtrace-ir operations
#[derive(Debug, Error)]
pub enum TransformError {
    /// A lineage reference could not be resolved (recovered per node)
    #[error("Unresolved source '{name}' at {position}: {reason}")]
    UnresolvedSource {
        name: String,
        reason: String,
        position: SourcePosition,
    },

    /// A classified node does not have the shape its rewrite needs (recovered per node)
    #[error("Invalid {kind:?} node shape at {position}: {reason}")]
    InvalidNodeShape {
        kind: ConstructKind,
        reason: String,
        position: SourcePosition,
    },

    /// Classifier produced a kind the rewriter has no handler for (aborts the file)
    #[error("No rewrite handler for construct kind {0:?}")]
    UnknownConstruct(ConstructKind),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata literal serialization error
    #[error("Metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl TransformError {
    pub fn parse(msg: impl Into<String>) -> Self {
        TransformError::Parse(msg.into())
    }

    pub fn unresolved(
        name: impl Into<String>,
        reason: impl Into<String>,
        position: SourcePosition,
    ) -> Self {
        TransformError::UnresolvedSource {
            name: name.into(),
            reason: reason.into(),
            position,
        }
    }

    pub fn invalid_shape(
        kind: ConstructKind,
        reason: impl Into<String>,
        position: SourcePosition,
    ) -> Self {
        TransformError::InvalidNodeShape {
            kind,
            reason: reason.into(),
            position,
        }
    }

    /// Node-local failures leave the node unrewritten; everything else aborts the file
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TransformError::UnresolvedSource { .. } | TransformError::InvalidNodeShape { .. }
        )
    }

    /// Position of the offending node, for node-local failures
    pub fn position(&self) -> Option<&SourcePosition> {
        match self {
            TransformError::UnresolvedSource { position, .. }
            | TransformError::InvalidNodeShape { position, .. } => Some(position),
            _ => None,
        }
    }
}

/// Result type alias for rxtrace operations
pub type Result<T> = std::result::Result<T, TransformError>;
