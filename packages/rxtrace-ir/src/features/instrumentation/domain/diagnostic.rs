//! Per-node diagnostics for recovered failures

use serde::{Deserialize, Serialize};

use crate::errors::TransformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    UnresolvedSource,
    InvalidNodeShape,
}

/// A node that matched a construct but was left unrewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub position: usize,
}

impl Diagnostic {
    /// Build a diagnostic from a node-local error; `None` for any other error
    pub fn from_error(error: &TransformError) -> Option<Self> {
        let kind = match error {
            TransformError::UnresolvedSource { .. } => DiagnosticKind::UnresolvedSource,
            TransformError::InvalidNodeShape { .. } => DiagnosticKind::InvalidNodeShape,
            _ => return None,
        };
        let position = error.position()?;
        Some(Self {
            kind,
            message: error.to_string(),
            file: position.file.clone(),
            line: position.line,
            column: position.column,
            position: position.start,
        })
    }
}
