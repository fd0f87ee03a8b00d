//! Construct kinds and the wrapper each one is rewritten with

use serde::{Deserialize, Serialize};
use std::fmt;

pub const WRAP_CREATION_OPERATOR: &str = "wrapCreationOperator";
pub const WRAP_JOIN_CREATION_OPERATOR: &str = "wrapJoinCreationOperator";
pub const WRAP_PIPE: &str = "wrapPipe";
pub const WRAP_PIPEABLE_OPERATOR: &str = "wrapPipeableOperator";
pub const WRAP_SUBSCRIBE: &str = "wrapSubscribe";
pub const WRAP_OBSERVABLE_SUBJECT_CONSTRUCTOR: &str = "wrapObservableSubjectConstructor";
pub const WRAP_PROPERTY_DECLARATION: &str = "wrapPropertyDeclaration";

/// Closed set of stream constructs the pass recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstructKind {
    CreationOperator,
    JoinCreationOperator,
    Pipe,
    PipeableOperator,
    Subscribe,
    ObjectOrSubjectConstructor,
    PropertyDeclaration,
    Unclassified,
}

impl ConstructKind {
    /// Runtime wrapper function the rewrite of this kind calls
    pub fn wrapper_name(&self) -> Option<&'static str> {
        match self {
            ConstructKind::CreationOperator => Some(WRAP_CREATION_OPERATOR),
            ConstructKind::JoinCreationOperator => Some(WRAP_JOIN_CREATION_OPERATOR),
            ConstructKind::Pipe => Some(WRAP_PIPE),
            ConstructKind::PipeableOperator => Some(WRAP_PIPEABLE_OPERATOR),
            ConstructKind::Subscribe => Some(WRAP_SUBSCRIBE),
            ConstructKind::ObjectOrSubjectConstructor => Some(WRAP_OBSERVABLE_SUBJECT_CONSTRUCTOR),
            ConstructKind::PropertyDeclaration => Some(WRAP_PROPERTY_DECLARATION),
            ConstructKind::Unclassified => None,
        }
    }

    pub fn is_classified(&self) -> bool {
        !matches!(self, ConstructKind::Unclassified)
    }
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstructKind::CreationOperator => "creation operator",
            ConstructKind::JoinCreationOperator => "join creation operator",
            ConstructKind::Pipe => "pipe",
            ConstructKind::PipeableOperator => "pipeable operator",
            ConstructKind::Subscribe => "subscribe",
            ConstructKind::ObjectOrSubjectConstructor => "observable/subject constructor",
            ConstructKind::PropertyDeclaration => "property declaration",
            ConstructKind::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// Position of a pipeable operator inside its pipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorPosition {
    First,
    Middle,
    Last,
    Only,
}

impl OperatorPosition {
    /// Derive the position from the operator's index among `len` operators
    pub fn from_index(index: usize, len: usize) -> Self {
        match (index, len) {
            (_, 0 | 1) => OperatorPosition::Only,
            (0, _) => OperatorPosition::First,
            (i, n) if i + 1 == n => OperatorPosition::Last,
            _ => OperatorPosition::Middle,
        }
    }
}
