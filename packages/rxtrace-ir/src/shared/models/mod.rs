//! Shared models

mod span;

pub use span::{SourcePosition, Span};

pub use crate::errors::{Result, TransformError};
