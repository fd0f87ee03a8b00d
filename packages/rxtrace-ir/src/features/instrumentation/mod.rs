//! Stream instrumentation pass
//!
//! Classifies RxJS constructs in a parsed TypeScript file and rewrites each
//! into a curried wrapper call carrying a telemetry metadata literal.

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{transform_file, FileTransform};
pub use domain::{
    ConstructKind, ConstructMetadata, Dependency, Diagnostic, DiagnosticKind,
    InstrumentedConstruct, OperatorPosition,
};
