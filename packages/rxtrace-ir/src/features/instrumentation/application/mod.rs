//! Instrumentation application layer
//!
//! `transform_file` is the only entry point into the pass; callers never
//! drive the infrastructure components directly.

mod transform_file;

pub use transform_file::{transform_file, FileTransform};
