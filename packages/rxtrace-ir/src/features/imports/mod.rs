//! Import synthesis
//!
//! Adds the wrapper imports a rewritten file needs at the top of the file.

mod synthesis;

pub use synthesis::{existing_imports, synthesize_imports};
