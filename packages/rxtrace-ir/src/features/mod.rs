//! Feature modules
//!
//! Each feature follows Hexagonal Architecture:
//! - `domain/` - models and value types
//! - `ports/` - interfaces
//! - `infrastructure/` - implementations
//! - `application/` - use-case entry points

pub mod imports;
pub mod instrumentation;
pub mod parsing;
