/*
 * rxtrace IR - RxJS Stream Instrumentation Pass
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Span, SourcePosition) and identity generation
 * - features/    : Vertical slices (parsing → instrumentation → imports)
 * - config/      : Settings, YAML loading, validation
 * - usecases/    : File and batch instrumentation
 *
 * Performance:
 * - One owned syntax tree per file, single rewrite pass
 * - Rayon work-stealing across files
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Builder helpers take the full node context
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::single_match)] // Single match for readability

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (vertical slices)
pub mod features;

/// Configuration
pub mod config;

/// Error types
pub mod errors;

/// File and batch entry points
pub mod usecases;

pub use config::{InstrumentationConfig, ValidatedConfig};
pub use errors::{Result, TransformError};
pub use features::instrumentation::{
    transform_file, ConstructKind, ConstructMetadata, Dependency, Diagnostic, FileTransform,
    InstrumentedConstruct,
};
pub use features::parsing::{ParsedTree, Parser, SyntaxNode, TreeSitterParser};
pub use usecases::{BatchReport, FileReport, InstrumentationService, InstrumentedFile};
