//! Instrumentation infrastructure
//!
//! Per-file pass components. A [`FileContext`] holds the read-only view of
//! the original tree; the [`SymbolResolver`] and [`DependencyTracker`] are
//! the only mutable state and live for one file.

pub mod classifier;
pub mod context;
pub mod declarations;
pub mod dependency_tracker;
pub mod operators;
pub mod resolver;
pub mod rewriter;
pub mod shapes;
pub mod synthesizer;
pub mod tree_index;

pub use classifier::{Classification, Classifier};
pub use context::{FileContext, ANONYMOUS};
pub use declarations::{Declaration, DeclarationIndex, DeclarationKind, DeclarationLookup};
pub use dependency_tracker::DependencyTracker;
pub use resolver::{Binding, ObservableBinding, PipeBinding, Source, SymbolResolver};
pub use rewriter::{Rewrite, Rewriter};
pub use synthesizer::{MetadataSynthesizer, Synthesis};
pub use tree_index::TreeIndex;
