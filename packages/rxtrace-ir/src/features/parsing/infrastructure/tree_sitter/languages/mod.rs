//! Per-grammar node kind tables

pub mod typescript;
