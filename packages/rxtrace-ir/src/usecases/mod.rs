//! Usecase Layer - file and batch instrumentation
//!
//! Entry points for the command line front end and for build-tool
//! integrations that hand the pass one file at a time.

pub mod instrumentation_service;

pub use instrumentation_service::{
    BatchReport, FileReport, InstrumentationService, InstrumentedFile,
};
