//! Configuration
//!
//! Settings for the instrumentation pass: where the runtime wrappers live,
//! which sink they report through, how identities are namespaced and which
//! files a batch run visits.
//!
//! # Examples
//!
//! ```rust,ignore
//! use rxtrace_ir::config::InstrumentationConfig;
//!
//! // Defaults
//! let config = InstrumentationConfig::default().validate()?;
//!
//! // From YAML (`version: 1` required)
//! let config = InstrumentationConfig::from_yaml("rxtrace.yaml")?.validate()?;
//! ```

pub mod error;
pub mod instrumentation_config;
pub mod io;

pub use error::{ConfigError, ConfigResult};
pub use instrumentation_config::{
    InstrumentationConfig, ValidatedConfig, DEFAULT_TELEMETRY_SINK, DEFAULT_WRAPPER_LOCATION,
};
