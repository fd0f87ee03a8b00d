//! Configuration I/O (YAML loading)
//!
//! Defines the YAML schema. Every field except `version` is optional and
//! falls back to the default configuration.

use serde::{Deserialize, Serialize};

/// YAML Schema v1
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper_location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telemetry_sink: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_namespace: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_files_with_parse_errors: Option<bool>,
}

pub const SUPPORTED_VERSIONS: &[u32] = &[1];
