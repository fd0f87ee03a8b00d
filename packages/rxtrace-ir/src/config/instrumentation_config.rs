//! Instrumentation configuration
//!
//! `InstrumentationConfig` is the plain, serializable settings record.
//! `validate()` turns it into a `ValidatedConfig`, which carries the compiled
//! exclusion patterns and identity generator the pass actually uses.

use std::ops::Deref;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{ConfigError, ConfigResult};
use super::io::{ConfigExportV1, SUPPORTED_VERSIONS};
use crate::shared::utils::{IdentityGenerator, DEFAULT_IDENTITY_NAMESPACE};

/// Module the wrapper functions are imported from
pub const DEFAULT_WRAPPER_LOCATION: &str = "rxjs-transformer/dist/rxjs_wrapper";

/// Function every wrapper reports through
pub const DEFAULT_TELEMETRY_SINK: &str = "sendToBackpage";

lazy_static! {
    static ref JS_IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid");
}

/// Instrumentation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentationConfig {
    /// Module specifier of the runtime wrapper library
    pub wrapper_location: String,

    /// Name of the telemetry sink exported by the wrapper library
    pub telemetry_sink: String,

    /// UUID namespace for construct identities
    pub identity_namespace: String,

    /// Path patterns (regex) never instrumented
    pub exclude: Vec<String>,

    /// File extensions visited by batch runs
    pub extensions: Vec<String>,

    /// Leave files with syntax errors untouched
    pub skip_files_with_parse_errors: bool,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            wrapper_location: DEFAULT_WRAPPER_LOCATION.to_string(),
            telemetry_sink: DEFAULT_TELEMETRY_SINK.to_string(),
            identity_namespace: DEFAULT_IDENTITY_NAMESPACE.to_string(),
            exclude: vec![
                r".+/rxjs_wrapper\.ts$".to_string(),
                r".+/node_modules/.+".to_string(),
            ],
            extensions: vec!["ts".to_string(), "tsx".to_string()],
            skip_files_with_parse_errors: true,
        }
    }
}

impl InstrumentationConfig {
    pub fn with_wrapper_location(mut self, location: impl Into<String>) -> Self {
        self.wrapper_location = location.into();
        self
    }

    pub fn with_telemetry_sink(mut self, sink: impl Into<String>) -> Self {
        self.telemetry_sink = sink.into();
        self
    }

    pub fn with_identity_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.identity_namespace = namespace.into();
        self
    }

    pub fn with_exclude(mut self, patterns: Vec<String>) -> Self {
        self.exclude = patterns;
        self
    }

    pub fn with_skip_files_with_parse_errors(mut self, skip: bool) -> Self {
        self.skip_files_with_parse_errors = skip;
        self
    }

    /// Load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        // Version check
        let version = export.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let defaults = Self::default();
        Ok(Self {
            wrapper_location: export.wrapper_location.unwrap_or(defaults.wrapper_location),
            telemetry_sink: export.telemetry_sink.unwrap_or(defaults.telemetry_sink),
            identity_namespace: export
                .identity_namespace
                .unwrap_or(defaults.identity_namespace),
            exclude: export.exclude.unwrap_or(defaults.exclude),
            extensions: export.extensions.unwrap_or(defaults.extensions),
            skip_files_with_parse_errors: export
                .skip_files_with_parse_errors
                .unwrap_or(defaults.skip_files_with_parse_errors),
        })
    }

    /// Export as YAML v1
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            wrapper_location: Some(self.wrapper_location.clone()),
            telemetry_sink: Some(self.telemetry_sink.clone()),
            identity_namespace: Some(self.identity_namespace.clone()),
            exclude: Some(self.exclude.clone()),
            extensions: Some(self.extensions.clone()),
            skip_files_with_parse_errors: Some(self.skip_files_with_parse_errors),
        };

        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }

    /// Check every field and compile the patterns
    pub fn validate(self) -> ConfigResult<ValidatedConfig> {
        if self.wrapper_location.trim().is_empty() {
            return Err(ConfigError::invalid(
                "wrapper_location",
                "\"\"",
                "The wrapper module specifier cannot be empty",
            ));
        }

        if !JS_IDENTIFIER.is_match(&self.telemetry_sink) {
            return Err(ConfigError::invalid(
                "telemetry_sink",
                &self.telemetry_sink,
                "Must be a valid JavaScript identifier",
            ));
        }

        let identity = IdentityGenerator::from_namespace_str(&self.identity_namespace)
            .map_err(|e| {
                ConfigError::invalid("identity_namespace", &self.identity_namespace, e.to_string())
            })?;

        let exclude = self
            .exclude
            .iter()
            .map(|pattern| {
                Regex::new(pattern)
                    .map_err(|e| ConfigError::invalid("exclude", pattern, e.to_string()))
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        if let Some(ext) = self
            .extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(ConfigError::invalid(
                "extensions",
                ext,
                "List extensions without the leading dot, e.g. 'ts'",
            ));
        }

        Ok(ValidatedConfig {
            config: self,
            exclude,
            identity,
        })
    }
}

/// Configuration that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    config: InstrumentationConfig,
    exclude: Vec<Regex>,
    identity: IdentityGenerator,
}

impl ValidatedConfig {
    pub fn config(&self) -> &InstrumentationConfig {
        &self.config
    }

    pub fn identity_generator(&self) -> IdentityGenerator {
        self.identity
    }

    /// Whether any exclusion pattern matches the path
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| pattern.is_match(&path))
    }

    /// Whether the path has one of the configured extensions
    pub fn accepts_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.config.extensions.iter().any(|e| e == ext))
            .unwrap_or(false)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        self.config.to_yaml()
    }
}

impl Deref for ValidatedConfig {
    type Target = InstrumentationConfig;

    fn deref(&self) -> &Self::Target {
        &self.config
    }
}

impl Default for ValidatedConfig {
    fn default() -> Self {
        let config = InstrumentationConfig::default();
        let exclude = config
            .exclude
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect();
        Self {
            config,
            exclude,
            identity: IdentityGenerator::default(),
        }
    }
}
