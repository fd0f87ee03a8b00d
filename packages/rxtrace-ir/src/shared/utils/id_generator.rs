//! Identity generation
//!
//! Construct identities are UUID v5 values derived from source coordinates.
//! The same `(file, line, start, end)` always yields the same identity, so a
//! construct can be referenced later from its coordinates alone, without
//! holding on to the node that produced it.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::shared::models::SourcePosition;

/// Default namespace for construct identities
pub const DEFAULT_IDENTITY_NAMESPACE: &str = "e01462c8-517f-11ea-8d77-2e728ce88125";

/// Deterministic, coordinate-derived construct identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity generator bound to a UUID namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityGenerator {
    namespace: Uuid,
}

impl IdentityGenerator {
    pub fn new(namespace: Uuid) -> Self {
        Self { namespace }
    }

    /// Parse the namespace from its hyphenated form
    pub fn from_namespace_str(namespace: &str) -> Result<Self, uuid::Error> {
        Ok(Self::new(Uuid::parse_str(namespace)?))
    }

    /// Generate the identity for a coordinate tuple
    ///
    /// Format of the hashed name: `{file}:{line}:{start}:{end}`
    pub fn generate(&self, file: &str, line: u32, start: usize, end: usize) -> Identity {
        let name = format!("{}:{}:{}:{}", file, line, start, end);
        Identity(Uuid::new_v5(&self.namespace, name.as_bytes()).to_string())
    }

    pub fn for_position(&self, position: &SourcePosition) -> Identity {
        self.generate(&position.file, position.line, position.start, position.end)
    }
}

impl Default for IdentityGenerator {
    fn default() -> Self {
        // The default namespace is a valid UUID literal.
        Self::new(Uuid::from_u128(0xe01462c8_517f_11ea_8d77_2e728ce88125))
    }
}

/// Generate an identity in the default namespace
pub fn generate_identity(file: &str, line: u32, start: usize, end: usize) -> Identity {
    IdentityGenerator::default().generate(file, line, start, end)
}
