//! Utility modules shared across features
//!
//! - `id_generator`: deterministic construct identities

pub mod id_generator;

pub use id_generator::{generate_identity, Identity, IdentityGenerator, DEFAULT_IDENTITY_NAMESPACE};
