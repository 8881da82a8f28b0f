//! Identifier sources for new records.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

/// The identifier source could not produce an identifier.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct IdGenerationError(pub String);

/// Supplies globally unique identifiers for new records.
///
/// Uniqueness is the generator's responsibility; the store never checks
/// for collisions.
pub trait IdGenerator: Send + Sync {
    /// Produce a fresh identifier.
    fn next_id(&self) -> Result<String, IdGenerationError>;
}

impl<G: IdGenerator + ?Sized> IdGenerator for Arc<G> {
    fn next_id(&self) -> Result<String, IdGenerationError> {
        (**self).next_id()
    }
}

/// Time-ordered UUID (version 7) identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> Result<String, IdGenerationError> {
        Ok(Uuid::now_v7().hyphenated().to_string())
    }
}

/// Check that generated identifier text can be embedded in a record key.
///
/// Identifiers must be non-empty ASCII alphanumerics and hyphens.
pub fn validate_id(id: &str) -> Result<(), IdGenerationError> {
    if id.is_empty() {
        return Err(IdGenerationError("generator returned an empty identifier".into()));
    }
    if let Some(c) = id.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-')) {
        return Err(IdGenerationError(format!(
            "generator returned {:?} containing invalid character {:?}",
            id, c
        )));
    }
    Ok(())
}
