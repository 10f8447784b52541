use crate::types::RecordId;

/// Error taxonomy shared by both storage substrates.
///
/// Adapters translate every native failure (sqlx errors, I/O errors, JSON
/// errors) into one of these variants so callers never see which substrate
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: RecordId },

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Backend failure: {0}")]
    BackendFailure(String),

    #[error("Serialization failure: {0}")]
    SerializationFailure(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] on `entity`.
    pub fn not_found(entity: &'static str, id: impl Into<RecordId>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Error returned when a scoped remote operation runs without a signed-in identity.
    pub fn no_identity() -> Self {
        Self::Unauthenticated("No authenticated identity".into())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationFailure(err.to_string())
    }
}

/// Result alias used at every service boundary.
pub type CoreResult<T> = Result<T, CoreError>;
