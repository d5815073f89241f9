//! Error types for the model layer.

use runway_events::EventError;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur in model operations.
///
/// Mutations and event dispatch never fail; errors come from snapshots and
/// from loading definitions out of schema documents.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A snapshot reached an entity or collection already on the current path.
    #[error("cyclic containment at {path}")]
    Cycle { path: String },

    /// A field name cannot be used to build its `change:<name>` event.
    #[error("invalid field name: {0}")]
    FieldName(#[from] EventError),

    /// A schema document is structurally invalid.
    #[error("schema error: {0}")]
    Schema(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
