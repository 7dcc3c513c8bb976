//! Error types for schema construction.

use thiserror::Error;

/// Errors raised while building a [`ModelSchema`](crate::ModelSchema) or a
/// [`SchemaSet`](crate::SchemaSet).
///
/// These indicate a defect in the supplied model description and are never
/// recoverable at generation time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A schema violates one of its invariants.
    #[error("Invalid schema for '{model}': {reason}")]
    InvalidSchema {
        /// The `app/model` key of the offending schema.
        model: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl SchemaError {
    pub(crate) fn invalid(model: impl Into<String>, reason: impl Into<String>) -> Self {
        SchemaError::InvalidSchema {
            model: model.into(),
            reason: reason.into(),
        }
    }
}
