//! Error types for the modelport generator.

use modelport_define::SchemaError;
use thiserror::Error;

use crate::registry::{ArtifactKind, StackId};

/// Errors that can occur while loading, rendering or writing artifacts.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// An identifier contains characters no target language accepts.
    #[error("Invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier { identifier: String, reason: String },

    /// The `(stack, artifact)` pair has no registered template.
    #[error("No template registered for stack '{stack}' and artifact '{artifact}'")]
    UnknownTarget { stack: String, artifact: String },

    /// A template references a binding that was not supplied.
    #[error("Template '{template}' references missing context key '{key}'")]
    MissingContextKey { template: String, key: String },

    /// A template body is malformed.
    ///
    /// Built-in and override templates are parsed when the registry is
    /// created, so this normally surfaces at startup.
    #[error("Template '{template}' is malformed: {message}")]
    TemplateSyntaxError { template: String, message: String },

    /// The template engine failed for another reason (e.g. a helper error).
    #[error("Failed to render template '{template}': {message}")]
    Render { template: String, message: String },

    /// A stack registered two templates for the same artifact kind.
    #[error("Stack '{stack}' registers artifact '{artifact}' more than once")]
    DuplicateRegistration { stack: String, artifact: String },

    /// An output path rule uses an unknown or out-of-scope placeholder.
    #[error("Invalid path rule '{rule}': {reason}")]
    InvalidPathRule { rule: String, reason: String },

    /// Two artifacts of one run resolved to the same output path.
    #[error("Output path '{path}' is produced more than once")]
    PathCollision { path: String },

    /// A model schema violates an invariant.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Failed to parse a schema document
    #[error("Failed to parse schema document: {0}")]
    ParseError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Failed to read an input file
    #[error("Failed to read '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl GeneratorError {
    pub(crate) fn unknown_target(stack: StackId, artifact: ArtifactKind) -> Self {
        GeneratorError::UnknownTarget {
            stack: stack.to_string(),
            artifact: artifact.to_string(),
        }
    }
}

/// A failure tied to one `(stack, schema, artifact)` coordinate.
///
/// `application` and `model` are both set for per-model artifacts, only
/// `application` is set for per-application aggregates, and neither is set
/// for per-run artifacts.
#[derive(Debug, Error)]
#[error("{stack}:{artifact} [{}]: {error}", describe_scope(.application, .model))]
pub struct TargetFailure {
    pub stack: StackId,
    pub artifact: ArtifactKind,
    pub application: Option<String>,
    pub model: Option<String>,
    #[source]
    pub error: GeneratorError,
}

fn describe_scope(application: &Option<String>, model: &Option<String>) -> String {
    match (application, model) {
        (Some(app), Some(model)) => format!("{app}/{model}"),
        (Some(app), None) => app.clone(),
        _ => "*".to_string(),
    }
}
