//! Error types for the GraphQL schema compiler

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Compiler errors
///
/// Every failure aborts the whole compilation; there is no partial output.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("missing type for {0}")]
    MissingParameterValue(String),

    #[error("invalid value '{value}' for parameter {key}")]
    InvalidParameterValue { key: String, value: String },

    #[error("{kind} expected to have format '{expected}', got '{value}'")]
    MalformedAnnotation {
        kind: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("unknown operation '{operation}' on method {method}")]
    UnknownOperation { method: String, operation: String },

    #[error("unorderable message cycles: {}", format_cycles(.0))]
    Cycle(Vec<Vec<String>>),

    #[error("type {name} referenced from {referrer} is not defined")]
    UnresolvedType { name: String, referrer: String },

    #[error("field {field} has unsupported type {kind}")]
    UnsupportedFieldType { field: String, kind: String },

    #[error("field {field} is declared more than once on {message}")]
    DuplicateField { message: String, field: String },

    #[error("enum {0} has no values left after skipping")]
    EmptyEnum(String),

    #[error("configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    pub(crate) fn unresolved(name: impl Into<String>, referrer: impl Into<String>) -> Self {
        Self::UnresolvedType {
            name: name.into(),
            referrer: referrer.into(),
        }
    }
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|set| format!("[{}]", set.join(", ")))
        .collect::<Vec<_>>()
        .join(", ")
}
