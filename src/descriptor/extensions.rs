//! Generator option decoding
//!
//! Foreign keys, loaders and method operations arrive as plain strings and
//! are decoded into typed values here. Malformed values are fatal.

use crate::error::{CompileError, Result};

/// A field-level reference to another message's key field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Fully qualified target message, with leading '.'
    pub full_name: String,
    pub field_name: String,
}

/// Batched lookup directive attached to a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loader {
    /// Fully qualified loaded message, with leading '.'
    pub full_name: String,
    pub many: bool,
    pub request_field_path: Vec<String>,
    pub response_field_path: Vec<String>,
    pub object_key_path: Vec<String>,
}

/// Root container a method is mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    Query,
    Mutation,
    Subscription,
    /// Method is not exposed
    None,
}

impl Operation {
    /// Parse the `operation` method option; absent means query
    pub fn parse(method: &str, value: Option<&str>) -> Result<Self> {
        match value.unwrap_or_default() {
            "" | "query" => Ok(Operation::Query),
            "mutation" => Ok(Operation::Mutation),
            "subscription" => Ok(Operation::Subscription),
            "none" => Ok(Operation::None),
            other => Err(CompileError::UnknownOperation {
                method: method.to_string(),
                operation: other.to_string(),
            }),
        }
    }

    /// Name of the root type this operation extends
    pub fn root_type(&self) -> Option<&'static str> {
        match self {
            Operation::Query => Some("Query"),
            Operation::Mutation => Some("Mutation"),
            Operation::Subscription => Some("Subscription"),
            Operation::None => None,
        }
    }
}

/// Decode `type:field`
pub fn parse_foreign_key(value: &str) -> Result<Option<ForeignKey>> {
    if value.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = value.split(':').collect();
    let [full_name, field_name] = parts.as_slice() else {
        return Err(CompileError::MalformedAnnotation {
            kind: "foreign key",
            expected: "protobuf_type:field_name",
            value: value.to_string(),
        });
    };

    Ok(Some(ForeignKey {
        full_name: qualify(full_name),
        field_name: field_name.to_string(),
    }))
}

/// Decode `type:request_path:response_path:key_path`
pub fn parse_loader(value: &str, many: bool) -> Result<Option<Loader>> {
    if value.is_empty() {
        return Ok(None);
    }

    let parts: Vec<&str> = value.split(':').collect();
    let [full_name, request, response, key] = parts.as_slice() else {
        return Err(CompileError::MalformedAnnotation {
            kind: "loader",
            expected: "protobuf_type:request_field_path:response_field_path:object_key_field_path",
            value: value.to_string(),
        });
    };

    Ok(Some(Loader {
        full_name: qualify(full_name),
        many,
        request_field_path: split_path(request),
        response_field_path: split_path(response),
        object_key_path: split_path(key),
    }))
}

fn qualify(name: &str) -> String {
    if name.starts_with('.') {
        name.to_string()
    } else {
        format!(".{name}")
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.').map(String::from).collect()
}
