//! Generator configuration
//!
//! Supports loading parameters from:
//! - Default values
//! - Config file (protoc-gen-graphql.toml)
//! - Environment variables (PROTOC_GEN_GRAPHQL__*)
//! - The protoc parameter string (`timestamp=DateTime,null_wrappers`)
//!
//! ## Example config file (protoc-gen-graphql.toml):
//! ```toml
//! timestamp = "DateTime"
//! null_wrappers = true
//! input_mode = "service"
//! js_64bit_type = "string"
//! field_name = "lower_camel_case"
//! trim_prefix = "Acme_"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// Which messages get an input-mode shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// No input types (and therefore no service root types)
    None,
    /// Inputs for the closure of every mapped method's request message
    #[default]
    Service,
    /// Inputs for every message
    All,
}

/// How 64-bit integers are exposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Int64Type {
    #[default]
    String,
    Number,
}

/// Casing applied to field and method display names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldNameMode {
    #[default]
    LowerCamelCase,
    Preserve,
}

/// Generator parameters, threaded explicitly through every mapping call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Scalar replacing `.google.protobuf.Timestamp`
    #[serde(rename = "timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp_type_name: Option<String>,

    /// Scalar replacing `.google.protobuf.Duration`
    #[serde(rename = "duration", skip_serializing_if = "Option::is_none")]
    pub duration_type_name: Option<String>,

    /// Scalar replacing `.google.protobuf.Struct`
    #[serde(rename = "struct", skip_serializing_if = "Option::is_none")]
    pub struct_type_name: Option<String>,

    /// Collapse wrapper messages into nullable scalars
    #[serde(rename = "null_wrappers")]
    pub wrappers_as_null: bool,

    pub input_mode: InputMode,

    #[serde(rename = "js_64bit_type")]
    pub int64_type: Int64Type,

    /// Enables `extend type Query { ... }` emission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_type_prefix: Option<String>,

    pub field_name: FieldNameMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim_prefix: Option<String>,
}

impl Parameters {
    /// Parse a protoc parameter string on top of the defaults
    pub fn parse(parameter: &str) -> Result<Self> {
        let mut params = Self::default();
        params.apply(parameter)?;
        Ok(params)
    }

    /// Apply a comma-separated `key[=value]` parameter string, overriding current values
    pub fn apply(&mut self, parameter: &str) -> Result<()> {
        for part in parameter.split(',') {
            if part.is_empty() {
                continue;
            }

            let (key, value) = match part.split_once('=') {
                Some((key, value)) => (key, value),
                None => (part, ""),
            };

            match key {
                "timestamp" => self.timestamp_type_name = Some(required(key, value)?),
                "duration" => self.duration_type_name = Some(required(key, value)?),
                "struct" => self.struct_type_name = Some(required(key, value)?),
                "null_wrappers" => self.wrappers_as_null = true,
                "input_mode" => {
                    self.input_mode = match value {
                        "none" => InputMode::None,
                        "service" => InputMode::Service,
                        "all" => InputMode::All,
                        _ => return Err(invalid(key, value)),
                    }
                }
                "js_64bit_type" => {
                    self.int64_type = match value {
                        "string" => Int64Type::String,
                        "number" => Int64Type::Number,
                        _ => return Err(invalid(key, value)),
                    }
                }
                "root_type_prefix" => self.root_type_prefix = Some(value.to_string()),
                "field_name" => {
                    self.field_name = match value {
                        "lower_camel_case" => FieldNameMode::LowerCamelCase,
                        "preserve" => FieldNameMode::Preserve,
                        _ => return Err(invalid(key, value)),
                    }
                }
                "trim_prefix" => self.trim_prefix = Some(value.to_string()),
                _ => return Err(CompileError::UnknownParameter(key.to_string())),
            }
        }

        Ok(())
    }

    /// Load parameters from default locations
    pub fn load() -> std::result::Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load parameters from default locations plus a specific file
    pub fn load_from(config_path: Option<&str>) -> std::result::Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["protoc-gen-graphql.toml", ".protoc-gen-graphql.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        let project = directories::ProjectDirs::from("dev", "familiar", "protoc-gen-graphql");
        if let Some(config_dir) = project {
            let xdg_config = config_dir.config_dir().join("protoc-gen-graphql.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("PROTOC_GEN_GRAPHQL")
                .prefix_separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn required(key: &str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(CompileError::MissingParameterValue(key.to_string()));
    }
    Ok(value.to_string())
}

fn invalid(key: &str, value: &str) -> CompileError {
    CompileError::InvalidParameterValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
