//! Raw descriptor input
//!
//! Serde mirror of the protobuf compiler's `CodeGeneratorRequest` and
//! `FileDescriptorProto` messages in their canonical JSON encoding
//! (camelCase keys, enum values as `TYPE_*` / `LABEL_*` strings).
//! Generator options arrive pre-decoded under a `graphql` key of each
//! `options` object. Unknown keys are ignored.

use serde::{Deserialize, Serialize};

/// A request handed to the plugin by the protobuf compiler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CodeGeneratorRequest {
    /// Files to render; empty means every file in `proto_file`
    pub file_to_generate: Vec<String>,
    pub parameter: Option<String>,
    /// Every file of the compilation unit, dependencies first
    pub proto_file: Vec<FileDescriptorProto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FileDescriptorProto {
    pub name: String,
    pub package: String,
    pub dependency: Vec<String>,
    pub message_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptorProto>,
    pub service: Vec<ServiceDescriptorProto>,
    pub options: FileOptions,
    pub source_code_info: Option<SourceCodeInfo>,
    /// `proto2`, `proto3`; absent means proto2
    pub syntax: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DescriptorProto {
    pub name: String,
    pub field: Vec<FieldDescriptorProto>,
    pub nested_type: Vec<DescriptorProto>,
    pub enum_type: Vec<EnumDescriptorProto>,
    pub oneof_decl: Vec<OneofDescriptorProto>,
    pub options: MessageOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldDescriptorProto {
    pub name: String,
    pub number: i32,
    pub label: Label,
    #[serde(rename = "type")]
    pub kind: FieldType,
    /// Fully-qualified target for message and enum fields
    pub type_name: String,
    pub oneof_index: Option<usize>,
    pub json_name: Option<String>,
    /// Set by the compiler for proto3 `optional` fields
    pub proto3_optional: bool,
    pub options: FieldOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OneofDescriptorProto {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnumDescriptorProto {
    pub name: String,
    pub value: Vec<EnumValueDescriptorProto>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumValueDescriptorProto {
    pub name: String,
    pub number: i32,
    pub options: EnumValueOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDescriptorProto {
    pub name: String,
    pub method: Vec<MethodDescriptorProto>,
    pub options: ServiceOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MethodDescriptorProto {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub options: MethodOptions,
}

/// Scalar and composite field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "TYPE_DOUBLE")]
    Double,
    #[serde(rename = "TYPE_FLOAT")]
    Float,
    #[serde(rename = "TYPE_INT64")]
    Int64,
    #[serde(rename = "TYPE_UINT64")]
    Uint64,
    #[serde(rename = "TYPE_INT32")]
    Int32,
    #[serde(rename = "TYPE_FIXED64")]
    Fixed64,
    #[serde(rename = "TYPE_FIXED32")]
    Fixed32,
    #[serde(rename = "TYPE_BOOL")]
    Bool,
    #[default]
    #[serde(rename = "TYPE_STRING")]
    String,
    #[serde(rename = "TYPE_GROUP")]
    Group,
    #[serde(rename = "TYPE_MESSAGE")]
    Message,
    #[serde(rename = "TYPE_BYTES")]
    Bytes,
    #[serde(rename = "TYPE_UINT32")]
    Uint32,
    #[serde(rename = "TYPE_ENUM")]
    Enum,
    #[serde(rename = "TYPE_SFIXED32")]
    Sfixed32,
    #[serde(rename = "TYPE_SFIXED64")]
    Sfixed64,
    #[serde(rename = "TYPE_SINT32")]
    Sint32,
    #[serde(rename = "TYPE_SINT64")]
    Sint64,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Double => "TYPE_DOUBLE",
            FieldType::Float => "TYPE_FLOAT",
            FieldType::Int64 => "TYPE_INT64",
            FieldType::Uint64 => "TYPE_UINT64",
            FieldType::Int32 => "TYPE_INT32",
            FieldType::Fixed64 => "TYPE_FIXED64",
            FieldType::Fixed32 => "TYPE_FIXED32",
            FieldType::Bool => "TYPE_BOOL",
            FieldType::String => "TYPE_STRING",
            FieldType::Group => "TYPE_GROUP",
            FieldType::Message => "TYPE_MESSAGE",
            FieldType::Bytes => "TYPE_BYTES",
            FieldType::Uint32 => "TYPE_UINT32",
            FieldType::Enum => "TYPE_ENUM",
            FieldType::Sfixed32 => "TYPE_SFIXED32",
            FieldType::Sfixed64 => "TYPE_SFIXED64",
            FieldType::Sint32 => "TYPE_SINT32",
            FieldType::Sint64 => "TYPE_SINT64",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Label {
    #[default]
    #[serde(rename = "LABEL_OPTIONAL")]
    Optional,
    #[serde(rename = "LABEL_REQUIRED")]
    Required,
    #[serde(rename = "LABEL_REPEATED")]
    Repeated,
}

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOptions {
    pub graphql: GraphqlFileOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphqlFileOptions {
    /// Replaces the package-derived type name prefix
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MessageOptions {
    pub map_entry: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub deprecated: bool,
    pub graphql: GraphqlFieldOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphqlFieldOptions {
    /// `type:field`
    pub foreign_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnumValueOptions {
    pub deprecated: bool,
    pub graphql: GraphqlEnumValueOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphqlEnumValueOptions {
    pub name: Option<String>,
    pub skip: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceOptions {
    pub graphql: GraphqlServiceOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphqlServiceOptions {
    pub skip: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodOptions {
    pub deprecated: bool,
    pub graphql: GraphqlMethodOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphqlMethodOptions {
    pub operation: Option<String>,
    /// `type:request_path:response_path:key_path`
    pub load_one: Option<String>,
    pub load_many: Option<String>,
    pub skip: bool,
}

// =============================================================================
// Source info
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceCodeInfo {
    pub location: Vec<Location>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Location {
    pub path: Vec<i32>,
    pub span: Vec<i32>,
    pub leading_comments: Option<String>,
    pub trailing_comments: Option<String>,
    pub leading_detached_comments: Vec<String>,
}
