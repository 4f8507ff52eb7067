//! Field type mapping
//!
//! | kind | GraphQL |
//! |---|---|
//! | double, float | `Float` |
//! | int32, sint32, sfixed32 | `Int` |
//! | uint32, fixed32 | `Float` (exceeds the signed 32-bit `Int` range) |
//! | bool | `Boolean` |
//! | string, bytes | `String` |
//! | 64-bit integers | `String`, or `Float` with `js_64bit_type=number` |
//! | enum | enum name |
//! | message | object or input name |
//!
//! Non-message fields are non-null in output shapes unless proto2 `optional`
//! or proto3 `optional`; input shapes are always nullable. Message fields are
//! nullable unless the target is a map entry. Repeated fields are lists of
//! non-null elements, and the list itself is non-null in output shapes.

use crate::config::{Int64Type, Parameters};
use crate::descriptor::{Field, FieldType, Label, Message, Syntax};
use crate::error::{CompileError, Result};
use crate::graphql::{self, TypeModifiers};

use super::{deprecated, names, Compiler, Mode};

pub const TIMESTAMP: &str = ".google.protobuf.Timestamp";
pub const DURATION: &str = ".google.protobuf.Duration";
pub const STRUCT: &str = ".google.protobuf.Struct";

/// Replacement of a well-known message type by a scalar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub type_name: String,
    /// A custom scalar that must be declared in the document
    pub custom: bool,
}

/// Well-known substitution for a message type, if one is configured
pub fn substitute(params: &Parameters, type_name: &str) -> Option<Substitution> {
    let configured = match type_name {
        TIMESTAMP => params.timestamp_type_name.as_ref(),
        DURATION => params.duration_type_name.as_ref(),
        STRUCT => params.struct_type_name.as_ref(),
        _ => None,
    };
    if let Some(scalar) = configured {
        return Some(Substitution {
            type_name: scalar.clone(),
            custom: true,
        });
    }

    if !params.wrappers_as_null {
        return None;
    }

    let scalar = match type_name {
        ".google.protobuf.DoubleValue"
        | ".google.protobuf.FloatValue"
        | ".google.protobuf.UInt32Value" => graphql::SCALAR_FLOAT,
        ".google.protobuf.Int64Value" | ".google.protobuf.UInt64Value" => {
            int64_scalar(params.int64_type)
        }
        ".google.protobuf.Int32Value" => graphql::SCALAR_INT,
        ".google.protobuf.BoolValue" => graphql::SCALAR_BOOLEAN,
        ".google.protobuf.StringValue" | ".google.protobuf.BytesValue" => graphql::SCALAR_STRING,
        _ => return None,
    };

    Some(Substitution {
        type_name: scalar.to_string(),
        custom: false,
    })
}

fn int64_scalar(int64_type: Int64Type) -> &'static str {
    match int64_type {
        Int64Type::String => graphql::SCALAR_STRING,
        Int64Type::Number => graphql::SCALAR_FLOAT,
    }
}

/// Built-in scalar for a non-composite kind
pub fn scalar_type(kind: FieldType, int64_type: Int64Type) -> Option<&'static str> {
    let scalar = match kind {
        FieldType::Double | FieldType::Float => graphql::SCALAR_FLOAT,
        FieldType::Int32 | FieldType::Sint32 | FieldType::Sfixed32 => graphql::SCALAR_INT,
        FieldType::Uint32 | FieldType::Fixed32 => graphql::SCALAR_FLOAT,
        FieldType::Bool => graphql::SCALAR_BOOLEAN,
        FieldType::String | FieldType::Bytes => graphql::SCALAR_STRING,
        FieldType::Int64
        | FieldType::Uint64
        | FieldType::Sint64
        | FieldType::Fixed64
        | FieldType::Sfixed64 => int64_scalar(int64_type),
        FieldType::Enum | FieldType::Message | FieldType::Group => return None,
    };
    Some(scalar)
}

impl<'a> Compiler<'a> {
    /// Map one typed field of `message` in the given mode
    pub(crate) fn map_field(
        &mut self,
        file: usize,
        message: &Message,
        field: &Field,
        mode: Mode,
    ) -> Result<graphql::Field> {
        let referrer = format!("{}.{}", message.full_name, field.name);

        // Non-null unless input mode or explicitly optional
        let optional = mode == Mode::Input
            || field.explicit_presence
            || (message.scope.syntax == Syntax::Proto2 && field.label == Label::Optional);
        let scalar_modifiers = if optional {
            TypeModifiers::NONE
        } else {
            TypeModifiers::NON_NULL
        };

        let (type_name, mut modifiers) = match field.kind {
            FieldType::Message => match substitute(self.params, &field.type_name) {
                // Substituted scalars are always nullable, wrappers included
                Some(substitution) => {
                    if substitution.custom {
                        self.use_scalar(file, &substitution.type_name);
                    }
                    (substitution.type_name, TypeModifiers::NONE)
                }
                None => self.message_type(&field.type_name, &referrer, mode)?,
            },
            FieldType::Enum => {
                let name = self
                    .enum_names
                    .get(&field.type_name)
                    .cloned()
                    .ok_or_else(|| CompileError::unresolved(&field.type_name, &referrer))?;
                (name, scalar_modifiers)
            }
            FieldType::Group => {
                return Err(CompileError::UnsupportedFieldType {
                    field: referrer,
                    kind: field.kind.to_string(),
                })
            }
            kind => match scalar_type(kind, self.params.int64_type) {
                Some(scalar) => (scalar.to_string(), scalar_modifiers),
                None => {
                    return Err(CompileError::UnsupportedFieldType {
                        field: referrer,
                        kind: kind.to_string(),
                    })
                }
            },
        };

        if field.is_repeated() {
            modifiers.insert(TypeModifiers::LIST | TypeModifiers::NON_NULL);
            if mode == Mode::Output {
                modifiers.insert(TypeModifiers::NON_NULL_LIST);
            }
        }

        let mut mapped = graphql::Field::new(
            names::field_name(&field.name, self.params.field_name),
            type_name,
            modifiers,
        );
        mapped.description = graphql::description(&field.comments);
        if mode == Mode::Output {
            mapped.directives = deprecated(field.deprecated);
        }

        Ok(mapped)
    }

    /// Object or input name of a message-typed field; map entries are never optional
    fn message_type(
        &self,
        full_name: &str,
        referrer: &str,
        mode: Mode,
    ) -> Result<(String, TypeModifiers)> {
        let target = self.message(full_name, referrer)?.message;
        let names = self.names_of(full_name, referrer)?;

        let type_name = match mode {
            Mode::Output => names.object.clone(),
            Mode::Input => names.input.clone(),
        };
        let modifiers = if target.is_map_entry {
            TypeModifiers::NON_NULL
        } else {
            TypeModifiers::NONE
        };

        Ok((type_name, modifiers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InputMode;
    use crate::descriptor::{File, FileDescriptorProto};
    use crate::graphql::render_declaration;
    use crate::mapper::compile;

    fn field(name: &str, kind: &str, label: &str, extra: &str) -> String {
        format!(r#"{{"name": "{name}", "number": 1, "type": "{kind}", "label": "{label}"{extra}}}"#)
    }

    fn compile_message(
        syntax: &str,
        fields: &[String],
        params: &Parameters,
    ) -> Result<Vec<String>> {
        let json = format!(
            r#"{{
                "name": "t.proto",
                "package": "t",
                "syntax": "{syntax}",
                "messageType": [
                    {{"name": "M", "field": [{}]}},
                    {{"name": "Other", "field": [{}]}},
                    {{"name": "PairEntry", "options": {{"mapEntry": true}}, "field": [{}, {}]}}
                ],
                "enumType": [{{"name": "Color", "value": [{{"name": "RED"}}]}}]
            }}"#,
            fields.join(", "),
            field("x", "TYPE_INT32", "LABEL_OPTIONAL", ""),
            field("key", "TYPE_STRING", "LABEL_OPTIONAL", ""),
            field("value", "TYPE_STRING", "LABEL_OPTIONAL", ""),
        );
        let proto: FileDescriptorProto = serde_json::from_str(&json).unwrap();
        let files = vec![File::build(&proto)?];
        let compilation = compile(&files, params)?;
        Ok(compilation.files[0]
            .declarations
            .iter()
            .map(render_declaration)
            .collect())
    }

    fn find<'o>(out: &'o [String], prefix: &str) -> &'o str {
        out.iter()
            .find(|d| d.starts_with(prefix))
            .map(String::as_str)
            .unwrap_or_else(|| panic!("no declaration starting with {prefix:?} in {out:#?}"))
    }

    fn all_inputs() -> Parameters {
        Parameters {
            input_mode: InputMode::All,
            ..Parameters::default()
        }
    }

    #[test]
    fn test_scalar_table() {
        assert_eq!(scalar_type(FieldType::Double, Int64Type::String), Some("Float"));
        assert_eq!(scalar_type(FieldType::Sfixed32, Int64Type::String), Some("Int"));
        assert_eq!(scalar_type(FieldType::Uint32, Int64Type::String), Some("Float"));
        assert_eq!(scalar_type(FieldType::Bytes, Int64Type::String), Some("String"));
        assert_eq!(scalar_type(FieldType::Sint64, Int64Type::String), Some("String"));
        assert_eq!(scalar_type(FieldType::Fixed64, Int64Type::Number), Some("Float"));
        assert_eq!(scalar_type(FieldType::Message, Int64Type::String), None);
    }

    #[test]
    fn test_proto3_nullability_and_lists() {
        let fields = [
            field("count", "TYPE_INT32", "LABEL_OPTIONAL", ""),
            field("tags", "TYPE_STRING", "LABEL_REPEATED", ""),
            field("color", "TYPE_ENUM", "LABEL_OPTIONAL", r#", "typeName": ".t.Color""#),
            field("other", "TYPE_MESSAGE", "LABEL_OPTIONAL", r#", "typeName": ".t.Other""#),
            field("others", "TYPE_MESSAGE", "LABEL_REPEATED", r#", "typeName": ".t.Other""#),
            field("pairs", "TYPE_MESSAGE", "LABEL_REPEATED", r#", "typeName": ".t.PairEntry""#),
            field("maybe", "TYPE_BOOL", "LABEL_OPTIONAL", r#", "proto3Optional": true"#),
        ];
        let out = compile_message("proto3", &fields, &all_inputs()).unwrap();

        assert_eq!(
            find(&out, "type T_M "),
            concat!(
                "type T_M {\n",
                "  count: Int!\n",
                "  tags: [String!]!\n",
                "  color: T_Color!\n",
                "  other: T_Other\n",
                "  others: [T_Other!]!\n",
                "  pairs: [T_Pair_Map!]!\n",
                "  maybe: Boolean\n",
                "}",
            )
        );
        assert_eq!(
            find(&out, "input T_M_Input "),
            concat!(
                "input T_M_Input {\n",
                "  count: Int\n",
                "  tags: [String!]\n",
                "  color: T_Color\n",
                "  other: T_Other_Input\n",
                "  others: [T_Other_Input!]\n",
                "  pairs: [T_Pair_Map_Input!]\n",
                "  maybe: Boolean\n",
                "}",
            )
        );
    }

    #[test]
    fn test_proto2_optional_is_nullable() {
        let fields = [
            field("a", "TYPE_STRING", "LABEL_OPTIONAL", ""),
            field("b", "TYPE_STRING", "LABEL_REQUIRED", ""),
        ];
        let out = compile_message("proto2", &fields, &Parameters::default()).unwrap();
        assert_eq!(find(&out, "type T_M "), "type T_M {\n  a: String\n  b: String!\n}");
    }

    #[test]
    fn test_int64_as_number() {
        let fields = [field("big", "TYPE_UINT64", "LABEL_OPTIONAL", "")];
        let params = Parameters::parse("js_64bit_type=number").unwrap();
        let out = compile_message("proto3", &fields, &params).unwrap();
        assert_eq!(find(&out, "type T_M "), "type T_M {\n  big: Float!\n}");
    }

    #[test]
    fn test_well_known_overrides() {
        let fields = [
            field(
                "at",
                "TYPE_MESSAGE",
                "LABEL_OPTIONAL",
                r#", "typeName": ".google.protobuf.Timestamp""#,
            ),
            field(
                "took",
                "TYPE_MESSAGE",
                "LABEL_REPEATED",
                r#", "typeName": ".google.protobuf.Duration""#,
            ),
            field(
                "name",
                "TYPE_MESSAGE",
                "LABEL_OPTIONAL",
                r#", "typeName": ".google.protobuf.StringValue""#,
            ),
        ];
        let params =
            Parameters::parse("timestamp=DateTime,duration=Duration,null_wrappers").unwrap();
        let out = compile_message("proto3", &fields, &params).unwrap();
        assert_eq!(
            find(&out, "type T_M "),
            "type T_M {\n  at: DateTime\n  took: [Duration!]!\n  name: String\n}"
        );
    }

    #[test]
    fn test_substitution_table() {
        let params = Parameters::parse("null_wrappers,js_64bit_type=number").unwrap();
        assert_eq!(substitute(&params, ".google.protobuf.Int64Value").unwrap().type_name, "Float");
        assert_eq!(substitute(&params, ".google.protobuf.UInt32Value").unwrap().type_name, "Float");
        assert!(substitute(&params, TIMESTAMP).is_none());
        assert!(substitute(&Parameters::default(), ".google.protobuf.BoolValue").is_none());

        let params = Parameters::parse("struct=JSON").unwrap();
        let substitution = substitute(&params, STRUCT).unwrap();
        assert_eq!(substitution.type_name, "JSON");
        assert!(substitution.custom);
    }

    #[test]
    fn test_group_fields_are_rejected() {
        let fields = [field("legacy", "TYPE_GROUP", "LABEL_OPTIONAL", "")];
        let err = compile_message("proto2", &fields, &Parameters::default()).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnsupportedFieldType { ref kind, .. } if kind == "TYPE_GROUP"
        ));
    }

    #[test]
    fn test_deprecated_only_on_output() {
        let fields = [field(
            "old",
            "TYPE_STRING",
            "LABEL_OPTIONAL",
            r#", "options": {"deprecated": true}"#,
        )];
        let out = compile_message("proto3", &fields, &all_inputs()).unwrap();
        assert_eq!(find(&out, "type T_M "), "type T_M {\n  old: String! @deprecated\n}");
        assert_eq!(find(&out, "input T_M_Input "), "input T_M_Input {\n  old: String\n}");
    }
}
