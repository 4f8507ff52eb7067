//! SDL rendering
//!
//! Pure functions from the object model to text. Output order is always the
//! order declarations and fields were appended; nothing is re-sorted.

use super::{Argument, Declaration, Enum, EnumValue, Field, Scalar, TypeModifiers, Union};

const INDENT: &str = "  ";

/// One generated schema document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Source file named in the header
    pub source: String,
    /// Custom scalars referenced by the declarations, rendered first
    pub scalars: Vec<Scalar>,
    pub declarations: Vec<Declaration>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

pub fn render_document(document: &Document) -> String {
    let mut out = String::from("# Code generated by protoc-gen-graphql. DO NOT EDIT.\n");
    out.push_str(&format!("# source: {}\n", document.source));

    let blocks: Vec<String> = document
        .scalars
        .iter()
        .map(|s| format!("scalar {}", s.name))
        .chain(document.declarations.iter().map(render_declaration))
        .collect();

    if !blocks.is_empty() {
        out.push('\n');
        out.push_str(&blocks.join("\n\n"));
        out.push('\n');
    }

    out
}

pub fn render_declaration(declaration: &Declaration) -> String {
    match declaration {
        Declaration::Scalar(scalar) => format!("scalar {}", scalar.name),
        Declaration::Object(object) => {
            let mut out = render_description(object.description.as_deref(), "");
            out.push_str(&format!("type {}", object.name));
            out.push_str(&render_fields(&object.fields));
            out
        }
        Declaration::ExtendObject(object) => {
            format!("extend type {}{}", object.name, render_fields(&object.fields))
        }
        Declaration::Input(input) => {
            let mut out = render_description(input.description.as_deref(), "");
            out.push_str(&format!("input {}", input.name));
            out.push_str(&render_fields(&input.fields));
            out
        }
        Declaration::Enum(e) => render_enum(e),
        Declaration::Union(union) => render_union(union),
    }
}

/// `T`, `T!`, `[T!]`, `[T!]!` ... according to the modifier bits
pub fn render_type(type_name: &str, modifiers: TypeModifiers) -> String {
    let mut rendered = type_name.to_string();
    if modifiers.contains(TypeModifiers::NON_NULL) {
        rendered.push('!');
    }
    if modifiers.contains(TypeModifiers::LIST) {
        rendered = format!("[{rendered}]");
        if modifiers.contains(TypeModifiers::NON_NULL_LIST) {
            rendered.push('!');
        }
    }
    rendered
}

pub fn render_field(field: &Field) -> String {
    let mut out = field.name.clone();

    if !field.arguments.is_empty() {
        let args: Vec<String> = field.arguments.iter().map(render_argument).collect();
        out.push_str(&format!("({})", args.join(", ")));
    }

    out.push_str(": ");
    out.push_str(&render_type(&field.type_name, field.modifiers));

    for directive in &field.directives {
        out.push_str(&format!(" @{directive}"));
    }

    out
}

fn render_argument(argument: &Argument) -> String {
    let mut out = format!(
        "{}: {}",
        argument.name,
        render_type(&argument.type_name, argument.modifiers)
    );
    if let Some(default) = &argument.default {
        out.push_str(&format!(" = {default}"));
    }
    out
}

fn render_fields(fields: &[Field]) -> String {
    // `type Empty` rather than an empty brace block
    if fields.is_empty() {
        return String::new();
    }

    let mut out = String::from(" {\n");
    for field in fields {
        out.push_str(&render_description(field.description.as_deref(), INDENT));
        out.push_str(INDENT);
        out.push_str(&render_field(field));
        out.push('\n');
    }
    out.push('}');
    out
}

fn render_enum(e: &Enum) -> String {
    let mut out = render_description(e.description.as_deref(), "");
    out.push_str(&format!("enum {}", e.name));

    if e.values.is_empty() {
        return out;
    }

    out.push_str(" {\n");
    for value in &e.values {
        out.push_str(&render_description(value.description.as_deref(), INDENT));
        out.push_str(INDENT);
        out.push_str(&render_enum_value(value));
        out.push('\n');
    }
    out.push('}');
    out
}

fn render_enum_value(value: &EnumValue) -> String {
    let mut out = value.name.clone();
    for directive in &value.directives {
        out.push_str(&format!(" @{directive}"));
    }
    out
}

fn render_union(union: &Union) -> String {
    let mut out = render_description(union.description.as_deref(), "");
    out.push_str(&format!("union {}", union.name));
    if !union.type_names.is_empty() {
        out.push_str(" = ");
        out.push_str(&union.type_names.join(" | "));
    }
    out
}

/// Block string at `indent`; blank lines carry no indentation
fn render_description(description: Option<&str>, indent: &str) -> String {
    let Some(text) = description.filter(|d| !d.is_empty()) else {
        return String::new();
    };

    let mut out = format!("{indent}\"\"\"\n");
    for line in text.replace("\"\"\"", "\\\"\"\"").lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(indent);
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str(&format!("{indent}\"\"\"\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::{ExtendObject, Input, Object, DIRECTIVE_DEPRECATED, SCALAR_BOOLEAN};

    #[test]
    fn test_render_type_modifiers() {
        let m = |bits: &[TypeModifiers]| bits.iter().fold(TypeModifiers::NONE, |acc, b| acc | *b);

        assert_eq!(render_type("T", TypeModifiers::NONE), "T");
        assert_eq!(render_type("T", TypeModifiers::NON_NULL), "T!");
        assert_eq!(render_type("T", TypeModifiers::LIST), "[T]");
        assert_eq!(render_type("T", m(&[TypeModifiers::LIST, TypeModifiers::NON_NULL])), "[T!]");
        assert_eq!(
            render_type("T", m(&[TypeModifiers::LIST, TypeModifiers::NON_NULL_LIST])),
            "[T]!"
        );
        assert_eq!(
            render_type(
                "T",
                m(&[TypeModifiers::LIST, TypeModifiers::NON_NULL, TypeModifiers::NON_NULL_LIST])
            ),
            "[T!]!"
        );
    }

    #[test]
    fn test_object_without_fields_is_bare() {
        let decl = Declaration::Object(Object {
            name: "Empty".to_string(),
            ..Object::default()
        });
        assert_eq!(render_declaration(&decl), "type Empty");
    }

    #[test]
    fn test_object_with_descriptions() {
        let mut field = Field::new("name", "String", TypeModifiers::NON_NULL);
        field.description = Some("The name.\n\nNever empty.".to_string());
        field.directives.push(DIRECTIVE_DEPRECATED.to_string());

        let decl = Declaration::Object(Object {
            name: "Pkg_User".to_string(),
            description: Some("A user.".to_string()),
            fields: vec![field, Field::new("active", SCALAR_BOOLEAN, TypeModifiers::NONE)],
        });

        let expected = concat!(
            "\"\"\"\nA user.\n\"\"\"\n",
            "type Pkg_User {\n",
            "  \"\"\"\n  The name.\n\n  Never empty.\n  \"\"\"\n",
            "  name: String! @deprecated\n",
            "  active: Boolean\n",
            "}",
        );
        assert_eq!(render_declaration(&decl), expected);
    }

    #[test]
    fn test_description_escapes_block_quotes() {
        let out = render_description(Some(r#"Say """hi""""#), "");
        assert!(out.contains(r#"Say \"""hi\""""#));
    }

    #[test]
    fn test_description_keeps_source_lines() {
        let long = "word ".repeat(40);
        let text = format!("{}\nSecond line.", long.trim_end());
        let out = render_description(Some(&text), INDENT);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "  \"\"\"");
        assert_eq!(lines[1], format!("  {}", long.trim_end()));
        assert_eq!(lines[2], "  Second line.");
        assert_eq!(lines[3], "  \"\"\"");
    }

    #[test]
    fn test_field_arguments() {
        let mut field = Field::new("getUser", "Pkg_User", TypeModifiers::NON_NULL);
        field.arguments.push(Argument {
            name: "input".to_string(),
            type_name: "Pkg_GetUserRequest_Input".to_string(),
            modifiers: TypeModifiers::NON_NULL,
            default: None,
        });
        field.arguments.push(Argument {
            name: "limit".to_string(),
            type_name: "Int".to_string(),
            modifiers: TypeModifiers::NONE,
            default: Some("10".to_string()),
        });
        assert_eq!(
            render_field(&field),
            "getUser(input: Pkg_GetUserRequest_Input!, limit: Int = 10): Pkg_User!"
        );
    }

    #[test]
    fn test_enum_union_extend_input() {
        let e = Declaration::Enum(Enum {
            name: "Pkg_Color".to_string(),
            description: None,
            values: vec![
                EnumValue {
                    name: "RED".to_string(),
                    ..EnumValue::default()
                },
                EnumValue {
                    name: "BLUE".to_string(),
                    description: None,
                    directives: vec![DIRECTIVE_DEPRECATED.to_string()],
                },
            ],
        });
        assert_eq!(render_declaration(&e), "enum Pkg_Color {\n  RED\n  BLUE @deprecated\n}");

        let u = Declaration::Union(Union {
            name: "Pkg_Shape_Kind".to_string(),
            description: None,
            type_names: vec![
                "Pkg_Shape_Kind_Circle".to_string(),
                "Pkg_Shape_Kind_Square".to_string(),
            ],
        });
        assert_eq!(
            render_declaration(&u),
            "union Pkg_Shape_Kind = Pkg_Shape_Kind_Circle | Pkg_Shape_Kind_Square"
        );

        let x = Declaration::ExtendObject(ExtendObject {
            name: "Query".to_string(),
            fields: vec![Field::new("pkgUsers", "Pkg_Users_Query", TypeModifiers::NON_NULL)],
        });
        assert_eq!(render_declaration(&x), "extend type Query {\n  pkgUsers: Pkg_Users_Query!\n}");

        let i = Declaration::Input(Input {
            name: "Pkg_Req_Input".to_string(),
            description: None,
            fields: vec![Field::new(
                "ids",
                "String",
                TypeModifiers::LIST | TypeModifiers::NON_NULL,
            )],
        });
        assert_eq!(render_declaration(&i), "input Pkg_Req_Input {\n  ids: [String!]\n}");
    }

    #[test]
    fn test_render_document() {
        let document = Document {
            source: "pkg/user.proto".to_string(),
            scalars: vec![Scalar {
                name: "DateTime".to_string(),
            }],
            declarations: vec![
                Declaration::Object(Object {
                    name: "Pkg_A".to_string(),
                    description: None,
                    fields: vec![Field::new("at", "DateTime", TypeModifiers::NONE)],
                }),
                Declaration::Object(Object {
                    name: "Pkg_B".to_string(),
                    ..Object::default()
                }),
            ],
        };

        let expected = concat!(
            "# Code generated by protoc-gen-graphql. DO NOT EDIT.\n",
            "# source: pkg/user.proto\n",
            "\n",
            "scalar DateTime\n",
            "\n",
            "type Pkg_A {\n  at: DateTime\n}\n",
            "\n",
            "type Pkg_B\n",
        );
        assert_eq!(render_document(&document), expected);
        assert_eq!(render_document(&document), render_document(&document.clone()));
    }
}
