//! Descriptor Model
//!
//! Wraps raw file descriptors into a cross-referenced tree with qualified
//! identities, collapsed oneof fields and attached documentation. Built once
//! per file in a single top-down pass and read-only afterwards.
//!
//! Parent links are indexes into the owning [`File`]'s flat message list.

pub mod comments;
pub mod extensions;
pub mod raw;

pub use extensions::{ForeignKey, Loader, Operation};
pub use raw::{CodeGeneratorRequest, FieldType, FileDescriptorProto, Label};

use comments::{
    CommentIndex, ENUM_VALUE, FILE_ENUM, FILE_MESSAGE, FILE_SERVICE, MESSAGE_ENUM, MESSAGE_FIELD,
    MESSAGE_NESTED, MESSAGE_ONEOF, SERVICE_METHOD,
};
use raw::{DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, ServiceDescriptorProto};

use crate::error::Result;

/// Source syntax level of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    #[default]
    Proto2,
    Proto3,
}

impl Syntax {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("proto3") => Syntax::Proto3,
            _ => Syntax::Proto2,
        }
    }
}

/// Naming scope shared by every declaration of a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub package: String,
    /// File-level override of the package-derived type name prefix
    pub namespace: Option<String>,
    pub syntax: Syntax,
}

/// A compilation unit
#[derive(Debug, Clone, Default)]
pub struct File {
    pub name: String,
    pub scope: Scope,
    /// Every message of the file, nested ones included, in pre-order
    pub messages: Vec<Message>,
    /// Every enum of the file, nested ones included
    pub enums: Vec<Enum>,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone)]
pub struct Message {
    /// `.package.Outer.Inner`
    pub full_name: String,
    pub name: String,
    /// Local name path from the outermost message
    pub type_name: Vec<String>,
    pub scope: Scope,
    pub parent: Option<usize>,
    pub nested: Vec<usize>,
    pub enums: Vec<usize>,
    /// Effective fields; each oneof appears once, as a placeholder
    pub fields: Vec<MessageField>,
    pub oneofs: Vec<Oneof>,
    /// Synthetic key/value message generated for a map field
    pub is_map_entry: bool,
    pub comments: String,
}

impl Message {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Every field carrying a real type, oneof members included
    pub fn typed_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .filter_map(|f| match f {
                MessageField::Plain(field) => Some(field),
                MessageField::Oneof(_) => None,
            })
            .chain(self.oneofs.iter().flat_map(|o| o.fields.iter()))
    }
}

/// An entry of a message's effective field list
#[derive(Debug, Clone)]
pub enum MessageField {
    Plain(Field),
    /// Placeholder for the oneof at this index of `Message::oneofs`
    Oneof(usize),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub number: i32,
    pub label: Label,
    pub kind: FieldType,
    /// Fully qualified target for message and enum fields
    pub type_name: String,
    pub foreign_key: Option<ForeignKey>,
    /// proto3 `optional`
    pub explicit_presence: bool,
    pub deprecated: bool,
    pub comments: String,
}

impl Field {
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    pub fn is_message(&self) -> bool {
        self.kind == FieldType::Message
    }
}

/// A oneof group and its member fields
#[derive(Debug, Clone)]
pub struct Oneof {
    pub name: String,
    pub fields: Vec<Field>,
    pub comments: String,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub full_name: String,
    pub name: String,
    pub type_name: Vec<String>,
    pub scope: Scope,
    pub parent: Option<usize>,
    pub values: Vec<EnumValue>,
    pub comments: String,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub number: i32,
    pub display_name: Option<String>,
    pub skip: bool,
    pub deprecated: bool,
    pub comments: String,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub full_name: String,
    pub name: String,
    pub scope: Scope,
    pub methods: Vec<Method>,
    pub skip: bool,
    pub comments: String,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub input_type: String,
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub operation: Operation,
    pub skip: bool,
    pub deprecated: bool,
    pub loaders: Vec<Loader>,
    pub comments: String,
}

impl Method {
    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

impl File {
    /// Build the descriptor tree of one file
    pub fn build(proto: &FileDescriptorProto) -> Result<Self> {
        let comments = CommentIndex::new(proto.source_code_info.as_ref());
        let mut builder = FileBuilder {
            file: File {
                name: proto.name.clone(),
                scope: Scope {
                    package: proto.package.clone(),
                    namespace: proto.options.graphql.namespace.clone(),
                    syntax: Syntax::parse(proto.syntax.as_deref()),
                },
                ..File::default()
            },
            comments,
        };

        for (i, service) in proto.service.iter().enumerate() {
            builder.wrap_service(service, vec![FILE_SERVICE, i as i32])?;
        }
        for (i, message) in proto.message_type.iter().enumerate() {
            builder.wrap_message(message, None, vec![FILE_MESSAGE, i as i32])?;
        }
        for (i, enum_proto) in proto.enum_type.iter().enumerate() {
            builder.wrap_enum(enum_proto, None, vec![FILE_ENUM, i as i32]);
        }

        Ok(builder.file)
    }

    /// Build every file of a request, in request order
    pub fn build_all(protos: &[FileDescriptorProto]) -> Result<Vec<Self>> {
        protos.iter().map(Self::build).collect()
    }
}

struct FileBuilder {
    file: File,
    comments: CommentIndex,
}

impl FileBuilder {
    fn full_name(&self, type_name: &[String]) -> String {
        let path = type_name.join(".");
        if self.file.scope.package.is_empty() {
            format!(".{path}")
        } else {
            format!(".{}.{}", self.file.scope.package, path)
        }
    }

    fn type_name(&self, name: &str, parent: Option<usize>) -> Vec<String> {
        let mut parts = vec![name.to_string()];
        let mut current = parent;
        while let Some(index) = current {
            let message = &self.file.messages[index];
            parts.push(message.name.clone());
            current = message.parent;
        }
        parts.reverse();
        parts
    }

    fn wrap_service(&mut self, proto: &ServiceDescriptorProto, path: Vec<i32>) -> Result<()> {
        let mut methods = Vec::with_capacity(proto.method.len());

        for (i, method) in proto.method.iter().enumerate() {
            let options = &method.options.graphql;
            let loaders = [
                extensions::parse_loader(options.load_one.as_deref().unwrap_or_default(), false)?,
                extensions::parse_loader(options.load_many.as_deref().unwrap_or_default(), true)?,
            ];

            methods.push(Method {
                name: method.name.clone(),
                input_type: method.input_type.clone(),
                output_type: method.output_type.clone(),
                client_streaming: method.client_streaming,
                server_streaming: method.server_streaming,
                operation: Operation::parse(&method.name, options.operation.as_deref())?,
                skip: options.skip,
                deprecated: method.options.deprecated,
                loaders: loaders.into_iter().flatten().collect(),
                comments: self.comments.get(&child(&path, SERVICE_METHOD, i)),
            });
        }

        let service = Service {
            full_name: self.full_name(std::slice::from_ref(&proto.name)),
            name: proto.name.clone(),
            scope: self.file.scope.clone(),
            methods,
            skip: proto.options.graphql.skip,
            comments: self.comments.get(&path),
        };
        self.file.services.push(service);
        Ok(())
    }

    fn wrap_message(
        &mut self,
        proto: &DescriptorProto,
        parent: Option<usize>,
        path: Vec<i32>,
    ) -> Result<()> {
        let type_name = self.type_name(&proto.name, parent);
        let index = self.file.messages.len();

        let mut oneofs: Vec<Oneof> = proto
            .oneof_decl
            .iter()
            .enumerate()
            .map(|(i, decl)| Oneof {
                name: decl.name.clone(),
                fields: Vec::new(),
                comments: self.comments.get(&child(&path, MESSAGE_ONEOF, i)),
            })
            .collect();

        let mut fields = Vec::with_capacity(proto.field.len());
        for (i, field_proto) in proto.field.iter().enumerate() {
            let field = self.wrap_field(field_proto, child(&path, MESSAGE_FIELD, i))?;

            // proto3 optional fields sit in a synthetic single-member oneof
            let oneof_index = field_proto
                .oneof_index
                .filter(|_| !field_proto.proto3_optional)
                .filter(|&i| i < oneofs.len());

            match oneof_index {
                None => fields.push(MessageField::Plain(field)),
                Some(oneof) => {
                    // Only the first member stands in for the group
                    if oneofs[oneof].fields.is_empty() {
                        fields.push(MessageField::Oneof(oneof));
                    }
                    oneofs[oneof].fields.push(field);
                }
            }
        }

        self.file.messages.push(Message {
            full_name: self.full_name(&type_name),
            name: proto.name.clone(),
            type_name,
            scope: self.file.scope.clone(),
            parent,
            nested: Vec::new(),
            enums: Vec::new(),
            fields,
            oneofs,
            is_map_entry: proto.options.map_entry,
            comments: self.comments.get(&path),
        });
        if let Some(parent) = parent {
            self.file.messages[parent].nested.push(index);
        }

        for (i, nested) in proto.nested_type.iter().enumerate() {
            self.wrap_message(nested, Some(index), child(&path, MESSAGE_NESTED, i))?;
        }
        for (i, enum_proto) in proto.enum_type.iter().enumerate() {
            self.wrap_enum(enum_proto, Some(index), child(&path, MESSAGE_ENUM, i));
        }

        Ok(())
    }

    fn wrap_field(&self, proto: &FieldDescriptorProto, path: Vec<i32>) -> Result<Field> {
        let foreign_key = extensions::parse_foreign_key(
            proto.options.graphql.foreign_key.as_deref().unwrap_or_default(),
        )?;

        Ok(Field {
            name: proto.name.clone(),
            number: proto.number,
            label: proto.label,
            kind: proto.kind,
            type_name: proto.type_name.clone(),
            foreign_key,
            explicit_presence: proto.proto3_optional,
            deprecated: proto.options.deprecated,
            comments: self.comments.get(&path),
        })
    }

    fn wrap_enum(&mut self, proto: &EnumDescriptorProto, parent: Option<usize>, path: Vec<i32>) {
        let type_name = self.type_name(&proto.name, parent);
        let index = self.file.enums.len();

        let values = proto
            .value
            .iter()
            .enumerate()
            .map(|(i, value)| EnumValue {
                name: value.name.clone(),
                number: value.number,
                display_name: value.options.graphql.name.clone(),
                skip: value.options.graphql.skip,
                deprecated: value.options.deprecated,
                comments: self.comments.get(&child(&path, ENUM_VALUE, i)),
            })
            .collect();

        self.file.enums.push(Enum {
            full_name: self.full_name(&type_name),
            name: proto.name.clone(),
            type_name,
            scope: self.file.scope.clone(),
            parent,
            values,
            comments: self.comments.get(&path),
        });
        if let Some(parent) = parent {
            self.file.messages[parent].enums.push(index);
        }
    }
}

fn child(path: &[i32], kind: i32, index: usize) -> Vec<i32> {
    let mut path = path.to_vec();
    path.push(kind);
    path.push(index as i32);
    path
}
