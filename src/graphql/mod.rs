//! GraphQL schema object model
//!
//! Pure output values built by the mapper and handed to [`render`]. Nothing
//! here refers back to the descriptor model.

pub mod render;

pub use render::{render_declaration, render_document, Document};

use std::ops::BitOr;

pub const SCALAR_INT: &str = "Int";
pub const SCALAR_FLOAT: &str = "Float";
pub const SCALAR_STRING: &str = "String";
pub const SCALAR_BOOLEAN: &str = "Boolean";

pub const DIRECTIVE_DEPRECATED: &str = "deprecated";

/// Type modifier bits. Every combination is meaningful:
/// `[T]`, `[T!]`, `[T]!` and `[T!]!` are four different types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeModifiers(u8);

impl TypeModifiers {
    pub const NONE: Self = Self(0);
    /// The element itself is non-null
    pub const NON_NULL: Self = Self(1);
    pub const LIST: Self = Self(1 << 1);
    /// The list is non-null
    pub const NON_NULL_LIST: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

}

impl BitOr for TypeModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Object {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

/// Additive merge into a root type declared elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtendObject {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Input {
    pub name: String,
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    pub name: String,
    pub description: Option<String>,
    pub type_name: String,
    pub arguments: Vec<Argument>,
    pub modifiers: TypeModifiers,
    pub directives: Vec<String>,
}

impl Field {
    pub fn new(
        name: impl Into<String>,
        type_name: impl Into<String>,
        modifiers: TypeModifiers,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            modifiers,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Argument {
    pub name: String,
    pub type_name: String,
    pub modifiers: TypeModifiers,
    /// Literal default value, rendered verbatim
    pub default: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enum {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Union {
    pub name: String,
    pub description: Option<String>,
    pub type_names: Vec<String>,
}

/// A top-level schema declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Scalar(Scalar),
    Object(Object),
    ExtendObject(ExtendObject),
    Input(Input),
    Enum(Enum),
    Union(Union),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Scalar(d) => &d.name,
            Declaration::Object(d) => &d.name,
            Declaration::ExtendObject(d) => &d.name,
            Declaration::Input(d) => &d.name,
            Declaration::Enum(d) => &d.name,
            Declaration::Union(d) => &d.name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Declaration::Scalar(_) => "scalar",
            Declaration::Object(_) => "type",
            Declaration::ExtendObject(_) => "extend type",
            Declaration::Input(_) => "input",
            Declaration::Enum(_) => "enum",
            Declaration::Union(_) => "union",
        }
    }
}

/// Documentation is optional; empty text means none
pub(crate) fn description(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
