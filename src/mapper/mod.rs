//! Type-Mapping Engine
//!
//! Lowers descriptor declarations into GraphQL declarations:
//!
//! 1. **Naming** - every enum and message gets its output and input name up
//!    front, so mutually recursive messages can refer to each other before
//!    any body exists.
//! 2. **Enums** - no dependencies, built first.
//! 3. **Objects** - every message in dependency order.
//! 4. **Inputs** - every message, or only the closure of service method
//!    requests, depending on [`InputMode`].
//! 5. **Services** - root containers for the mapped methods.
//!
//! Each message is built at most once per mode; the per-identity
//! [`BuildState`] records which shapes already exist.

pub mod names;
pub mod service;
pub mod types;

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::config::{InputMode, Parameters};
use crate::descriptor::{Enum, Field, File, Loader, Message, MessageField, Oneof};
use crate::error::{CompileError, Result};
use crate::graph::TypeGraph;
use crate::graphql::{self, Declaration, Document, Scalar, TypeModifiers};

use names::{NameKind, NameResolver};

/// Placeholder field of messages without fields
pub const EMPTY_FIELD: &str = "_empty";
/// Discriminator field of oneof variant wrappers
pub const ONEOF_DISCRIMINATOR: &str = "_field";

/// Shape being built for a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Output,
    Input,
}

/// Which shapes of a message have been built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildState {
    pub output: bool,
    pub input: bool,
}

impl BuildState {
    pub fn has(&self, mode: Mode) -> bool {
        match mode {
            Mode::Output => self.output,
            Mode::Input => self.input,
        }
    }

    fn mark(&mut self, mode: Mode) {
        match mode {
            Mode::Output => self.output = true,
            Mode::Input => self.input = true,
        }
    }
}

/// Output and input names of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNames {
    pub object: String,
    pub input: String,
}

/// A loader directive bound to the object type it loads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderBinding {
    /// Fully qualified service name
    pub service: String,
    pub method: String,
    pub loader: Loader,
    pub object_name: String,
}

/// Declarations owned by one source file
#[derive(Debug, Clone, Default)]
pub struct FileOutput {
    pub file_name: String,
    /// Custom scalars referenced by the declarations, in first-use order
    pub scalars: Vec<String>,
    pub declarations: Vec<Declaration>,
}

impl FileOutput {
    pub fn document(&self) -> Document {
        Document {
            source: self.file_name.clone(),
            scalars: self
                .scalars
                .iter()
                .map(|name| Scalar { name: name.clone() })
                .collect(),
            declarations: self.declarations.clone(),
        }
    }
}

/// Result of compiling a set of files
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// One entry per input file, in input order
    pub files: Vec<FileOutput>,
    pub loaders: Vec<LoaderBinding>,
    names: HashMap<String, TypeNames>,
    enum_names: HashMap<String, String>,
}

impl Compilation {
    pub fn file(&self, file_name: &str) -> Option<&FileOutput> {
        self.files.iter().find(|f| f.file_name == file_name)
    }

    pub fn object_name(&self, full_name: &str) -> Option<&str> {
        self.names.get(full_name).map(|n| n.object.as_str())
    }

    pub fn input_name(&self, full_name: &str) -> Option<&str> {
        self.names.get(full_name).map(|n| n.input.as_str())
    }

    pub fn enum_name(&self, full_name: &str) -> Option<&str> {
        self.enum_names.get(full_name).map(String::as_str)
    }
}

/// Compile every file of a compilation unit
pub fn compile(files: &[File], params: &Parameters) -> Result<Compilation> {
    let mut compiler = Compiler::new(files, params);
    compiler.run()?;

    info!(
        files = files.len(),
        messages = compiler.messages.len(),
        declarations = compiler
            .outputs
            .iter()
            .map(|o| o.declarations.len())
            .sum::<usize>(),
        "compiled schema"
    );

    Ok(Compilation {
        files: compiler.outputs,
        loaders: compiler.loaders,
        names: compiler.type_names,
        enum_names: compiler.enum_names,
    })
}

/// A message together with the index of its owning file
#[derive(Clone, Copy)]
pub(crate) struct MessageRef<'a> {
    pub file: usize,
    pub message: &'a Message,
}

pub(crate) struct Compiler<'a> {
    files: &'a [File],
    params: &'a Parameters,
    names: NameResolver,
    messages: HashMap<&'a str, MessageRef<'a>>,
    type_names: HashMap<String, TypeNames>,
    enum_names: HashMap<String, String>,
    state: HashMap<&'a str, BuildState>,
    outputs: Vec<FileOutput>,
    loaders: Vec<LoaderBinding>,
}

impl<'a> Compiler<'a> {
    fn new(files: &'a [File], params: &'a Parameters) -> Self {
        let mut messages = HashMap::new();
        for (index, file) in files.iter().enumerate() {
            for message in &file.messages {
                messages.insert(message.full_name.as_str(), MessageRef { file: index, message });
            }
        }

        Self {
            files,
            params,
            names: NameResolver::new(params.trim_prefix.clone()),
            messages,
            type_names: HashMap::new(),
            enum_names: HashMap::new(),
            state: HashMap::new(),
            outputs: files
                .iter()
                .map(|f| FileOutput {
                    file_name: f.name.clone(),
                    ..FileOutput::default()
                })
                .collect(),
            loaders: Vec::new(),
        }
    }

    fn run(&mut self) -> Result<()> {
        self.assign_names()?;

        let files = self.files;
        for (index, file) in files.iter().enumerate() {
            for e in &file.enums {
                self.build_enum(index, e)?;
            }
        }

        let graph = TypeGraph::new(files.iter().flat_map(|f| f.messages.iter()));
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            external = graph.proxy_count(),
            "built dependency graph"
        );
        for message in graph.order() {
            self.build_message(message, Mode::Output)?;
        }

        let inputs = match self.params.input_mode {
            InputMode::None => Vec::new(),
            InputMode::All => graph.order(),
            InputMode::Service => {
                // Requests without fields never become arguments
                let requests: Vec<&str> = self
                    .mapped_methods()
                    .map(|m| m.input_type.as_str())
                    .filter(|name| self.messages.get(name).map_or(true, |r| !r.message.is_empty()))
                    .collect();
                graph.sort_to(requests)
            }
        };
        for message in inputs {
            self.build_message(message, Mode::Input)?;
        }

        if self.params.input_mode == InputMode::None {
            debug!("input mode is none, skipping services");
            return Ok(());
        }

        for (index, file) in files.iter().enumerate() {
            for service in &file.services {
                self.build_service(index, service)?;
            }
        }

        Ok(())
    }

    // =========================================================================
    // Naming
    // =========================================================================

    fn assign_names(&mut self) -> Result<()> {
        let files = self.files;
        for file in files {
            for e in &file.enums {
                let name = self.names.type_name(&e.scope, &e.type_name, NameKind::OUTPUT);
                self.enum_names.insert(e.full_name.clone(), name);
            }
        }

        for file in files {
            for message in &file.messages {
                self.name_message(&message.full_name, &file.name)?;
            }
        }

        Ok(())
    }

    /// Name `full_name` and, recursively, every type its fields reach
    fn name_message(&mut self, full_name: &str, referrer: &str) -> Result<()> {
        if self.type_names.contains_key(full_name) {
            return Ok(());
        }

        let message = self.message(full_name, referrer)?.message;
        let kind = |input| NameKind {
            map_entry: message.is_map_entry,
            input,
        };
        self.type_names.insert(
            message.full_name.clone(),
            TypeNames {
                object: self.names.type_name(&message.scope, &message.type_name, kind(false)),
                input: self.names.type_name(&message.scope, &message.type_name, kind(true)),
            },
        );

        for field in message.typed_fields() {
            if field.is_message() && types::substitute(self.params, &field.type_name).is_none() {
                self.name_message(&field.type_name, &message.full_name)?;
            }
            if let Some(fk) = &field.foreign_key {
                self.name_message(&fk.full_name, &message.full_name)?;
            }
        }

        Ok(())
    }

    pub(crate) fn message(&self, full_name: &str, referrer: &str) -> Result<MessageRef<'a>> {
        self.messages
            .get(full_name)
            .copied()
            .ok_or_else(|| CompileError::unresolved(full_name, referrer))
    }

    pub(crate) fn names_of(&self, full_name: &str, referrer: &str) -> Result<&TypeNames> {
        self.type_names
            .get(full_name)
            .ok_or_else(|| CompileError::unresolved(full_name, referrer))
    }

    fn type_name_of(&self, message: &Message, path: &[&str], input: bool) -> String {
        let mut full_path: Vec<&str> = message.type_name.iter().map(String::as_str).collect();
        full_path.extend_from_slice(path);
        let kind = if input { NameKind::INPUT } else { NameKind::OUTPUT };
        self.names.type_name(&message.scope, &full_path, kind)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn emit(&mut self, file: usize, declaration: Declaration) {
        debug!(kind = declaration.kind(), name = declaration.name(), "emitting declaration");
        self.outputs[file].declarations.push(declaration);
    }

    pub(crate) fn use_scalar(&mut self, file: usize, name: &str) {
        let scalars = &mut self.outputs[file].scalars;
        if !scalars.iter().any(|s| s == name) {
            scalars.push(name.to_string());
        }
    }

    fn build_enum(&mut self, file: usize, e: &Enum) -> Result<()> {
        let values: Vec<graphql::EnumValue> = e
            .values
            .iter()
            .filter(|v| {
                if v.skip {
                    debug!(value = %v.name, enum_name = %e.full_name, "skipping enum value");
                }
                !v.skip
            })
            .map(|v| graphql::EnumValue {
                name: v.display_name.clone().unwrap_or_else(|| v.name.clone()),
                description: graphql::description(&v.comments),
                directives: deprecated(v.deprecated),
            })
            .collect();

        // An enum without values is not valid GraphQL
        if values.is_empty() {
            return Err(CompileError::EmptyEnum(e.full_name.clone()));
        }

        let name = self.enum_names.get(&e.full_name).cloned().unwrap_or_default();
        self.emit(
            file,
            Declaration::Enum(graphql::Enum {
                name,
                description: graphql::description(&e.comments),
                values,
            }),
        );
        Ok(())
    }

    /// Build one shape of a message unless it already exists
    pub(crate) fn build_message(&mut self, message: &'a Message, mode: Mode) -> Result<()> {
        let state = self.state.entry(message.full_name.as_str()).or_default();
        if state.has(mode) {
            return Ok(());
        }
        state.mark(mode);

        let file = self.message(&message.full_name, &message.full_name)?.file;
        let names = self.names_of(&message.full_name, &message.full_name)?.clone();

        // Companions must not shadow declared fields or each other
        let mut taken: HashSet<String> = message
            .fields
            .iter()
            .map(|entry| match entry {
                MessageField::Plain(field) => {
                    names::field_name(&field.name, self.params.field_name)
                }
                MessageField::Oneof(index) => {
                    names::field_name(&message.oneofs[*index].name, self.params.field_name)
                }
            })
            .collect();

        let mut fields = Vec::with_capacity(message.fields.len() + 1);
        for entry in &message.fields {
            match entry {
                MessageField::Plain(field) => {
                    fields.push(self.map_field(file, message, field, mode)?);
                    if mode == Mode::Output {
                        let companion = self.foreign_key_field(message, field, &mut taken)?;
                        fields.extend(companion);
                    }
                }
                MessageField::Oneof(index) => {
                    let oneof = &message.oneofs[*index];
                    let type_name = self.type_name_of(message, &[&oneof.name], mode == Mode::Input);
                    let mut placeholder = graphql::Field::new(
                        names::field_name(&oneof.name, self.params.field_name),
                        type_name,
                        TypeModifiers::NONE,
                    );
                    placeholder.description = graphql::description(&oneof.comments);
                    fields.push(placeholder);
                }
            }
        }

        // Declarations with zero fields are not valid GraphQL
        if fields.is_empty() {
            fields.push(graphql::Field::new(
                EMPTY_FIELD,
                graphql::SCALAR_BOOLEAN,
                TypeModifiers::NONE,
            ));
        }

        let description = graphql::description(&message.comments);
        let declaration = match mode {
            Mode::Output => Declaration::Object(graphql::Object {
                name: names.object,
                description,
                fields,
            }),
            Mode::Input => Declaration::Input(graphql::Input {
                name: names.input,
                description,
                fields,
            }),
        };
        self.emit(file, declaration);

        for oneof in message.oneofs.iter().filter(|o| !o.fields.is_empty()) {
            match mode {
                Mode::Output => self.build_union(file, message, oneof)?,
                Mode::Input => self.build_oneof_input(file, message, oneof)?,
            }
        }

        Ok(())
    }

    /// A union over one wrapper object per member
    fn build_union(&mut self, file: usize, message: &'a Message, oneof: &Oneof) -> Result<()> {
        let mut variants = Vec::with_capacity(oneof.fields.len());
        for member in &oneof.fields {
            let name = self.type_name_of(message, &[&oneof.name, &member.name], false);
            let fields = vec![
                graphql::Field::new(
                    ONEOF_DISCRIMINATOR,
                    graphql::SCALAR_STRING,
                    TypeModifiers::NON_NULL,
                ),
                self.map_field(file, message, member, Mode::Output)?,
            ];
            variants.push(graphql::Object {
                name,
                description: graphql::description(&member.comments),
                fields,
            });
        }

        self.emit(
            file,
            Declaration::Union(graphql::Union {
                name: self.type_name_of(message, &[&oneof.name], false),
                description: graphql::description(&oneof.comments),
                type_names: variants.iter().map(|v| v.name.clone()).collect(),
            }),
        );
        for variant in variants {
            self.emit(file, Declaration::Object(variant));
        }

        Ok(())
    }

    /// Every member side by side; at most one may be set, but the schema
    /// cannot express that
    fn build_oneof_input(
        &mut self,
        file: usize,
        message: &'a Message,
        oneof: &Oneof,
    ) -> Result<()> {
        let mut fields = Vec::with_capacity(oneof.fields.len());
        for member in &oneof.fields {
            fields.push(self.map_field(file, message, member, Mode::Input)?);
        }

        self.emit(
            file,
            Declaration::Input(graphql::Input {
                name: self.type_name_of(message, &[&oneof.name], true),
                description: graphql::description(&oneof.comments),
                fields,
            }),
        );
        Ok(())
    }

    /// Companion field exposing the object a foreign key points at.
    ///
    /// Named after the key without its `_<target field>` suffix, else after the
    /// target. When that name is already taken the key name is joined with the
    /// target name (`owner` -> `ownerTarget`).
    fn foreign_key_field(
        &self,
        message: &Message,
        field: &Field,
        taken: &mut HashSet<String>,
    ) -> Result<Option<graphql::Field>> {
        let Some(fk) = &field.foreign_key else {
            return Ok(None);
        };

        let target = self.message(&fk.full_name, &message.full_name)?.message;
        let type_name = self.names_of(&fk.full_name, &message.full_name)?.object.clone();

        let suffix = format!("_{}", fk.field_name);
        let base = field
            .name
            .strip_suffix(suffix.as_str())
            .filter(|base| !base.is_empty())
            .unwrap_or(target.name.as_str());

        let modifiers = if field.is_repeated() {
            TypeModifiers::LIST | TypeModifiers::NON_NULL | TypeModifiers::NON_NULL_LIST
        } else {
            TypeModifiers::NONE
        };

        let mut name = names::field_name(base, self.params.field_name);
        if taken.contains(&name) {
            name = format!(
                "{}{}",
                names::field_name(&field.name, self.params.field_name),
                names::upper_case_first(&target.name)
            );
        }
        if !taken.insert(name.clone()) {
            return Err(CompileError::DuplicateField {
                message: message.full_name.clone(),
                field: name,
            });
        }

        Ok(Some(graphql::Field::new(name, type_name, modifiers)))
    }
}

pub(crate) fn deprecated(flag: bool) -> Vec<String> {
    if flag {
        vec![graphql::DIRECTIVE_DEPRECATED.to_string()]
    } else {
        Vec::new()
    }
}
