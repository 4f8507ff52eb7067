//! Service mapping
//!
//! Every exposed method becomes a field on one of three containers per
//! service (`<Service>_Query`, `<Service>_Mutation`, `<Service>_Subscription`).
//! With a root type prefix configured, each non-empty container is also
//! attached to the schema root through `extend type Query { ... }`.

use tracing::debug;

use crate::descriptor::{Method, Operation, Service};
use crate::error::Result;
use crate::graphql::{self, Argument, Declaration, ExtendObject, Object, TypeModifiers};

use super::names::{self, NameKind};
use super::{deprecated, Compiler, LoaderBinding};

/// Name of the request argument of root fields
pub const INPUT_ARGUMENT: &str = "input";

const OPERATIONS: [Operation; 3] = [
    Operation::Query,
    Operation::Mutation,
    Operation::Subscription,
];

/// Why a method is left out of the schema, if it is
pub fn skip_reason(service: &Service, method: &Method) -> Option<&'static str> {
    if service.skip {
        Some("service skipped")
    } else if method.skip {
        Some("method skipped")
    } else if method.is_streaming() {
        Some("streaming method")
    } else if method.operation == Operation::None {
        Some("operation none")
    } else {
        None
    }
}

impl<'a> Compiler<'a> {
    /// Every method that will be exposed on a root container
    pub(crate) fn mapped_methods(&self) -> impl Iterator<Item = &'a Method> + 'a {
        let files = self.files;
        files
            .iter()
            .flat_map(|f| f.services.iter())
            .flat_map(|s| s.methods.iter().map(move |m| (s, m)))
            .filter(|(s, m)| skip_reason(s, m).is_none())
            .map(|(_, m)| m)
    }

    pub(crate) fn build_service(&mut self, file: usize, service: &'a Service) -> Result<()> {
        let mut groups: [Vec<graphql::Field>; 3] = Default::default();

        for method in &service.methods {
            if let Some(reason) = skip_reason(service, method) {
                debug!(
                    service = %service.full_name,
                    method = %method.name,
                    reason,
                    "skipping method"
                );
                continue;
            }

            let field = self.method_field(service, method)?;
            if let Some(slot) = OPERATIONS.iter().position(|op| *op == method.operation) {
                groups[slot].push(field);
            }

            for loader in &method.loaders {
                let object_name = self
                    .names_of(&loader.full_name, &service.full_name)?
                    .object
                    .clone();
                self.loaders.push(LoaderBinding {
                    service: service.full_name.clone(),
                    method: method.name.clone(),
                    loader: loader.clone(),
                    object_name,
                });
            }
        }

        let mut extensions = Vec::new();
        for (operation, fields) in OPERATIONS.iter().zip(groups) {
            let Some(root) = operation.root_type() else {
                continue;
            };
            if fields.is_empty() {
                continue;
            }

            let container = self.names.type_name(
                &service.scope,
                &[service.name.as_str(), root],
                NameKind::OUTPUT,
            );

            if let Some(prefix) = &self.params.root_type_prefix {
                let words = names::parse_upper_camel(&format!("{prefix}{}", service.name));
                extensions.push(ExtendObject {
                    name: root.to_string(),
                    fields: vec![graphql::Field::new(
                        names::to_lower_camel(&words),
                        container.clone(),
                        TypeModifiers::NON_NULL,
                    )],
                });
            }

            self.emit(
                file,
                Declaration::Object(Object {
                    name: container,
                    description: graphql::description(&service.comments),
                    fields,
                }),
            );
        }

        for extension in extensions {
            self.emit(file, Declaration::ExtendObject(extension));
        }

        Ok(())
    }

    /// Root field for one method
    fn method_field(&self, service: &Service, method: &Method) -> Result<graphql::Field> {
        let referrer = format!("{}.{}", service.full_name, method.name);
        let request = self.message(&method.input_type, &referrer)?.message;
        let response = self.message(&method.output_type, &referrer)?.message;

        // An argument whose type has no fields would always be empty
        let mut arguments = Vec::new();
        if !request.is_empty() {
            arguments.push(Argument {
                name: INPUT_ARGUMENT.to_string(),
                type_name: self.names_of(&method.input_type, &referrer)?.input.clone(),
                modifiers: TypeModifiers::NON_NULL,
                default: None,
            });
        }

        // Resolvers decide what an empty response means
        let (type_name, modifiers) = if response.is_empty() {
            (graphql::SCALAR_BOOLEAN.to_string(), TypeModifiers::NONE)
        } else {
            (
                self.names_of(&method.output_type, &referrer)?.object.clone(),
                TypeModifiers::NON_NULL,
            )
        };

        let mut field = graphql::Field::new(
            names::method_name(&method.name, self.params.field_name),
            type_name,
            modifiers,
        );
        field.arguments = arguments;
        field.description = graphql::description(&method.comments);
        field.directives = deprecated(method.deprecated);
        Ok(field)
    }
}
