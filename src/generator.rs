//! Request -> generated documents
//!
//! The whole request is compiled at once, since a requested file may refer to
//! messages declared in any of its dependencies, and then one document is
//! rendered per requested file.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Parameters;
use crate::descriptor::{CodeGeneratorRequest, File};
use crate::error::Result;
use crate::graphql::render_document;
use crate::mapper::compile;

/// Extension replacing `.proto` in generated file names
pub const OUTPUT_EXTENSION: &str = "_pb.graphql";

/// One rendered schema document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Path relative to the output root
    pub name: String,
    pub content: String,
}

/// Compile a request and render every requested file that declares anything
pub fn generate(request: &CodeGeneratorRequest, params: &Parameters) -> Result<Vec<GeneratedFile>> {
    let files = File::build_all(&request.proto_file)?;
    let compilation = compile(&files, params)?;

    let requested: Vec<&str> = if request.file_to_generate.is_empty() {
        files.iter().map(|f| f.name.as_str()).collect()
    } else {
        request.file_to_generate.iter().map(String::as_str).collect()
    };

    let mut generated = Vec::with_capacity(requested.len());
    for name in requested {
        let Some(output) = compilation.file(name) else {
            warn!(file = name, "requested file is not part of the request");
            continue;
        };

        let document = output.document();
        if document.is_empty() {
            debug!(file = name, "no declarations, skipping");
            continue;
        }

        generated.push(GeneratedFile {
            name: output_name(name),
            content: render_document(&document),
        });
    }

    info!(generated = generated.len(), "rendered documents");
    Ok(generated)
}

/// `foo/bar.proto` -> `foo/bar_pb.graphql`
pub fn output_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".proto").unwrap_or(file_name);
    format!("{stem}{OUTPUT_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CodeGeneratorRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_output_name() {
        assert_eq!(output_name("foo/bar.proto"), "foo/bar_pb.graphql");
        assert_eq!(output_name("plain"), "plain_pb.graphql");
    }

    #[test]
    fn test_generate_requested_files_only() {
        let request = request(
            r#"{
                "fileToGenerate": ["acme/user.proto"],
                "protoFile": [
                    {"name": "acme/common.proto", "package": "acme", "syntax": "proto3",
                     "messageType": [{"name": "Money", "field": [
                        {"name": "units", "number": 1, "type": "TYPE_INT32"}
                     ]}]},
                    {"name": "acme/user.proto", "package": "acme", "syntax": "proto3",
                     "dependency": ["acme/common.proto"],
                     "messageType": [{"name": "User", "field": [
                        {"name": "balance", "number": 1, "type": "TYPE_MESSAGE",
                            "typeName": ".acme.Money"}
                     ]}]}
                ]
            }"#,
        );

        let generated = generate(&request, &Parameters::default()).unwrap();
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].name, "acme/user_pb.graphql");
        assert_eq!(
            generated[0].content,
            concat!(
                "# Code generated by protoc-gen-graphql. DO NOT EDIT.\n",
                "# source: acme/user.proto\n",
                "\n",
                "type Acme_User {\n  balance: Acme_Money\n}\n",
            )
        );
    }

    #[test]
    fn test_files_without_declarations_are_skipped() {
        let request = request(
            r#"{"protoFile": [
                {"name": "empty.proto", "package": "p"},
                {"name": "one.proto", "package": "p",
                 "enumType": [{"name": "E", "value": [{"name": "A", "number": 0}]}]}
            ]}"#,
        );

        let generated = generate(&request, &Parameters::default()).unwrap();
        let names: Vec<_> = generated.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["one_pb.graphql"]);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let request = request(
            r#"{"protoFile": [{"name": "d.proto", "package": "p", "syntax": "proto3",
                "messageType": [
                    {"name": "A", "field": [
                        {"name": "b", "number": 1, "type": "TYPE_MESSAGE", "typeName": ".p.B"}
                    ]},
                    {"name": "B", "field": [
                        {"name": "a", "number": 1, "type": "TYPE_MESSAGE", "typeName": ".p.A"}
                    ]}
                ]
            }]}"#,
        );
        let params = Parameters::parse("input_mode=all").unwrap();
        assert_eq!(generate(&request, &params).unwrap(), generate(&request, &params).unwrap());
    }
}
