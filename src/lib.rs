//! protoc-gen-graphql
//!
//! Compiles protobuf declarations (messages, enums, services) into a GraphQL
//! schema document per source file.
//!
//! ## Pipeline
//!
//! ```text
//! CodeGeneratorRequest (JSON)
//!   └─ descriptor   File / Message / Enum / Service, comments attached
//!       └─ graph    dependency order over messages (cycle tolerant)
//!           └─ mapper   enums, objects, unions, inputs, root containers
//!               └─ graphql::render   SDL text, one document per file
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use protoc_gen_graphql::{generate, CodeGeneratorRequest, Parameters};
//!
//! let request: CodeGeneratorRequest = serde_json::from_str(r#"{"protoFile": []}"#)?;
//! let params = Parameters::parse("timestamp=DateTime,input_mode=all")?;
//! for file in generate(&request, &params)? {
//!     println!("{}:\n{}", file.name, file.content);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod graph;
pub mod graphql;
pub mod mapper;

pub use config::{FieldNameMode, InputMode, Int64Type, Parameters};
pub use descriptor::{CodeGeneratorRequest, File, FileDescriptorProto};
pub use error::{CompileError, Result};
pub use generator::{generate, output_name, GeneratedFile};
pub use graph::TypeGraph;
pub use mapper::{compile, Compilation, LoaderBinding};
