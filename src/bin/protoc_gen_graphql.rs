//! protoc-gen-graphql CLI
//!
//! Reads a JSON `CodeGeneratorRequest` (from a file or stdin), or assembles
//! one from a directory of `FileDescriptorProto` JSON files, and writes one
//! GraphQL document per requested file.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use protoc_gen_graphql::{generate, CodeGeneratorRequest, FileDescriptorProto, Parameters};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "protoc-gen-graphql")]
#[command(about = "Compile protobuf descriptors into GraphQL schema documents")]
struct Cli {
    /// JSON CodeGeneratorRequest (reads stdin when omitted)
    #[arg(short, long, conflicts_with = "input_dir")]
    input: Option<PathBuf>,

    /// Directory of FileDescriptorProto JSON files; every file is generated
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Generator parameters, applied last (e.g. "timestamp=DateTime,input_mode=all")
    #[arg(short, long)]
    parameter: Option<String>,

    /// Extra configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Output directory (prints to stdout when omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut params = Parameters::load_from(cli.config.as_deref()).context("loading configuration")?;

    let request = match (&cli.input, &cli.input_dir) {
        (_, Some(dir)) => request_from_dir(dir)?,
        (Some(path), None) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?
        }
        (None, None) if cli.print_config => CodeGeneratorRequest::default(),
        (None, None) => {
            let mut json = String::new();
            io::stdin().read_to_string(&mut json).context("reading stdin")?;
            serde_json::from_str(&json).context("parsing request from stdin")?
        }
    };

    // Request parameter first, so the command line wins
    if let Some(parameter) = &request.parameter {
        params.apply(parameter).context("request parameter")?;
    }
    if let Some(parameter) = &cli.parameter {
        params.apply(parameter).context("--parameter")?;
    }

    if cli.print_config {
        print!("{}", params.to_toml()?);
        return Ok(());
    }

    let generated = generate(&request, &params)?;

    match &cli.out {
        Some(out) => {
            for file in &generated {
                let path = out.join(&file.name);
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, &file.content)
                    .with_context(|| format!("writing {}", path.display()))?;
                debug!(path = %path.display(), "wrote document");
            }
            info!(files = generated.len(), out = %out.display(), "generation complete");
        }
        None => {
            let mut stdout = io::stdout().lock();
            for file in &generated {
                writeln!(stdout, "# file: {}", file.name)?;
                stdout.write_all(file.content.as_bytes())?;
            }
        }
    }

    Ok(())
}

/// Every `*.json` below `dir`, sorted by path, as one request
fn request_from_dir(dir: &Path) -> Result<CodeGeneratorRequest> {
    let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut request = CodeGeneratorRequest::default();
    for path in paths {
        let json = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let file: FileDescriptorProto =
            serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))?;
        debug!(path = %path.display(), file = %file.name, "loaded descriptor");
        request.proto_file.push(file);
    }

    info!(files = request.proto_file.len(), dir = %dir.display(), "assembled request");
    Ok(request)
}
