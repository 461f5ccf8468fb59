//! `opengraph` — command-line interface for OpenGraph documents.
//!
//! Provides three subcommands:
//!
//! - **`validate`** — check a document against the OpenGraph structural rules,
//!   optionally resolving every edge endpoint.
//! - **`render`** — print a human-readable summary of a document.
//! - **`fmt`** — re-emit a document in canonical form, to stdout or to a file.
//!
//! All subcommands read JSON from a file path or from stdin (`-`). Logging is
//! controlled with `RUST_LOG` and goes to stderr.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use opengraph::{render::render_graph, Document, ExportOptions, OpenGraphBuilder, DEFAULT_INDENT};

/// opengraph — OpenGraph document CLI
///
/// Validate, inspect, and reformat OpenGraph JSON documents.
#[derive(Parser)]
#[command(name = "opengraph", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate an OpenGraph document.
    ///
    /// Every node, edge, and property is checked, along with id uniqueness
    /// and the source_kind rule for nodes without kinds. Exits 0 if the
    /// document is valid, 1 otherwise.
    ///
    /// Pass `-` as FILE to read from stdin.
    Validate {
        /// Path to a JSON file, or `-` for stdin.
        file: PathBuf,

        /// Also require every edge start and end to resolve to exactly one
        /// node in the document.
        #[arg(long)]
        check_refs: bool,
    },

    /// Render a document as a human-readable summary.
    ///
    /// Pass `-` as FILE to read from stdin.
    Render {
        /// Path to a JSON file, or `-` for stdin.
        file: PathBuf,
    },

    /// Re-emit a document in canonical form.
    ///
    /// The document is validated first. Output goes to stdout unless
    /// `--output` is given, in which case the file is replaced atomically.
    ///
    /// Examples:
    ///   opengraph fmt graph.json --indent 4
    ///   opengraph fmt - --compact -o graph.min.json
    Fmt {
        /// Path to a JSON file, or `-` for stdin.
        file: PathBuf,

        /// Write to this file instead of stdout.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Spaces per indentation level.
        #[arg(long, value_name = "N", default_value_t = DEFAULT_INDENT, conflicts_with = "compact")]
        indent: usize,

        /// Emit single-line JSON.
        #[arg(long)]
        compact: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "opengraph=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { file, check_refs } => {
            let json = read_input(&file);
            let graph = match load_graph(&json) {
                Ok(graph) => graph,
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            };
            if check_refs {
                if let Err(e) = graph.check_references() {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            }
            println!(
                "valid: {} node{}, {} edge{}",
                graph.node_count(),
                if graph.node_count() == 1 { "" } else { "s" },
                graph.edge_count(),
                if graph.edge_count() == 1 { "" } else { "s" },
            );
        }

        Command::Render { file } => {
            let json = read_input(&file);
            let graph = load_graph(&json).unwrap_or_else(|e| fatal(&e));
            print!("{}", render_graph(&graph));
        }

        Command::Fmt {
            file,
            output,
            indent,
            compact,
        } => {
            let json = read_input(&file);
            let graph = load_graph(&json).unwrap_or_else(|e| fatal(&e));
            let options = if compact {
                ExportOptions::compact()
            } else {
                ExportOptions::indent(indent)
            };
            match output {
                Some(path) => {
                    graph.save_to_file_with(&path, &options).unwrap_or_else(|e| {
                        fatal(&format!("failed to write {}: {}", path.display(), e))
                    });
                    tracing::info!(path = %path.display(), "formatted document written");
                }
                None => {
                    let rendered = graph
                        .to_json_with(&options)
                        .unwrap_or_else(|e| fatal(&e.to_string()));
                    println!("{}", rendered);
                }
            }
        }
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path).unwrap_or_else(|e| {
            fatal(&format!("failed to read {}: {}", path.display(), e))
        })
    }
}

/// Parse a document and replay it through the builder.
///
/// Entity-level problems surface as parse errors; graph-level problems
/// (duplicate ids, missing kinds) surface from the replay. Both are returned
/// as display strings.
fn load_graph(json: &str) -> Result<OpenGraphBuilder, String> {
    let document = Document::from_json(json)
        .map_err(|e| format!("failed to parse input as an OpenGraph document: {}", e))?;
    OpenGraphBuilder::from_document(document).map_err(|e| e.to_string())
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("opengraph: {}", msg);
    process::exit(2);
}
