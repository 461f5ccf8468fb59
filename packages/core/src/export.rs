//! Canonical JSON export of an [`OpenGraphBuilder`].
//!
//! The document shape is fixed by the OpenGraph schema:
//!
//! ```json
//! {
//!   "graph": {
//!     "nodes": [ { "id": "...", "kinds": ["..."], "properties": { } } ],
//!     "edges": [ { "start": { "value": "...", "match_by": "id" },
//!                  "end":   { "value": "...", "match_by": "name", "kind": "..." },
//!                  "kind": "...", "properties": { } } ]
//!   },
//!   "metadata": { "source_kind": "..." }
//! }
//! ```
//!
//! `properties` and `kind` filters are omitted when absent. `metadata` is only
//! written when the graph has a source kind, so an empty graph exports as
//! `{"graph":{"nodes":[],"edges":[]}}`. Nodes and edges appear in insertion
//! order, so the same sequence of builder calls always produces
//! byte-identical output.

use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::Path;

use serde::ser::Error as SerError;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::builder::OpenGraphBuilder;
use crate::types::{Edge, Node};

/// Indentation used by [`ExportOptions::default`].
pub const DEFAULT_INDENT: usize = 2;

/// Errors returned while rendering or saving a document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize graph: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// How a document is rendered to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Spaces per nesting level; `None` renders compact single-line JSON.
    pub indent: Option<usize>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            indent: Some(DEFAULT_INDENT),
        }
    }
}

impl ExportOptions {
    pub fn compact() -> Self {
        Self { indent: None }
    }

    pub fn indent(width: usize) -> Self {
        Self {
            indent: Some(width),
        }
    }
}

/// An owned OpenGraph document.
///
/// Produced by [`OpenGraphBuilder::to_document`], or parsed from JSON with
/// [`Document::from_json`]. Parsing validates every node, edge, and
/// reference; graph-level rules are applied by
/// [`OpenGraphBuilder::from_document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub graph: GraphSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// The `graph` member of a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSection {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// The `metadata` member of a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_kind: Option<String>,
}

impl Document {
    /// Parse and validate a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the document with the given indentation (`None` = compact).
    pub fn to_json(&self, indent: Option<usize>) -> Result<String, ExportError> {
        render_json(self, indent)
    }
}

// Borrowed view with the same wire shape as `Document`, so exporting does not
// clone the graph.
#[derive(Serialize)]
struct DocumentRef<'a> {
    graph: GraphRef<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<MetadataRef<'a>>,
}

#[derive(Serialize)]
struct GraphRef<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
}

#[derive(Serialize)]
struct MetadataRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    source_kind: Option<&'a str>,
}

impl OpenGraphBuilder {
    /// Snapshot the graph as an owned [`Document`].
    pub fn to_document(&self) -> Document {
        Document {
            graph: GraphSection {
                nodes: self.nodes().to_vec(),
                edges: self.edges().to_vec(),
            },
            metadata: self.source_kind().map(|kind| Metadata {
                source_kind: Some(kind.to_owned()),
            }),
        }
    }

    /// Render the graph as JSON, indented by `indent` spaces per level, or
    /// compact when `indent` is `None`.
    pub fn to_json(&self, indent: Option<usize>) -> Result<String, ExportError> {
        render_json(&self.document_ref(), indent)
    }

    /// Render the graph as JSON using `options`.
    pub fn to_json_with(&self, options: &ExportOptions) -> Result<String, ExportError> {
        self.to_json(options.indent)
    }

    /// Write the graph to `path` with the default indentation.
    ///
    /// See [`save_to_file_with`](Self::save_to_file_with).
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        self.save_to_file_with(path, &ExportOptions::default())
    }

    /// Write the graph to `path`.
    ///
    /// The document is rendered in memory first, written to a temporary file
    /// in the destination directory, and then renamed over `path`. On any
    /// error `path` is left as it was and the temporary file is removed.
    ///
    /// A replaced file keeps its permissions. A new file gets mode 0644 on
    /// Unix.
    pub fn save_to_file_with(
        &self,
        path: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<(), ExportError> {
        let path = path.as_ref();
        let bytes = render_bytes(&self.document_ref(), options.indent)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let permissions = target_permissions(path)?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&bytes)?;
        if let Some(permissions) = permissions {
            file.as_file().set_permissions(permissions)?;
        }
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| e.error)?;

        info!(
            path = %path.display(),
            nodes = self.node_count(),
            edges = self.edge_count(),
            "saved OpenGraph document"
        );
        Ok(())
    }

    fn document_ref(&self) -> DocumentRef<'_> {
        DocumentRef {
            graph: GraphRef {
                nodes: self.nodes(),
                edges: self.edges(),
            },
            metadata: self.source_kind().map(|kind| MetadataRef {
                source_kind: Some(kind),
            }),
        }
    }
}

// --- helpers -----------------------------------------------------------------

fn render_bytes<T: Serialize>(value: &T, indent: Option<usize>) -> Result<Vec<u8>, ExportError> {
    let Some(width) = indent else {
        return Ok(serde_json::to_vec(value)?);
    };
    let indent = vec![b' '; width];
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(&indent);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}

fn render_json<T: Serialize>(value: &T, indent: Option<usize>) -> Result<String, ExportError> {
    let bytes = render_bytes(value, indent)?;
    String::from_utf8(bytes).map_err(|e| ExportError::Serialization(SerError::custom(e)))
}

// Permissions for the saved file: the target's own when it replaces a regular
// file, otherwise the usual 0644 instead of tempfile's owner-only 0600.
fn target_permissions(path: &Path) -> io::Result<Option<Permissions>> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(Some(meta.permissions())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}

// --- tests -------------------------------------------------------------------
