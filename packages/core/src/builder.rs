use std::collections::HashMap;

use tracing::{debug, warn};

use crate::export::Document;
use crate::properties::RawProperties;
use crate::types::{Edge, MatchBy, Node, NodeReference};
use crate::validation::ValidationError;

/// An in-memory OpenGraph under construction.
///
/// The builder is the only authority on graph-level invariants: node ids are
/// unique, and a node may declare zero kinds only when the graph has a
/// `source_kind`. Nodes and edges keep their insertion order, which is the
/// order they are exported in.
///
/// Edges are not checked against nodes on insertion; see
/// [`check_references`](Self::check_references) for that.
#[derive(Debug, Default, Clone)]
pub struct OpenGraphBuilder {
    source_kind: Option<String>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    // node id -> position in `nodes`
    index: HashMap<String, usize>,
}

/// Optional parts of an edge built with [`OpenGraphBuilder::create_edge`].
///
/// Defaults match both ends by id, with no kind filters and no properties.
#[derive(Debug, Clone, Default)]
pub struct EdgeOptions {
    pub start_match_by: MatchBy,
    pub end_match_by: MatchBy,
    pub start_kind: Option<String>,
    pub end_kind: Option<String>,
    pub properties: Option<RawProperties>,
}

impl EdgeOptions {
    pub fn start_match_by(mut self, match_by: MatchBy) -> Self {
        self.start_match_by = match_by;
        self
    }

    pub fn end_match_by(mut self, match_by: MatchBy) -> Self {
        self.end_match_by = match_by;
        self
    }

    pub fn start_kind(mut self, kind: impl Into<String>) -> Self {
        self.start_kind = Some(kind.into());
        self
    }

    pub fn end_kind(mut self, kind: impl Into<String>) -> Self {
        self.end_kind = Some(kind.into());
        self
    }

    pub fn properties(mut self, properties: RawProperties) -> Self {
        self.properties = Some(properties);
        self
    }
}

impl OpenGraphBuilder {
    /// Create an empty graph with no source kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph whose nodes are attributed to `source_kind`.
    ///
    /// An empty string is treated as no source kind.
    pub fn with_source_kind(source_kind: impl Into<String>) -> Self {
        let source_kind = source_kind.into();
        Self {
            source_kind: (!source_kind.is_empty()).then_some(source_kind),
            ..Self::default()
        }
    }

    /// Rebuild a graph from a parsed [`Document`].
    ///
    /// Nodes and edges are replayed through [`add_node`](Self::add_node) and
    /// [`add_edge`](Self::add_edge), so duplicate ids and missing kinds are
    /// reported exactly as for programmatic construction.
    pub fn from_document(document: Document) -> Result<Self, ValidationError> {
        let source_kind = document.metadata.and_then(|m| m.source_kind);
        let mut builder = match source_kind {
            Some(kind) => Self::with_source_kind(kind),
            None => Self::new(),
        };
        for node in document.graph.nodes {
            if let Err(e) = builder.add_node(node) {
                warn!(error = %e, "rejected node while importing document");
                return Err(e);
            }
        }
        for edge in document.graph.edges {
            builder.add_edge(edge);
        }
        Ok(builder)
    }

    pub fn source_kind(&self) -> Option<&str> {
        self.source_kind.as_deref()
    }

    /// Insert a node.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::DuplicateId`] if a node with the same id is stored;
    ///   the stored node is left untouched.
    /// - [`ValidationError::MissingKind`] if the node has no kinds and the
    ///   graph has no source kind.
    pub fn add_node(&mut self, node: Node) -> Result<&Node, ValidationError> {
        if self.index.contains_key(node.id()) {
            return Err(ValidationError::DuplicateId(node.id().to_string()));
        }
        self.check_kinds_present(&node)?;
        Ok(self.push_node(node))
    }

    /// Build a node from its parts and [`add_node`](Self::add_node) it.
    ///
    /// Returns the stored node so its id can be used straight away in edges.
    pub fn create_node<K>(
        &mut self,
        id: impl Into<String>,
        kinds: K,
        properties: Option<RawProperties>,
    ) -> Result<&Node, ValidationError>
    where
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let node = Node::new(id, kinds, properties)?;
        self.add_node(node)
    }

    /// Insert a node, or merge it into the stored node with the same id.
    ///
    /// Merging unions the kinds (first-seen order) and overlays the
    /// properties, new values winning. The stored node keeps its position.
    /// A merge that would exceed three kinds fails and leaves the stored node
    /// unchanged. An incoming node without kinds needs a source kind, as for
    /// [`add_node`](Self::add_node).
    pub fn merge_node(&mut self, node: Node) -> Result<&Node, ValidationError> {
        let Some(&pos) = self.index.get(node.id()) else {
            return self.add_node(node);
        };
        self.check_kinds_present(&node)?;
        let merged = self.nodes[pos].merged_with(node)?;
        debug!(id = merged.id(), kinds = ?merged.kinds(), "merged node");
        self.nodes[pos] = merged;
        Ok(&self.nodes[pos])
    }

    /// Build a node from its parts and [`merge_node`](Self::merge_node) it.
    pub fn create_or_merge_node<K>(
        &mut self,
        id: impl Into<String>,
        kinds: K,
        properties: Option<RawProperties>,
    ) -> Result<&Node, ValidationError>
    where
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let node = Node::new(id, kinds, properties)?;
        self.merge_node(node)
    }

    /// Append an edge. Edges are never deduplicated.
    pub fn add_edge(&mut self, edge: Edge) -> &Edge {
        debug!(
            kind = edge.kind(),
            start = edge.start().value(),
            end = edge.end().value(),
            "added edge"
        );
        self.edges.push(edge);
        &self.edges[self.edges.len() - 1]
    }

    /// Build two node references and an edge between them, then
    /// [`add_edge`](Self::add_edge) it.
    pub fn create_edge(
        &mut self,
        start_value: impl Into<String>,
        end_value: impl Into<String>,
        kind: impl Into<String>,
        options: EdgeOptions,
    ) -> Result<&Edge, ValidationError> {
        let start = NodeReference::new(start_value, options.start_match_by, options.start_kind)?;
        let end = NodeReference::new(end_value, options.end_match_by, options.end_kind)?;
        let edge = Edge::new(start, end, kind, options.properties)?;
        Ok(self.add_edge(edge))
    }

    /// Retrieve a node by id.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&pos| &self.nodes[pos])
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Remove every node and edge. The source kind is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.index.clear();
    }

    // --- helpers -------------------------------------------------------------

    fn check_kinds_present(&self, node: &Node) -> Result<(), ValidationError> {
        if node.kinds().is_empty() && self.source_kind.is_none() {
            return Err(ValidationError::MissingKind(node.id().to_string()));
        }
        Ok(())
    }

    fn push_node(&mut self, node: Node) -> &Node {
        let pos = self.nodes.len();
        debug!(id = node.id(), kinds = ?node.kinds(), "added node");
        self.index.insert(node.id().to_string(), pos);
        self.nodes.push(node);
        &self.nodes[pos]
    }
}

// --- tests -------------------------------------------------------------------
