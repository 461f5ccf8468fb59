//! Opt-in resolution of edge endpoints against the nodes of a graph.
//!
//! Insertion never requires referenced nodes to exist. Before handing a
//! document to a consumer that does require it, call
//! [`OpenGraphBuilder::check_references`] to find dangling or ambiguous
//! references.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::builder::OpenGraphBuilder;
use crate::types::{MatchBy, Node, NodeReference};

/// Why a single [`NodeReference`] failed to resolve.
#[derive(Debug, Error, PartialEq)]
pub enum ReferenceError {
    #[error("no node has id {0:?}")]
    UnknownId(String),

    #[error("no node has name {0:?}")]
    UnknownName(String),

    #[error("{count} nodes match name {value:?}; add a kind filter so the reference resolves to exactly one node")]
    AmbiguousName { value: String, count: usize },

    #[error("node {value:?} does not have kind {kind:?}")]
    KindMismatch { value: String, kind: String },
}

/// Which end of an edge a reference sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    Start,
    End,
}

impl fmt::Display for EdgeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeEnd::Start => write!(f, "start"),
            EdgeEnd::End => write!(f, "end"),
        }
    }
}

/// A reference failure located on a specific edge.
#[derive(Debug, Error, PartialEq)]
#[error("edge {index} {end}: {reason}")]
pub struct ResolutionError {
    /// Position of the edge in insertion order.
    pub index: usize,
    pub end: EdgeEnd,
    pub reason: ReferenceError,
}

/// Lookup tables over a slice of nodes, by id and by `name` property.
///
/// Kind filters match a node's declared kinds, or the graph's source kind,
/// which a consumer attributes to every node.
pub struct NodeIndex<'a> {
    by_id: HashMap<&'a str, &'a Node>,
    by_name: HashMap<&'a str, Vec<&'a Node>>,
    source_kind: Option<&'a str>,
}

impl<'a> NodeIndex<'a> {
    pub fn new(nodes: &'a [Node], source_kind: Option<&'a str>) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        let mut by_name: HashMap<&str, Vec<&Node>> = HashMap::new();
        for node in nodes {
            by_id.insert(node.id(), node);
            if let Some(name) = node.name() {
                by_name.entry(name).or_default().push(node);
            }
        }
        Self {
            by_id,
            by_name,
            source_kind,
        }
    }

    /// Resolve `reference` to exactly one node.
    pub fn resolve(&self, reference: &NodeReference) -> Result<&'a Node, ReferenceError> {
        let value = reference.value();
        match reference.match_by() {
            MatchBy::Id => {
                let node = *self
                    .by_id
                    .get(value)
                    .ok_or_else(|| ReferenceError::UnknownId(value.to_string()))?;
                match reference.kind() {
                    Some(kind) if !self.has_kind(node, kind) => Err(ReferenceError::KindMismatch {
                        value: value.to_string(),
                        kind: kind.to_string(),
                    }),
                    _ => Ok(node),
                }
            }
            MatchBy::Name => {
                let candidates = self
                    .by_name
                    .get(value)
                    .ok_or_else(|| ReferenceError::UnknownName(value.to_string()))?;
                let matching: Vec<&'a Node> = match reference.kind() {
                    Some(kind) => candidates
                        .iter()
                        .copied()
                        .filter(|n| self.has_kind(n, kind))
                        .collect(),
                    None => candidates.clone(),
                };
                match matching.as_slice() {
                    [node] => Ok(*node),
                    [] => Err(ReferenceError::KindMismatch {
                        value: value.to_string(),
                        kind: reference.kind().unwrap_or_default().to_string(),
                    }),
                    many => Err(ReferenceError::AmbiguousName {
                        value: value.to_string(),
                        count: many.len(),
                    }),
                }
            }
        }
    }

    fn has_kind(&self, node: &Node, kind: &str) -> bool {
        node.has_kind(kind) || self.source_kind == Some(kind)
    }
}

impl OpenGraphBuilder {
    /// Resolve a single reference against this graph's nodes.
    pub fn resolve(&self, reference: &NodeReference) -> Result<&Node, ReferenceError> {
        NodeIndex::new(self.nodes(), self.source_kind()).resolve(reference)
    }

    /// Check that every edge endpoint resolves to exactly one node of this graph.
    ///
    /// Edges are checked in insertion order, start before end; the first
    /// failure is returned.
    pub fn check_references(&self) -> Result<(), ResolutionError> {
        let index = NodeIndex::new(self.nodes(), self.source_kind());
        for (i, edge) in self.edges().iter().enumerate() {
            for (end, reference) in [(EdgeEnd::Start, edge.start()), (EdgeEnd::End, edge.end())] {
                index.resolve(reference).map_err(|reason| ResolutionError {
                    index: i,
                    end,
                    reason,
                })?;
            }
        }
        Ok(())
    }
}

// --- tests -------------------------------------------------------------------
