//! Structural rules for nodes, node references, and edges, and the
//! [`ValidationError`] they report.

use thiserror::Error;

use crate::properties::PropertyError;

/// Maximum number of kinds a single node may declare.
pub const MAX_KINDS: usize = 3;

/// Errors returned when a node, edge, or node reference is structurally
/// invalid, or when the builder rejects an insertion.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("node id must be a non-empty string")]
    InvalidId,

    #[error("node {id:?} has {count} kinds; at most {max} are allowed", max = MAX_KINDS)]
    TooManyKinds { id: String, count: usize },

    #[error("node {id:?} kind at index {index} must not be empty")]
    EmptyKind { id: String, index: usize },

    #[error("node {0:?} must have at least one kind when the graph has no source_kind")]
    MissingKind(String),

    #[error("node with id {0:?} already exists")]
    DuplicateId(String),

    #[error("node reference value must be a non-empty string")]
    EmptyReferenceValue,

    #[error("kind filter on node reference {0:?} must not be empty when present")]
    EmptyReferenceKind(String),

    #[error("edge kind must be a non-empty string")]
    EmptyEdgeKind,

    #[error("invalid properties: {0}")]
    InvalidProperties(#[from] PropertyError),
}

/// Check the id and kind-list rules shared by every node, in field order.
///
/// The zero-kinds rule depends on the owning graph and is checked by the
/// builder, not here.
pub(crate) fn check_node_shape(id: &str, kinds: &[String]) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::InvalidId);
    }

    if kinds.len() > MAX_KINDS {
        return Err(ValidationError::TooManyKinds {
            id: id.to_string(),
            count: kinds.len(),
        });
    }

    if let Some(index) = kinds.iter().position(|k| k.is_empty()) {
        return Err(ValidationError::EmptyKind {
            id: id.to_string(),
            index,
        });
    }

    Ok(())
}

pub(crate) fn check_reference(value: &str, kind: Option<&str>) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::EmptyReferenceValue);
    }
    if kind.is_some_and(str::is_empty) {
        return Err(ValidationError::EmptyReferenceKind(value.to_string()));
    }
    Ok(())
}

pub(crate) fn check_edge_kind(kind: &str) -> Result<(), ValidationError> {
    if kind.is_empty() {
        return Err(ValidationError::EmptyEdgeKind);
    }
    Ok(())
}

// --- tests -------------------------------------------------------------------
