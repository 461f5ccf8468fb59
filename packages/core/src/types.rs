//! Graph entities: [`Node`], [`NodeReference`], [`Edge`], and [`MatchBy`].
//!
//! Entities are immutable values that are checked when they are built. Fields
//! are private so a `Node` or `Edge` that exists is always structurally
//! valid; deserialisation goes through the same checks via
//! `#[serde(try_from = ...)]`.
//!
//! Graph-level rules (unique ids, the zero-kinds/source-kind interaction) are
//! enforced by [`OpenGraphBuilder`](crate::OpenGraphBuilder), not here.

use serde::{Deserialize, Serialize};

use crate::properties::{parse_properties, PropertyMap, PropertyValue, RawProperties};
use crate::validation::{
    check_edge_kind, check_node_shape, check_reference, ValidationError, MAX_KINDS,
};

/// How a [`NodeReference`] is resolved against the nodes of a graph.
///
/// Serialises as a lowercase string (`"id"` or `"name"`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchBy {
    /// Match the node whose `id` equals the reference value.
    #[default]
    Id,
    /// Match the node whose `name` property equals the reference value.
    Name,
}

impl std::fmt::Display for MatchBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchBy::Id => write!(f, "id"),
            MatchBy::Name => write!(f, "name"),
        }
    }
}

/// Parses a [`MatchBy`] from its lowercase wire-format string.
impl std::str::FromStr for MatchBy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(MatchBy::Id),
            "name" => Ok(MatchBy::Name),
            _ => Err(format!("unknown match strategy {:?}; expected one of: id, name", s)),
        }
    }
}

/// A pointer to a node, used as either end of an [`Edge`].
///
/// This is a descriptor, not a verified link: nothing checks that the target
/// exists when the reference is built. See
/// [`OpenGraphBuilder::check_references`](crate::OpenGraphBuilder::check_references)
/// for opt-in resolution.
///
/// Serialises as `{ "value": ..., "match_by": "id"|"name", "kind"?: ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawReference")]
pub struct NodeReference {
    value: String,
    match_by: MatchBy,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
}

impl NodeReference {
    /// Build a reference, checking that `value` and any `kind` filter are non-empty.
    pub fn new(
        value: impl Into<String>,
        match_by: MatchBy,
        kind: Option<String>,
    ) -> Result<Self, ValidationError> {
        let value = value.into();
        check_reference(&value, kind.as_deref())?;
        Ok(Self {
            value,
            match_by,
            kind,
        })
    }

    /// Reference a node by id, with no kind filter.
    pub fn by_id(value: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(value, MatchBy::Id, None)
    }

    /// Reference a node by its `name` property, with no kind filter.
    pub fn by_name(value: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(value, MatchBy::Name, None)
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn match_by(&self) -> MatchBy {
        self.match_by
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }
}

#[derive(Deserialize)]
struct RawReference {
    value: String,
    #[serde(default)]
    match_by: MatchBy,
    #[serde(default)]
    kind: Option<String>,
}

impl TryFrom<RawReference> for NodeReference {
    type Error = ValidationError;
    fn try_from(raw: RawReference) -> Result<Self, Self::Error> {
        Self::new(raw.value, raw.match_by, raw.kind)
    }
}

/// A node of the graph.
///
/// Serialises as `{ "id": ..., "kinds": [...], "properties"?: {...} }`;
/// `properties` is omitted when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct Node {
    id: String,
    kinds: Vec<String>,
    #[serde(skip_serializing_if = "PropertyMap::is_empty")]
    properties: PropertyMap,
}

impl Node {
    /// Build a node, checking in order: non-empty id, at most three kinds,
    /// non-empty kind labels, then the property rules.
    ///
    /// An empty `kinds` list is accepted here; whether it is legal depends on
    /// the graph the node is added to.
    pub fn new<K>(
        id: impl Into<String>,
        kinds: K,
        properties: Option<RawProperties>,
    ) -> Result<Self, ValidationError>
    where
        K: IntoIterator,
        K::Item: Into<String>,
    {
        let id = id.into();
        let kinds: Vec<String> = kinds.into_iter().map(Into::into).collect();
        check_node_shape(&id, &kinds)?;
        let properties = match &properties {
            Some(raw) => parse_properties(raw)?,
            None => PropertyMap::new(),
        };
        Ok(Self {
            id,
            kinds,
            properties,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// The `name` property, when it is a string. Used by name-based references.
    pub fn name(&self) -> Option<&str> {
        self.property("name").and_then(PropertyValue::as_str)
    }

    pub fn has_kind(&self, kind: &str) -> bool {
        self.kinds.iter().any(|k| k == kind)
    }

    /// Combine `other` into a copy of this node.
    ///
    /// Kinds are unioned in first-seen order; properties from `other` override
    /// properties with the same key. Fails if the union exceeds [`MAX_KINDS`].
    pub(crate) fn merged_with(&self, other: Node) -> Result<Node, ValidationError> {
        let mut kinds = self.kinds.clone();
        for kind in other.kinds {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.len() > MAX_KINDS {
            return Err(ValidationError::TooManyKinds {
                id: self.id.clone(),
                count: kinds.len(),
            });
        }

        let mut properties = self.properties.clone();
        properties.extend(other.properties);

        Ok(Node {
            id: self.id.clone(),
            kinds,
            properties,
        })
    }
}

#[derive(Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    kinds: Vec<String>,
    #[serde(default)]
    properties: Option<RawProperties>,
}

impl TryFrom<RawNode> for Node {
    type Error = ValidationError;
    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        Self::new(raw.id, raw.kinds, raw.properties)
    }
}

/// A directed, typed relationship between two [`NodeReference`]s.
///
/// Self-loops are legal. Serialises as
/// `{ "start": {...}, "end": {...}, "kind": ..., "properties"?: {...} }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEdge")]
pub struct Edge {
    start: NodeReference,
    end: NodeReference,
    kind: String,
    #[serde(skip_serializing_if = "PropertyMap::is_empty")]
    properties: PropertyMap,
}

impl Edge {
    /// Build an edge, checking that `kind` is non-empty and `properties` pass
    /// the property rules. Both references are already valid by construction.
    pub fn new(
        start: NodeReference,
        end: NodeReference,
        kind: impl Into<String>,
        properties: Option<RawProperties>,
    ) -> Result<Self, ValidationError> {
        let kind = kind.into();
        check_edge_kind(&kind)?;
        let properties = match &properties {
            Some(raw) => parse_properties(raw)?,
            None => PropertyMap::new(),
        };
        Ok(Self {
            start,
            end,
            kind,
            properties,
        })
    }

    pub fn start(&self) -> &NodeReference {
        &self.start
    }

    pub fn end(&self) -> &NodeReference {
        &self.end
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

#[derive(Deserialize)]
struct RawEdge {
    start: NodeReference,
    end: NodeReference,
    kind: String,
    #[serde(default)]
    properties: Option<RawProperties>,
}

impl TryFrom<RawEdge> for Edge {
    type Error = ValidationError;
    fn try_from(raw: RawEdge) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end, raw.kind, raw.properties)
    }
}

// --- tests -------------------------------------------------------------------
