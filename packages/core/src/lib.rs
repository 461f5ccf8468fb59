//! Validating builder for BloodHound OpenGraph documents.
//!
//! This crate assembles a graph of nodes and edges in memory, checks every
//! entity against the OpenGraph structural rules as it is added, and exports
//! the result as the canonical JSON document a strict downstream consumer
//! expects. It is the library behind the `opengraph` CLI.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`properties`] | [`PropertyValue`] and the property-map validator [`validate_properties`] |
//! | [`types`] | Entities: [`Node`], [`NodeReference`], [`Edge`], [`MatchBy`] |
//! | [`validation`] | [`ValidationError`] and the per-entity structural rules |
//! | [`builder`] | [`OpenGraphBuilder`], the graph under construction |
//! | [`export`] | [`Document`] and JSON rendering / atomic file output |
//! | [`resolve`] | Opt-in resolution of edge endpoints against nodes |
//! | [`render`] | Human-readable text summaries |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use opengraph::{EdgeOptions, OpenGraphBuilder};
//!
//! let mut graph = OpenGraphBuilder::with_source_kind("MySystem");
//! graph.create_node("alice", ["User"], None)?;
//! graph.create_node("bob", ["User"], None)?;
//! graph.create_edge("alice", "bob", "knows", EdgeOptions::default())?;
//!
//! graph.check_references()?;
//! graph.save_to_file("graph.json")?;
//! ```

pub mod builder;
pub mod export;
pub mod properties;
pub mod render;
pub mod resolve;
pub mod types;
pub mod validation;

pub use builder::{EdgeOptions, OpenGraphBuilder};
pub use export::{Document, ExportError, ExportOptions, GraphSection, Metadata, DEFAULT_INDENT};
pub use properties::{
    parse_properties, validate_properties, PropertyError, PropertyMap, PropertyValue,
    RawProperties,
};
pub use resolve::{EdgeEnd, NodeIndex, ReferenceError, ResolutionError};
pub use types::{Edge, MatchBy, Node, NodeReference};
pub use validation::{ValidationError, MAX_KINDS};
