//! Human-readable text rendering of an [`OpenGraphBuilder`].
//!
//! The output is stable plain text for terminals and logs. It is not a
//! canonical format; only the JSON document is.

use crate::builder::OpenGraphBuilder;
use crate::types::{Edge, MatchBy, Node, NodeReference};

const MAX_VALUE_WIDTH: usize = 48;

/// Render a graph summary: header with counts, then nodes and edges in
/// insertion order.
///
/// ```text
/// OpenGraph  2 nodes, 1 edge  source_kind: MySystem
/// ─────────────────────────────────────────────────
///
/// NODES (2)
///   alice  [User, Person]  2 properties
///   web-01  [Computer]
///
/// EDGES (1)
///   name="Alice" (User)  -[AdminTo]->  web-01
/// ```
pub fn render_graph(graph: &OpenGraphBuilder) -> String {
    let nodes = graph.node_count();
    let edges = graph.edge_count();
    let mut header = format!(
        "OpenGraph  {} node{}, {} edge{}",
        nodes,
        plural(nodes),
        edges,
        plural(edges)
    );
    if let Some(kind) = graph.source_kind() {
        header.push_str(&format!("  source_kind: {}", kind));
    }
    let rule = "─".repeat(header.chars().count());

    let mut out = format!("{}\n{}\n", header, rule);

    if nodes > 0 {
        out.push('\n');
        out.push_str(&format!("NODES ({})\n", nodes));
        for node in graph.nodes() {
            out.push_str(&format!("  {}\n", render_node(node)));
        }
    }

    if edges > 0 {
        out.push('\n');
        out.push_str(&format!("EDGES ({})\n", edges));
        for edge in graph.edges() {
            out.push_str(&format!("  {}\n", render_edge(edge)));
        }
    }

    out
}

/// One-line summary of a node: id, kinds, and property count.
pub fn render_node(node: &Node) -> String {
    let mut line = format!("{}  [{}]", truncate(node.id(), MAX_VALUE_WIDTH), node.kinds().join(", "));
    let count = node.properties().len();
    if count > 0 {
        line.push_str(&format!("  {} propert{}", count, if count == 1 { "y" } else { "ies" }));
    }
    line
}

/// One-line summary of an edge in `start  -[kind]->  end` form.
pub fn render_edge(edge: &Edge) -> String {
    format!(
        "{}  -[{}]->  {}",
        render_reference(edge.start()),
        edge.kind(),
        render_reference(edge.end())
    )
}

// --- helpers -----------------------------------------------------------------

fn render_reference(reference: &NodeReference) -> String {
    let value = truncate(reference.value(), MAX_VALUE_WIDTH);
    let mut out = match reference.match_by() {
        MatchBy::Id => value,
        MatchBy::Name => format!("name={:?}", value),
    };
    if let Some(kind) = reference.kind() {
        out.push_str(&format!(" ({})", kind));
    }
    out
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max - 1).collect();
        format!("{}…", kept)
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EdgeOptions;
    use crate::properties::RawProperties;
    use serde_json::json;

    #[test]
    fn render_empty_graph() {
        let rendered = render_graph(&OpenGraphBuilder::new());
        assert!(rendered.starts_with("OpenGraph  0 nodes, 0 edges\n"));
        assert!(!rendered.contains("NODES"));
    }

    #[test]
    fn render_graph_lists_nodes_and_edges() {
        let mut g = OpenGraphBuilder::with_source_kind("MySystem");
        let props: RawProperties = json!({ "name": "Alice", "active": true })
            .as_object()
            .cloned()
            .unwrap();
        g.create_node("alice", ["User", "Person"], Some(props)).unwrap();
        g.create_edge(
            "Alice",
            "web-01",
            "AdminTo",
            EdgeOptions::default()
                .start_match_by(MatchBy::Name)
                .start_kind("User"),
        )
        .unwrap();

        let rendered = render_graph(&g);
        assert!(rendered.contains("1 node, 1 edge  source_kind: MySystem"));
        assert!(rendered.contains("NODES (1)"));
        assert!(rendered.contains("alice  [User, Person]  2 properties"));
        assert!(rendered.contains("EDGES (1)"));
        assert!(rendered.contains("name=\"Alice\" (User)  -[AdminTo]->  web-01"));
    }

    #[test]
    fn long_ids_truncated() {
        let id = "x".repeat(100);
        let node = Node::new(id, ["User"], None).unwrap();
        let line = render_node(&node);
        assert!(line.starts_with(&format!("{}…", "x".repeat(MAX_VALUE_WIDTH - 1))));
    }
}
