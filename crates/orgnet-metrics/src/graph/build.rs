//! Graph construction from normalized relationship rows.
//!
//! # Overview
//!
//! Each [`Relationship`] becomes a directed edge `source → target` in a
//! [`petgraph`] graph whose edge weight is an `f64`. Node ids are inserted in
//! order of first appearance (source before target within a row), so two
//! builds of the same input produce identical node indices.
//!
//! ## Repeated Pairs
//!
//! Rows that repeat an existing `(source, target)` pair never add a parallel
//! edge. How they combine is the [`EdgePolicy`]:
//!
//! | policy   | merged weight                  |
//! |----------|--------------------------------|
//! | `sum`    | sum of row weights             |
//! | `count`  | number of rows                 |
//! | `dedupe` | first row's weight             |
//!
//! ## Content Hash
//!
//! The graph carries a BLAKE3 hash of its sorted node list and sorted
//! weighted edge list. Consumers of the report can compare it against a
//! stored value to tell whether a refreshed data source changed the graph.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashMap;

use orgnet_core::config::EdgePolicy;
use orgnet_core::model::Relationship;
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::{debug, instrument};

// ---------------------------------------------------------------------------
// RelationshipGraph
// ---------------------------------------------------------------------------

/// A directed, weighted relationship graph.
///
/// Nodes are organization ids. An edge `A → B` with weight `w` means "A funds
/// or collaborates with B", with `w` combined per the [`EdgePolicy`]. The
/// graph is immutable once built.
#[derive(Debug, Clone)]
pub struct RelationshipGraph {
    /// Directed graph: nodes = ids, edges = merged relationship weights.
    pub graph: DiGraph<String, f64>,
    /// Mapping from node id to petgraph `NodeIndex`.
    pub node_map: HashMap<String, NodeIndex>,
    /// BLAKE3 content hash of the node and edge sets.
    pub content_hash: String,
    /// Policy used to merge repeated pairs.
    pub edge_policy: EdgePolicy,
    /// Number of rows folded into an already existing edge.
    pub merged_rows: usize,
}

impl RelationshipGraph {
    /// Build a graph from relationships alone.
    #[must_use]
    pub fn build(relationships: &[Relationship], edge_policy: EdgePolicy) -> Self {
        Self::build_with_nodes(relationships, std::iter::empty::<&str>(), edge_policy)
    }

    /// Build a graph from relationships plus extra ids that become isolated
    /// nodes when no relationship mentions them.
    ///
    /// Extra ids are inserted after every relationship endpoint, so they
    /// never shift the indices of relationship nodes.
    #[must_use]
    #[instrument(skip_all, fields(rows = relationships.len(), policy = %edge_policy))]
    pub fn build_with_nodes<'a>(
        relationships: &[Relationship],
        extra_nodes: impl IntoIterator<Item = &'a str>,
        edge_policy: EdgePolicy,
    ) -> Self {
        let mut graph = DiGraph::<String, f64>::new();
        let mut node_map: HashMap<String, NodeIndex> = HashMap::new();
        let mut edge_map: HashMap<(NodeIndex, NodeIndex), EdgeIndex> = HashMap::new();
        let mut merged_rows = 0usize;

        for rel in relationships {
            let from = intern(&mut graph, &mut node_map, &rel.source);
            let to = intern(&mut graph, &mut node_map, &rel.target);

            if let Some(&edge) = edge_map.get(&(from, to)) {
                merged_rows += 1;
                if let Some(weight) = graph.edge_weight_mut(edge) {
                    match edge_policy {
                        EdgePolicy::Sum => *weight += rel.weight,
                        EdgePolicy::Count => *weight += 1.0,
                        EdgePolicy::Dedupe => {}
                    }
                }
                continue;
            }

            let weight = match edge_policy {
                EdgePolicy::Count => 1.0,
                EdgePolicy::Sum | EdgePolicy::Dedupe => rel.weight,
            };
            let edge = graph.add_edge(from, to, weight);
            edge_map.insert((from, to), edge);
        }

        let mut isolated = 0usize;
        for id in extra_nodes {
            if !node_map.contains_key(id) {
                intern(&mut graph, &mut node_map, id);
                isolated += 1;
            }
        }

        let content_hash = compute_content_hash(&graph);

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            merged_rows,
            isolated,
            "relationship graph built"
        );

        Self {
            graph,
            node_map,
            content_hash,
            edge_policy,
            merged_rows,
        }
    }

    /// Return the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of (merged) edges in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Look up the `NodeIndex` for a node id.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    /// Return the id label for a node.
    #[must_use]
    pub fn node_id(&self, idx: NodeIndex) -> Option<&str> {
        self.graph.node_weight(idx).map(String::as_str)
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }

    /// Merged weight of the edge `source → target`, if present.
    #[must_use]
    pub fn edge_weight(&self, source: &str, target: &str) -> Option<f64> {
        let from = self.node_index(source)?;
        let to = self.node_index(target)?;
        let edge = self.graph.find_edge(from, to)?;
        self.graph.edge_weight(edge).copied()
    }

    /// Sum of weights over edges leaving (`Outgoing`) or entering
    /// (`Incoming`) `idx`. `0.0` (never `-0.0`) when there are none.
    #[must_use]
    pub fn weighted_degree(&self, idx: NodeIndex, direction: Direction) -> f64 {
        self.graph
            .edges_directed(idx, direction)
            .fold(0.0, |acc, edge| acc + *edge.weight())
    }

    /// Whether the node has at least one edge in `direction`.
    #[must_use]
    pub fn has_edges(&self, idx: NodeIndex, direction: Direction) -> bool {
        self.graph.edges_directed(idx, direction).next().is_some()
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn intern(
    graph: &mut DiGraph<String, f64>,
    node_map: &mut HashMap<String, NodeIndex>,
    id: &str,
) -> NodeIndex {
    if let Some(&idx) = node_map.get(id) {
        return idx;
    }
    let idx = graph.add_node(id.to_string());
    node_map.insert(id.to_string(), idx);
    idx
}

/// Compute a BLAKE3 hash over sorted nodes and sorted weighted edges.
fn compute_content_hash(graph: &DiGraph<String, f64>) -> String {
    let mut nodes: Vec<&str> = graph.node_weights().map(String::as_str).collect();
    nodes.sort_unstable();

    let mut edges: Vec<(&str, &str, u64)> = graph
        .edge_references()
        .map(|edge| {
            (
                graph[edge.source()].as_str(),
                graph[edge.target()].as_str(),
                edge.weight().to_bits(),
            )
        })
        .collect();
    edges.sort_unstable();

    let mut hasher = blake3::Hasher::new();
    for id in nodes {
        hasher.update(b"n\x00");
        hasher.update(id.as_bytes());
        hasher.update(b"\x00");
    }
    for (source, target, weight_bits) in edges {
        hasher.update(b"e\x00");
        hasher.update(source.as_bytes());
        hasher.update(b"\x00");
        hasher.update(target.as_bytes());
        hasher.update(b"\x00");
        hasher.update(&weight_bits.to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn rels(edges: &[(&str, &str, f64)]) -> Vec<Relationship> {
        edges
            .iter()
            .map(|(s, t, w)| Relationship::weighted(*s, *t, *w))
            .collect()
    }

    #[test]
    fn empty_input_produces_empty_graph() {
        let graph = RelationshipGraph::build(&[], EdgePolicy::Sum);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.is_empty());
        assert!(graph.content_hash.starts_with("blake3:"));
    }

    #[test]
    fn single_edge_direction() {
        let graph = RelationshipGraph::build(&rels(&[("A", "B", 1.0)]), EdgePolicy::Sum);
        let a = graph.node_index("A").expect("A node");
        let b = graph.node_index("B").expect("B node");
        assert!(graph.graph.contains_edge(a, b), "expected A → B");
        assert!(!graph.graph.contains_edge(b, a), "no reverse edge");
    }

    #[test]
    fn nodes_appear_once_in_first_seen_order() {
        let graph = RelationshipGraph::build(
            &rels(&[("A", "B", 1.0), ("C", "A", 1.0), ("B", "C", 1.0), ("A", "C", 1.0)]),
            EdgePolicy::Sum,
        );
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn sum_policy_adds_row_weights() {
        let graph = RelationshipGraph::build(
            &rels(&[("A", "B", 1.0), ("A", "B", 1.0), ("A", "B", 2.5)]),
            EdgePolicy::Sum,
        );
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight("A", "B"), Some(4.5));
        assert_eq!(graph.merged_rows, 2);
    }

    #[test]
    fn count_policy_counts_rows() {
        let graph = RelationshipGraph::build(
            &rels(&[("A", "B", 5.0), ("A", "B", 7.0)]),
            EdgePolicy::Count,
        );
        assert_eq!(graph.edge_weight("A", "B"), Some(2.0));
    }

    #[test]
    fn dedupe_policy_keeps_first_weight() {
        let graph = RelationshipGraph::build(
            &rels(&[("A", "B", 1.0), ("A", "B", 1.0)]),
            EdgePolicy::Dedupe,
        );
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edge_weight("A", "B"), Some(1.0));

        let graph = RelationshipGraph::build(
            &rels(&[("A", "B", 3.0), ("A", "B", 9.0)]),
            EdgePolicy::Dedupe,
        );
        assert_eq!(graph.edge_weight("A", "B"), Some(3.0));
    }

    #[test]
    fn opposite_directions_are_distinct_edges() {
        let graph = RelationshipGraph::build(
            &rels(&[("A", "B", 1.0), ("B", "A", 1.0)]),
            EdgePolicy::Sum,
        );
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn self_loops_are_kept() {
        let graph = RelationshipGraph::build(&rels(&[("A", "A", 1.0)]), EdgePolicy::Sum);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_weight("A", "A"), Some(1.0));
    }

    #[test]
    fn extra_nodes_are_isolated_and_appended() {
        let graph = RelationshipGraph::build_with_nodes(
            &rels(&[("A", "B", 1.0)]),
            ["B", "Z"],
            EdgePolicy::Sum,
        );
        assert_eq!(graph.node_ids().collect::<Vec<_>>(), vec!["A", "B", "Z"]);
        let z = graph.node_index("Z").expect("Z node");
        assert!(!graph.has_edges(z, Direction::Incoming));
        assert!(!graph.has_edges(z, Direction::Outgoing));
    }

    #[test]
    fn weighted_degree_without_edges_is_positive_zero() {
        let graph = RelationshipGraph::build(&rels(&[("A", "B", 1.0)]), EdgePolicy::Sum);
        let a = graph.node_index("A").expect("A node");
        let b = graph.node_index("B").expect("B node");
        let a_in = graph.weighted_degree(a, Direction::Incoming);
        let b_out = graph.weighted_degree(b, Direction::Outgoing);
        assert!(a_in.abs() < f64::EPSILON && !a_in.is_sign_negative());
        assert!(b_out.abs() < f64::EPSILON && !b_out.is_sign_negative());
        assert_eq!(format!("{b_out}"), "0");
    }

    #[test]
    fn weighted_degree_sums_edge_weights() {
        let graph = RelationshipGraph::build(
            &rels(&[("A", "C", 2.0), ("B", "C", 3.0), ("C", "D", 0.5)]),
            EdgePolicy::Sum,
        );
        let c = graph.node_index("C").expect("C node");
        assert!((graph.weighted_degree(c, Direction::Incoming) - 5.0).abs() < 1e-12);
        assert!((graph.weighted_degree(c, Direction::Outgoing) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn content_hash_is_order_independent_but_weight_sensitive() {
        let a = RelationshipGraph::build(
            &rels(&[("A", "B", 1.0), ("B", "C", 1.0)]),
            EdgePolicy::Sum,
        );
        let b = RelationshipGraph::build(
            &rels(&[("B", "C", 1.0), ("A", "B", 1.0)]),
            EdgePolicy::Sum,
        );
        let c = RelationshipGraph::build(
            &rels(&[("A", "B", 2.0), ("B", "C", 1.0)]),
            EdgePolicy::Sum,
        );
        assert_eq!(a.content_hash, b.content_hash);
        assert_ne!(a.content_hash, c.content_hash, "hash must change with weights");
    }

    #[test]
    fn content_hash_changes_with_isolated_nodes() {
        let base = RelationshipGraph::build(&rels(&[("A", "B", 1.0)]), EdgePolicy::Sum);
        let extra =
            RelationshipGraph::build_with_nodes(&rels(&[("A", "B", 1.0)]), ["Z"], EdgePolicy::Sum);
        assert_ne!(base.content_hash, extra.content_hash);
    }
}
