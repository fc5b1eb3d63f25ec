//! Basic graph statistics for the relationship graph.
//!
//! # Statistics Provided
//!
//! - **node_count** / **edge_count**: sizes after repeated pairs are merged.
//! - **total_weight**: sum of merged edge weights.
//! - **density**: `edge_count / (node_count * (node_count - 1))`; zero for
//!   graphs with fewer than two nodes. Self-loops count as edges, so a graph
//!   with loops can exceed 1.0 in degenerate cases.
//! - **weakly_connected_component_count**: disjoint subnetworks when edge
//!   direction is ignored.
//! - **isolated_node_count**: nodes with no edges (category-only nodes).
//! - **self_loop_count**: organizations listed as their own collaborator.
//! - **max_in_degree** / **max_out_degree**: largest edge counts per node.

use petgraph::{Direction, algo::connected_components, visit::EdgeRef};
use serde::Serialize;

use crate::graph::build::RelationshipGraph;

// ---------------------------------------------------------------------------
// GraphStats
// ---------------------------------------------------------------------------

/// Summary statistics for a relationship graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub total_weight: f64,
    pub density: f64,
    pub weakly_connected_component_count: usize,
    pub isolated_node_count: usize,
    pub self_loop_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
}

impl GraphStats {
    /// Compute statistics from a [`RelationshipGraph`].
    #[must_use]
    pub fn from_graph(rg: &RelationshipGraph) -> Self {
        let g = &rg.graph;
        let node_count = g.node_count();
        let edge_count = g.edge_count();

        let total_weight = g
            .edge_references()
            .fold(0.0, |acc, edge| acc + *edge.weight());
        let self_loop_count = g
            .edge_references()
            .filter(|edge| edge.source() == edge.target())
            .count();

        let wcc = if node_count == 0 {
            0
        } else {
            connected_components(g)
        };

        let isolated_node_count = g
            .node_indices()
            .filter(|&idx| {
                !rg.has_edges(idx, Direction::Incoming) && !rg.has_edges(idx, Direction::Outgoing)
            })
            .count();

        let max_in_degree = g
            .node_indices()
            .map(|idx| g.edges_directed(idx, Direction::Incoming).count())
            .max()
            .unwrap_or(0);

        let max_out_degree = g
            .node_indices()
            .map(|idx| g.edges_directed(idx, Direction::Outgoing).count())
            .max()
            .unwrap_or(0);

        Self {
            node_count,
            edge_count,
            total_weight,
            density: compute_density(node_count, edge_count),
            weakly_connected_component_count: wcc,
            isolated_node_count,
            self_loop_count,
            max_in_degree,
            max_out_degree,
        }
    }

    /// Return `true` if the graph has no edges.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.edge_count == 0
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(node_count: usize, edge_count: usize) -> f64 {
    if node_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (node_count * (node_count - 1)) as f64;
    edge_count as f64 / max_edges
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use orgnet_core::config::EdgePolicy;
    use orgnet_core::model::Relationship;

    fn make_graph(nodes: &[&str], edges: &[(&str, &str)]) -> RelationshipGraph {
        let rels: Vec<Relationship> = edges.iter().map(|(a, b)| Relationship::new(*a, *b)).collect();
        RelationshipGraph::build_with_nodes(&rels, nodes.iter().copied(), EdgePolicy::Sum)
    }

    #[test]
    fn empty_graph_stats() {
        let stats = GraphStats::from_graph(&make_graph(&[], &[]));
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert!(stats.density.abs() < f64::EPSILON);
        assert_eq!(stats.weakly_connected_component_count, 0);
        assert!(stats.is_flat());
        assert!(!stats.total_weight.is_sign_negative());
    }

    #[test]
    fn chain_stats() {
        let stats = GraphStats::from_graph(&make_graph(&[], &[("A", "B"), ("B", "C")]));
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 2);
        assert!((stats.density - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(stats.weakly_connected_component_count, 1);
        assert_eq!(stats.isolated_node_count, 0);
        assert_eq!(stats.max_in_degree, 1);
        assert_eq!(stats.max_out_degree, 1);
        assert!((stats.total_weight - 2.0).abs() < 1e-12);
    }

    #[test]
    fn isolated_and_components_counted() {
        let stats =
            GraphStats::from_graph(&make_graph(&["Z"], &[("A", "B"), ("C", "D"), ("C", "E")]));
        assert_eq!(stats.weakly_connected_component_count, 3);
        assert_eq!(stats.isolated_node_count, 1);
        assert_eq!(stats.max_out_degree, 2);
    }

    #[test]
    fn self_loops_counted() {
        let stats = GraphStats::from_graph(&make_graph(&[], &[("A", "A"), ("A", "B")]));
        assert_eq!(stats.self_loop_count, 1);
        assert_eq!(stats.isolated_node_count, 0);
    }
}
