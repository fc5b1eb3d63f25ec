//! Node/edge view of the graph for renderers.
//!
//! The view always holds every graph node, whatever the report scope, so a
//! renderer can draw the whole network with metrics attached to each node.

use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::graph::build::RelationshipGraph;
use crate::report::NodeMetrics;

/// A merged, weighted edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewEdge {
    pub source: String,
    pub target: String,
    pub weight: f64,
}

/// Nodes in graph insertion order plus every merged edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphView {
    pub nodes: Vec<NodeMetrics>,
    pub edges: Vec<ViewEdge>,
}

impl GraphView {
    /// Pair precomputed node rows (graph order) with the graph's edges.
    #[must_use]
    pub fn new(rg: &RelationshipGraph, nodes: Vec<NodeMetrics>) -> Self {
        let g = &rg.graph;
        let edges = g
            .edge_references()
            .map(|edge| ViewEdge {
                source: g[edge.source()].clone(),
                target: g[edge.target()].clone(),
                weight: *edge.weight(),
            })
            .collect();
        Self { nodes, edges }
    }

    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodeMetrics> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
