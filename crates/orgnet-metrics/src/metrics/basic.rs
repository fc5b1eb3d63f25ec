//! Static graph metrics: degree centrality and node roles.
//!
//! # Overview
//!
//! These are single-pass metrics over the relationship graph, computed on
//! every engine run.
//!
//! - `in_degree` / `out_degree` are always **weighted**: the sum of incoming
//!   or outgoing merged edge weights.
//! - `degree` counts incident edges (in + out; a self-loop counts twice) or,
//!   in weighted mode, sums incident edge weights.

use std::collections::HashMap;
use std::fmt;

use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::graph::build::RelationshipGraph;

// ---------------------------------------------------------------------------
// Degree Centrality
// ---------------------------------------------------------------------------

/// Per-node degree scores.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeCentrality {
    /// Incident edge count, or incident weight in weighted mode.
    pub degree: HashMap<String, f64>,
    /// Sum of incoming edge weights.
    pub in_degree: HashMap<String, f64>,
    /// Sum of outgoing edge weights.
    pub out_degree: HashMap<String, f64>,
}

/// Compute degree centrality for all nodes.
///
/// # Arguments
///
/// * `weighted_degree` — when `true`, `degree` is `in_degree + out_degree`;
///   otherwise it is the number of incident edges.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn degree_centrality(rg: &RelationshipGraph, weighted_degree: bool) -> DegreeCentrality {
    let n = rg.node_count();
    let mut degree = HashMap::with_capacity(n);
    let mut in_degree = HashMap::with_capacity(n);
    let mut out_degree = HashMap::with_capacity(n);

    for idx in rg.graph.node_indices() {
        let Some(id) = rg.node_id(idx) else {
            continue;
        };

        let in_w = rg.weighted_degree(idx, Direction::Incoming);
        let out_w = rg.weighted_degree(idx, Direction::Outgoing);
        let total = if weighted_degree {
            in_w + out_w
        } else {
            let in_n = rg.graph.edges_directed(idx, Direction::Incoming).count();
            let out_n = rg.graph.edges_directed(idx, Direction::Outgoing).count();
            (in_n + out_n) as f64
        };

        degree.insert(id.to_string(), total);
        in_degree.insert(id.to_string(), in_w);
        out_degree.insert(id.to_string(), out_w);
    }

    DegreeCentrality {
        degree,
        in_degree,
        out_degree,
    }
}

// ---------------------------------------------------------------------------
// Node roles
// ---------------------------------------------------------------------------

/// Position of a node in the relationship set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Only ever a relationship source (a donor / originating organization).
    Origin,
    /// Only ever a relationship target (a recipient / collaborator).
    Destination,
    /// Both a source and a target.
    Both,
    /// Present without relationships (category table only).
    Isolated,
}

impl NodeRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Origin => "origin",
            Self::Destination => "destination",
            Self::Both => "both",
            Self::Isolated => "isolated",
        }
    }

    /// Whether the node is the target of at least one relationship.
    #[must_use]
    pub const fn is_destination(self) -> bool {
        matches!(self, Self::Destination | Self::Both)
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify every node by whether it has outgoing and/or incoming edges.
///
/// Every relationship becomes (or merges into) an edge, so outgoing edges
/// mean "appeared as a source" and incoming edges mean "appeared as a target".
#[must_use]
pub fn node_roles(rg: &RelationshipGraph) -> HashMap<String, NodeRole> {
    rg.graph
        .node_indices()
        .filter_map(|idx| {
            let id = rg.node_id(idx)?;
            let out = rg.has_edges(idx, Direction::Outgoing);
            let inc = rg.has_edges(idx, Direction::Incoming);
            let role = match (out, inc) {
                (true, true) => NodeRole::Both,
                (true, false) => NodeRole::Origin,
                (false, true) => NodeRole::Destination,
                (false, false) => NodeRole::Isolated,
            };
            Some((id.to_string(), role))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
