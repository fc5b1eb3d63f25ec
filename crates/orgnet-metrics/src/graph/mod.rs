//! Relationship graph module.
//!
//! # Overview
//!
//! This module builds a petgraph-based directed, weighted graph from the
//! normalized relationship rows. The graph feeds every centrality metric in
//! [`crate::metrics`].
//!
//! ## Pipeline
//!
//! ```text
//! RelationshipRecord rows (data source)
//!        ↓  orgnet_core::normalize_records()
//! Vec<Relationship>
//!        ↓  build::RelationshipGraph::build_with_nodes()
//! RelationshipGraph (DiGraph<String, f64>, repeated pairs merged)
//!        ↓  stats::GraphStats::from_graph()
//! GraphStats (density, components, isolated nodes, …)
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use orgnet_core::config::EdgePolicy;
//! use orgnet_core::model::Relationship;
//! use orgnet_metrics::graph::{RelationshipGraph, GraphStats};
//!
//! let rels = vec![Relationship::new("A", "B"), Relationship::new("A", "B")];
//! let graph = RelationshipGraph::build(&rels, EdgePolicy::Sum);
//! assert_eq!(graph.edge_weight("A", "B"), Some(2.0));
//!
//! let stats = GraphStats::from_graph(&graph);
//! assert_eq!(stats.edge_count, 1);
//! ```

pub mod build;
pub mod stats;

pub use build::RelationshipGraph;
pub use stats::GraphStats;
