//! Centrality metrics for the relationship graph.
//!
//! # Overview
//!
//! Each metric answers a different question about an organization's place in
//! the network:
//!
//! - **Degree** (`basic`): how many ties does it have, and how much weight
//!   flows in and out?
//! - **PageRank** (`pagerank`): is it tied to other important organizations?
//! - **Betweenness** (`betweenness`): does it broker between organizations
//!   that are otherwise unconnected?
//!
//! # Usage
//!
//! All metrics take a [`RelationshipGraph`](crate::graph::RelationshipGraph)
//! reference and return scores keyed by node id.
//!
//! ```rust
//! use orgnet_core::config::{BetweennessSettings, EdgePolicy};
//! use orgnet_core::model::Relationship;
//! use orgnet_metrics::graph::RelationshipGraph;
//! use orgnet_metrics::metrics::{basic, betweenness, pagerank};
//!
//! let rels = vec![Relationship::new("A", "B"), Relationship::new("B", "C")];
//! let rg = RelationshipGraph::build(&rels, EdgePolicy::Sum);
//!
//! let degree = basic::degree_centrality(&rg, false);
//! let pr = pagerank::pagerank(&rg, &pagerank::PageRankConfig::default());
//! let bc = betweenness::betweenness_centrality(&rg, &BetweennessSettings::default());
//!
//! assert_eq!(degree.degree["B"], 2.0);
//! assert!(pr.score("C") > pr.score("A"));
//! assert!(bc["B"] > 0.0);
//! ```

pub mod basic;
pub mod betweenness;
pub mod pagerank;
