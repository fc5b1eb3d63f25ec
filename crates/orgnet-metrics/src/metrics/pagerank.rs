//! Weighted PageRank by power iteration.
//!
//! # Overview
//!
//! PageRank identifies organizations that receive ties from other
//! well-connected organizations. A recipient funded by many important donors
//! ranks above one funded by a single peripheral donor.
//!
//! # Algorithm
//!
//! The iterative power method over the weight-normalized adjacency:
//!
//! ```text
//! PR(v) = (1 - d) / N
//!       + d * Σ PR(u) * w(u,v) / W_out(u)     for each u → v
//!       + d * Σ PR(x) / N                     for each dangling x
//! ```
//!
//! where `d` is the damping factor (default 0.85) and `W_out(u)` is the total
//! outgoing weight of `u`. A node whose outgoing weight is zero is dangling
//! and spreads its rank uniformly, which keeps the scores summing to 1.
//!
//! Iteration stops when the L1 change between rounds drops below
//! `N * tolerance`, or after `max_iter` rounds.

use std::collections::HashMap;

use orgnet_core::config::PageRankSettings;
use petgraph::{Direction, visit::EdgeRef};
use tracing::{instrument, trace};

use crate::graph::build::RelationshipGraph;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for PageRank computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRankConfig {
    /// Damping factor (probability of following a link vs teleporting).
    /// Default: 0.85.
    pub damping: f64,
    /// Per-node convergence threshold; the run stops when the L1 change is
    /// below `N * tolerance`. Default: 1e-6.
    pub tolerance: f64,
    /// Maximum number of iterations.
    /// Default: 100.
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iter: 100,
        }
    }
}

impl From<&PageRankSettings> for PageRankConfig {
    fn from(settings: &PageRankSettings) -> Self {
        Self {
            damping: settings.damping,
            tolerance: settings.tolerance,
            max_iter: settings.max_iter,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of a PageRank computation.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRankResult {
    /// PageRank scores: node id → score.
    pub scores: HashMap<String, f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the algorithm converged within `max_iter`.
    pub converged: bool,
    /// L1 change of the last iteration.
    pub residual: f64,
}

impl PageRankResult {
    /// Score for `id`, or `0.0` for ids that are not graph nodes.
    #[must_use]
    pub fn score(&self, id: &str) -> f64 {
        self.scores.get(id).copied().unwrap_or(0.0)
    }

    /// Sum of all scores; `1.0` after convergence on a non-empty graph.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.scores.values().fold(0.0, |acc, score| acc + score)
    }
}

// ---------------------------------------------------------------------------
// PageRank
// ---------------------------------------------------------------------------

/// Compute weighted PageRank from scratch.
///
/// An empty graph yields an empty, converged result. A graph without edges
/// yields the uniform distribution after one iteration.
#[must_use]
#[instrument(skip(rg, config), fields(nodes = rg.node_count(), edges = rg.edge_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn pagerank(rg: &RelationshipGraph, config: &PageRankConfig) -> PageRankResult {
    let g = &rg.graph;
    let n = g.node_count();

    if n == 0 {
        return PageRankResult {
            scores: HashMap::new(),
            iterations: 0,
            converged: true,
            residual: 0.0,
        };
    }

    let n_f64 = n as f64;
    let teleport = (1.0 - config.damping) / n_f64;

    // Row-normalized transition weights: (target index, probability).
    let mut transitions: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
    let mut dangling: Vec<usize> = Vec::new();

    for node in g.node_indices() {
        let idx = node.index();
        let out_weight = rg.weighted_degree(node, Direction::Outgoing);
        if out_weight > 0.0 {
            transitions[idx] = g
                .edges_directed(node, Direction::Outgoing)
                .map(|edge| (edge.target().index(), *edge.weight() / out_weight))
                .collect();
        } else {
            dangling.push(idx);
        }
    }

    // Initialize ranks uniformly.
    let mut ranks = vec![1.0 / n_f64; n];
    let mut new_ranks = vec![0.0_f64; n];

    let mut iterations = 0;
    let mut converged = false;
    let mut residual = f64::INFINITY;

    for _ in 0..config.max_iter {
        iterations += 1;

        let dangling_sum: f64 = dangling.iter().map(|&i| ranks[i]).sum();
        let base = teleport + config.damping * dangling_sum / n_f64;

        for r in &mut new_ranks {
            *r = base;
        }

        for (idx, edges) in transitions.iter().enumerate() {
            let share = config.damping * ranks[idx];
            for &(target, prob) in edges {
                new_ranks[target] += share * prob;
            }
        }

        // Check convergence: L1 norm of delta.
        residual = ranks
            .iter()
            .zip(new_ranks.iter())
            .map(|(old, new)| (old - new).abs())
            .sum();

        std::mem::swap(&mut ranks, &mut new_ranks);
        trace!(iteration = iterations, residual, "pagerank iteration");

        if residual < n_f64 * config.tolerance {
            converged = true;
            break;
        }
    }

    let scores = g
        .node_indices()
        .map(|node| (g[node].clone(), ranks[node.index()]))
        .collect();

    PageRankResult {
        scores,
        iterations,
        converged,
        residual,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
