//! Betweenness centrality via Brandes' algorithm.
//!
//! # Overview
//!
//! Betweenness centrality measures how often a node lies on shortest paths
//! between other pairs of nodes. High-betweenness organizations are brokers:
//! they connect donors and recipients that share no direct tie.
//!
//! # Algorithm
//!
//! Brandes' algorithm (2001):
//!
//! 1. For each source node `s`, compute shortest-path counts (`sigma`) and
//!    predecessor lists. Hop counts use BFS; weighted mode uses Dijkstra
//!    with the edge weight as path length.
//! 2. Accumulate dependency scores in reverse discovery order (farthest
//!    nodes first).
//! 3. Sum the dependency scores across all source nodes.
//!
//! Endpoints never count toward their own score. Self-loops are ignored
//! since they never lie on a shortest path.
//!
//! Complexity: O(V * E) unweighted, O(V * E log V) weighted.
//!
//! # Normalization
//!
//! With `normalized = true` the raw sums are divided by `(n-1)*(n-2)`, the
//! number of ordered pairs excluding the node itself. Graphs with two or
//! fewer nodes are left unscaled (every score is zero there anyway).

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, VecDeque};

use orgnet_core::config::BetweennessSettings;
use petgraph::{Direction, visit::EdgeRef};
use tracing::instrument;

use crate::graph::build::RelationshipGraph;

/// Compute betweenness centrality for all nodes in the graph.
///
/// # Returns
///
/// A `HashMap<String, f64>` mapping each node id to its betweenness score.
/// Disconnected nodes and nodes with no shortest paths through them receive
/// a score of 0.0.
#[must_use]
#[instrument(skip(rg), fields(nodes = rg.node_count(), edges = rg.edge_count()))]
#[allow(clippy::cast_precision_loss)]
pub fn betweenness_centrality(
    rg: &RelationshipGraph,
    settings: &BetweennessSettings,
) -> HashMap<String, f64> {
    let n = rg.node_count();
    if n == 0 {
        return HashMap::new();
    }

    let adjacency = adjacency(rg);

    // Node-indexed betweenness accumulator.
    let mut cb: Vec<f64> = vec![0.0; n];

    for s in 0..n {
        let paths = if settings.weighted {
            shortest_paths_weighted(&adjacency, s)
        } else {
            shortest_paths_hops(&adjacency, s)
        };
        accumulate(&paths, s, &mut cb);
    }

    if settings.normalized && n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for score in &mut cb {
            *score *= scale;
        }
    }

    rg.graph
        .node_indices()
        .map(|idx| (rg.graph[idx].clone(), cb[idx.index()]))
        .collect()
}

/// Outgoing `(target, weight)` lists by node index, self-loops removed.
fn adjacency(rg: &RelationshipGraph) -> Vec<Vec<(usize, f64)>> {
    let g = &rg.graph;
    let mut adj = vec![Vec::new(); g.node_count()];
    for node in g.node_indices() {
        adj[node.index()] = g
            .edges_directed(node, Direction::Outgoing)
            .filter(|edge| edge.target() != node)
            .map(|edge| (edge.target().index(), *edge.weight()))
            .collect();
    }
    adj
}

/// Single-source shortest-path structure consumed by the accumulation phase.
struct ShortestPaths {
    /// Nodes in non-decreasing distance order.
    order: Vec<usize>,
    /// Immediate predecessors of each node on shortest paths from the source.
    predecessors: Vec<Vec<usize>>,
    /// Number of shortest paths from the source to each node.
    sigma: Vec<f64>,
}

fn shortest_paths_hops(adj: &[Vec<(usize, f64)>], s: usize) -> ShortestPaths {
    let n = adj.len();
    let mut order = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    sigma[s] = 1.0;

    // dist[t]: distance from s to t (-1 = unvisited).
    let mut dist: Vec<i64> = vec![-1; n];
    dist[s] = 0;

    let mut queue = VecDeque::new();
    queue.push_back(s);

    while let Some(v) = queue.pop_front() {
        order.push(v);

        for &(w, _) in &adj[v] {
            // First visit to w?
            if dist[w] < 0 {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }

            // Shortest path to w via v?
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    ShortestPaths {
        order,
        predecessors,
        sigma,
    }
}

/// Priority-queue entry: smallest distance first, then insertion order.
struct Candidate {
    dist: f64,
    seq: usize,
    pred: usize,
    node: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap.
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[allow(clippy::float_cmp)]
fn shortest_paths_weighted(adj: &[Vec<(usize, f64)>], s: usize) -> ShortestPaths {
    let n = adj.len();
    let mut order = Vec::with_capacity(n);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0_f64; n];
    sigma[s] = 1.0;

    let mut seen: Vec<Option<f64>> = vec![None; n];
    let mut finalized = vec![false; n];
    seen[s] = Some(0.0);

    let mut seq = 0;
    let mut heap = BinaryHeap::new();
    heap.push(Candidate {
        dist: 0.0,
        seq,
        pred: s,
        node: s,
    });

    while let Some(Candidate {
        dist, pred, node: v, ..
    }) = heap.pop()
    {
        if finalized[v] {
            continue;
        }
        if pred != v {
            sigma[v] += sigma[pred];
        }
        finalized[v] = true;
        order.push(v);

        for &(w, weight) in &adj[v] {
            if finalized[w] {
                continue;
            }
            let candidate = dist + weight;
            match seen[w] {
                Some(best) if candidate == best => {
                    sigma[w] += sigma[v];
                    predecessors[w].push(v);
                }
                Some(best) if candidate > best => {}
                _ => {
                    seen[w] = Some(candidate);
                    seq += 1;
                    heap.push(Candidate {
                        dist: candidate,
                        seq,
                        pred: v,
                        node: w,
                    });
                    sigma[w] = 0.0;
                    predecessors[w].clear();
                    predecessors[w].push(v);
                }
            }
        }
    }

    ShortestPaths {
        order,
        predecessors,
        sigma,
    }
}

/// Brandes dependency accumulation in reverse discovery order.
fn accumulate(paths: &ShortestPaths, s: usize, cb: &mut [f64]) {
    let mut delta = vec![0.0_f64; cb.len()];

    for &w in paths.order.iter().rev() {
        let sigma_w = paths.sigma[w];
        if sigma_w > 0.0 {
            let coeff = (1.0 + delta[w]) / sigma_w;
            for &v in &paths.predecessors[w] {
                delta[v] += paths.sigma[v] * coeff;
            }
        }
        if w != s {
            cb[w] += delta[w];
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
