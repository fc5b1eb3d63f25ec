//! Per-node metrics table.

use std::cmp::Ordering;

use orgnet_core::config::{ReportScope, SortKey};
use serde::Serialize;

use crate::graph::GraphStats;
use crate::metrics::basic::NodeRole;

/// Metrics for one organization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetrics {
    pub id: String,
    pub role: NodeRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub degree: f64,
    pub in_degree: f64,
    pub out_degree: f64,
    pub pagerank: f64,
    pub betweenness: f64,
}

impl NodeMetrics {
    /// Value of the metric a report is sorted by. `None` for [`SortKey::Id`].
    #[must_use]
    pub const fn metric(&self, key: SortKey) -> Option<f64> {
        match key {
            SortKey::Pagerank => Some(self.pagerank),
            SortKey::Betweenness => Some(self.betweenness),
            SortKey::Degree => Some(self.degree),
            SortKey::InDegree => Some(self.in_degree),
            SortKey::OutDegree => Some(self.out_degree),
            SortKey::Id => None,
        }
    }
}

/// Result of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    /// Rows after scope filtering, sorting and truncation.
    pub rows: Vec<NodeMetrics>,
    /// BLAKE3 hash of the graph the rows were computed from.
    pub graph_hash: String,
    pub stats: GraphStats,
    /// Input rows discarded for a missing source or target.
    pub dropped_rows: usize,
    pub pagerank_iterations: usize,
    pub pagerank_converged: bool,
    pub sort_by: SortKey,
    pub scope: ReportScope,
}

impl MetricsReport {
    /// Row for `id`, if it survived scope and limit.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&NodeMetrics> {
        self.rows.iter().find(|row| row.id == id)
    }

    /// PageRank of `id`, `0.0` when the id has no row.
    #[must_use]
    pub fn pagerank_of(&self, id: &str) -> f64 {
        self.get(id).map_or(0.0, |row| row.pagerank)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row ids in report order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.id.as_str())
    }
}

/// Keep the rows selected by `scope`.
pub(crate) fn apply_scope(rows: &mut Vec<NodeMetrics>, scope: ReportScope) {
    match scope {
        ReportScope::All => {}
        ReportScope::Destinations => rows.retain(|row| row.role.is_destination()),
    }
}

/// Sort rows descending by `key`, ties broken by id ascending.
///
/// [`SortKey::Id`] sorts ascending by id alone.
pub(crate) fn sort_rows(rows: &mut [NodeMetrics], key: SortKey) {
    rows.sort_by(|a, b| compare_rows(a, b, key));
}

fn compare_rows(a: &NodeMetrics, b: &NodeMetrics, key: SortKey) -> Ordering {
    let by_metric = match (a.metric(key), b.metric(key)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        _ => Ordering::Equal,
    };
    by_metric.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, role: NodeRole, pagerank: f64, degree: f64) -> NodeMetrics {
        NodeMetrics {
            id: id.to_string(),
            role,
            category: None,
            degree,
            in_degree: 0.0,
            out_degree: 0.0,
            pagerank,
            betweenness: 0.0,
        }
    }

    fn ids(rows: &[NodeMetrics]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn sort_descending_with_id_tiebreak() {
        let mut rows = vec![
            row("b", NodeRole::Both, 0.2, 1.0),
            row("c", NodeRole::Both, 0.5, 1.0),
            row("a", NodeRole::Both, 0.2, 3.0),
        ];
        sort_rows(&mut rows, SortKey::Pagerank);
        assert_eq!(ids(&rows), vec!["c", "a", "b"]);

        sort_rows(&mut rows, SortKey::Degree);
        assert_eq!(ids(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_by_id_is_ascending() {
        let mut rows = vec![
            row("m", NodeRole::Both, 0.9, 0.0),
            row("a", NodeRole::Both, 0.1, 0.0),
            row("z", NodeRole::Both, 0.5, 0.0),
        ];
        sort_rows(&mut rows, SortKey::Id);
        assert_eq!(ids(&rows), vec!["a", "m", "z"]);
    }

    #[test]
    fn destinations_scope_drops_pure_origins() {
        let mut rows = vec![
            row("donor", NodeRole::Origin, 0.1, 1.0),
            row("hub", NodeRole::Both, 0.3, 2.0),
            row("grantee", NodeRole::Destination, 0.4, 1.0),
            row("listed", NodeRole::Isolated, 0.2, 0.0),
        ];
        apply_scope(&mut rows, ReportScope::Destinations);
        assert_eq!(ids(&rows), vec!["hub", "grantee"]);
    }

    #[test]
    fn category_omitted_from_json_when_absent() {
        let json = serde_json::to_value(row("a", NodeRole::Origin, 0.5, 1.0)).unwrap();
        assert!(json.get("category").is_none());
        assert_eq!(json["role"], "origin");
    }
}
