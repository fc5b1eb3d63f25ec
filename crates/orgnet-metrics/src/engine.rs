//! The metrics engine: records in, report and view out.
//!
//! ```text
//! records ──normalize──▶ relationships ──build──▶ RelationshipGraph
//!                                                   │
//!                    degree / PageRank / betweenness ◀┘
//!                                                   │
//!                  MetricsReport (scoped, sorted) + GraphView (all nodes)
//! ```
//!
//! Nothing is computed until [`MetricsEngine::run`] (or one of its variants)
//! is called. Each call builds a fresh graph; runs share no state.

use std::collections::HashMap;

use orgnet_core::config::{CategoryNodePolicy, EngineConfig};
use orgnet_core::error::{EngineError, Result};
use orgnet_core::model::{CategoryTable, Relationship, RelationshipRecord, normalize_records};
use tracing::{debug, info, instrument, warn};

use crate::graph::{GraphStats, RelationshipGraph};
use crate::metrics::basic::{NodeRole, degree_centrality, node_roles};
use crate::metrics::betweenness::betweenness_centrality;
use crate::metrics::pagerank::{PageRankConfig, pagerank};
use crate::report::{MetricsReport, NodeMetrics, apply_scope, sort_rows};
use crate::sink::{ReportSink, VisualizationSink};
use crate::view::GraphView;

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub report: MetricsReport,
    pub view: GraphView,
}

/// Computes per-node metrics for a relationship set.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: EngineConfig,
}

impl MetricsEngine {
    /// Create an engine with a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] if any setting is out of range.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the metrics report for raw records.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidWeight`] for a malformed weight, or
    /// [`EngineError::PageRankDiverged`] when convergence is required and
    /// not reached.
    pub fn run(
        &self,
        records: &[RelationshipRecord],
        categories: Option<&CategoryTable>,
    ) -> Result<MetricsReport> {
        self.analyze(records, categories).map(|output| output.report)
    }

    /// Compute the report and the node/edge view for raw records.
    ///
    /// # Errors
    ///
    /// See [`MetricsEngine::run`].
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn analyze(
        &self,
        records: &[RelationshipRecord],
        categories: Option<&CategoryTable>,
    ) -> Result<EngineOutput> {
        let normalized = normalize_records(records)?;
        self.analyze_relationships(
            &normalized.relationships,
            normalized.dropped_rows,
            categories,
        )
    }

    /// Compute once and hand the results to both sinks.
    ///
    /// # Errors
    ///
    /// Propagates computation errors, and wraps sink failures in
    /// [`EngineError::Sink`].
    pub fn run_into(
        &self,
        records: &[RelationshipRecord],
        categories: Option<&CategoryTable>,
        report_sink: &mut dyn ReportSink,
        view_sink: &mut dyn VisualizationSink,
    ) -> Result<MetricsReport> {
        let EngineOutput { report, view } = self.analyze(records, categories)?;
        report_sink.write_report(&report).map_err(EngineError::Sink)?;
        view_sink.write_view(&view).map_err(EngineError::Sink)?;
        Ok(report)
    }

    /// Compute from already-normalized relationships.
    ///
    /// `dropped_rows` is carried into the report unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PageRankDiverged`] when convergence is required
    /// and not reached.
    #[instrument(skip_all, fields(relationships = relationships.len()))]
    pub fn analyze_relationships(
        &self,
        relationships: &[Relationship],
        dropped_rows: usize,
        categories: Option<&CategoryTable>,
    ) -> Result<EngineOutput> {
        let cfg = &self.config;

        let extra: Vec<&str> = match (cfg.graph.category_nodes, categories) {
            (CategoryNodePolicy::Include, Some(table)) => table.ids().collect(),
            _ => Vec::new(),
        };
        let rg = RelationshipGraph::build_with_nodes(
            relationships,
            extra.iter().copied(),
            cfg.graph.edge_policy,
        );
        let stats = GraphStats::from_graph(&rg);
        if stats.is_flat() {
            debug!(nodes = stats.node_count, "graph has no edges");
        }

        let degree = degree_centrality(&rg, cfg.degree.weighted);
        let roles = node_roles(&rg);
        let pr = pagerank(&rg, &PageRankConfig::from(&cfg.pagerank));
        if !pr.converged {
            if cfg.pagerank.require_convergence {
                return Err(EngineError::PageRankDiverged {
                    iterations: pr.iterations,
                    residual: pr.residual,
                });
            }
            warn!(
                iterations = pr.iterations,
                residual = pr.residual,
                "PageRank hit the iteration cap before converging"
            );
        }
        let bc = betweenness_centrality(&rg, &cfg.betweenness);

        let nodes: Vec<NodeMetrics> = rg
            .node_ids()
            .map(|id| NodeMetrics {
                id: id.to_string(),
                role: roles.get(id).copied().unwrap_or(NodeRole::Isolated),
                category: categories
                    .and_then(|table| table.category(id))
                    .map(str::to_string),
                degree: lookup(&degree.degree, id),
                in_degree: lookup(&degree.in_degree, id),
                out_degree: lookup(&degree.out_degree, id),
                pagerank: pr.score(id),
                betweenness: lookup(&bc, id),
            })
            .collect();

        let mut rows = nodes.clone();
        apply_scope(&mut rows, cfg.report.scope);
        sort_rows(&mut rows, cfg.report.sort_by);
        if let Some(limit) = cfg.report.limit {
            rows.truncate(limit);
        }
        debug!(rows = rows.len(), scope = %cfg.report.scope, "report rows selected");

        info!(
            nodes = stats.node_count,
            edges = stats.edge_count,
            dropped_rows,
            pagerank_iterations = pr.iterations,
            hash = %rg.content_hash,
            "metrics computed"
        );

        let view = GraphView::new(&rg, nodes);
        let report = MetricsReport {
            rows,
            graph_hash: rg.content_hash,
            stats,
            dropped_rows,
            pagerank_iterations: pr.iterations,
            pagerank_converged: pr.converged,
            sort_by: cfg.report.sort_by,
            scope: cfg.report.scope,
        };

        Ok(EngineOutput { report, view })
    }
}

fn lookup(scores: &HashMap<String, f64>, id: &str) -> f64 {
    scores.get(id).copied().unwrap_or(0.0)
}
