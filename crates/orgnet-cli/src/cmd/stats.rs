//! `orgnet stats` — network summary.

use std::io::Write;
use std::path::Path;

use clap::Args;
use orgnet_core::config::SortKey;
use orgnet_metrics::{EngineOutput, GraphStats, NodeMetrics};
use serde::Serialize;

use crate::cmd::{InputArgs, build_engine, engine_failure, load_config};
use crate::output::{OutputMode, fmt_amount, pretty_kv, pretty_section, render};

/// Arguments for `orgnet stats`.
#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// How many leading organizations to list per centrality.
    #[arg(long, value_name = "N", default_value_t = 5)]
    pub top: usize,
}

/// An organization and one of its centrality values.
#[derive(Debug, Serialize, PartialEq)]
pub struct Ranked {
    pub id: String,
    pub value: f64,
}

/// Report payload for `orgnet stats`.
#[derive(Debug, Serialize)]
pub struct NetworkSummary {
    #[serde(flatten)]
    pub stats: GraphStats,
    pub dropped_rows: usize,
    pub graph_hash: String,
    pub pagerank_iterations: usize,
    pub pagerank_converged: bool,
    pub top_pagerank: Vec<Ranked>,
    pub top_betweenness: Vec<Ranked>,
}

impl NetworkSummary {
    /// Summarize one engine run, ranking over every graph node.
    #[must_use]
    pub fn new(output: EngineOutput, top: usize) -> Self {
        let nodes = &output.view.nodes;
        let report = output.report;
        Self {
            top_pagerank: leaders(nodes, SortKey::Pagerank, top),
            top_betweenness: leaders(nodes, SortKey::Betweenness, top),
            stats: report.stats,
            dropped_rows: report.dropped_rows,
            graph_hash: report.graph_hash,
            pagerank_iterations: report.pagerank_iterations,
            pagerank_converged: report.pagerank_converged,
        }
    }
}

fn leaders(nodes: &[NodeMetrics], key: SortKey, top: usize) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = nodes
        .iter()
        .filter_map(|node| {
            node.metric(key).map(|value| Ranked {
                id: node.id.clone(),
                value,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.id.cmp(&b.id)));
    ranked.truncate(top);
    ranked
}

/// Execute `orgnet stats`.
pub fn run_stats(
    args: &StatsArgs,
    output: OutputMode,
    config_path: Option<&Path>,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path, project_root, output)?;
    args.input.apply(&mut config);

    let engine = build_engine(config, output)?;
    let input = args.input.load(output)?;
    let analyzed = engine
        .analyze(&input.records, input.categories.as_ref())
        .map_err(|err| engine_failure(output, err))?;

    let summary = NetworkSummary::new(analyzed, args.top);
    render(output, &summary, |summary, w| {
        if output.is_pretty() {
            render_summary_pretty(summary, w)
        } else {
            render_summary_text(summary, w)
        }
    })
}

fn render_summary_pretty(summary: &NetworkSummary, w: &mut dyn Write) -> std::io::Result<()> {
    let stats = &summary.stats;
    pretty_section(w, "Network summary")?;
    pretty_kv(w, "organizations", stats.node_count.to_string())?;
    pretty_kv(w, "relationships", stats.edge_count.to_string())?;
    pretty_kv(w, "total weight", fmt_amount(stats.total_weight))?;
    pretty_kv(w, "density", format!("{:.4}", stats.density))?;
    pretty_kv(
        w,
        "components",
        stats.weakly_connected_component_count.to_string(),
    )?;
    pretty_kv(w, "isolated", stats.isolated_node_count.to_string())?;
    pretty_kv(w, "self loops", stats.self_loop_count.to_string())?;
    pretty_kv(
        w,
        "max in / out",
        format!("{} / {}", stats.max_in_degree, stats.max_out_degree),
    )?;
    pretty_kv(w, "dropped rows", summary.dropped_rows.to_string())?;
    let convergence = if summary.pagerank_converged {
        format!("converged in {} iterations", summary.pagerank_iterations)
    } else {
        format!(
            "NOT converged after {} iterations",
            summary.pagerank_iterations
        )
    };
    pretty_kv(w, "pagerank", convergence)?;
    pretty_kv(w, "graph hash", &summary.graph_hash)?;

    for (heading, ranked) in [
        ("Top PageRank", &summary.top_pagerank),
        ("Top betweenness", &summary.top_betweenness),
    ] {
        if ranked.is_empty() {
            continue;
        }
        writeln!(w)?;
        pretty_section(w, heading)?;
        for (rank, entry) in ranked.iter().enumerate() {
            writeln!(w, "  {:>2}. {:<30} {:.6}", rank + 1, entry.id, entry.value)?;
        }
    }
    Ok(())
}

fn render_summary_text(summary: &NetworkSummary, w: &mut dyn Write) -> std::io::Result<()> {
    let stats = &summary.stats;
    writeln!(w, "nodes  {}", stats.node_count)?;
    writeln!(w, "edges  {}", stats.edge_count)?;
    writeln!(w, "total_weight  {}", fmt_amount(stats.total_weight))?;
    writeln!(w, "density  {:.6}", stats.density)?;
    writeln!(w, "components  {}", stats.weakly_connected_component_count)?;
    writeln!(w, "isolated  {}", stats.isolated_node_count)?;
    writeln!(w, "self_loops  {}", stats.self_loop_count)?;
    writeln!(w, "dropped_rows  {}", summary.dropped_rows)?;
    writeln!(w, "pagerank_iterations  {}", summary.pagerank_iterations)?;
    writeln!(w, "pagerank_converged  {}", summary.pagerank_converged)?;
    writeln!(w, "graph_hash  {}", summary.graph_hash)?;
    for entry in &summary.top_pagerank {
        writeln!(w, "top_pagerank  {}  {:.6}", entry.id, entry.value)?;
    }
    for entry in &summary.top_betweenness {
        writeln!(w, "top_betweenness  {}  {:.6}", entry.id, entry.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgnet_core::model::RelationshipRecord;
    use orgnet_metrics::MetricsEngine;

    fn broker_summary(top: usize) -> NetworkSummary {
        // A and B reach D and E only through C.
        let records = vec![
            RelationshipRecord::new("A", "C"),
            RelationshipRecord::new("B", "C"),
            RelationshipRecord::new("C", "D"),
            RelationshipRecord::new("C", "E"),
            RelationshipRecord {
                source: Some("F".into()),
                target: None,
                weight: None,
            },
        ];
        let output = MetricsEngine::default().analyze(&records, None).unwrap();
        NetworkSummary::new(output, top)
    }

    #[test]
    fn summary_counts_graph_and_dropped_rows() {
        let summary = broker_summary(5);
        assert_eq!(summary.stats.node_count, 5);
        assert_eq!(summary.stats.edge_count, 4);
        assert_eq!(summary.dropped_rows, 1);
        assert!(summary.pagerank_converged);
        assert!(summary.graph_hash.starts_with("blake3:"));
    }

    #[test]
    fn broker_leads_betweenness() {
        let summary = broker_summary(2);
        assert_eq!(summary.top_betweenness.len(), 2);
        assert_eq!(summary.top_betweenness[0].id, "C");
        assert!(summary.top_betweenness[0].value > 0.0);
        assert!(summary.top_betweenness[1].value.abs() < 1e-12);
    }

    #[test]
    fn pagerank_ties_break_by_id() {
        let summary = broker_summary(5);
        let ids: Vec<&str> = summary.top_pagerank.iter().map(|r| r.id.as_str()).collect();
        let d = ids.iter().position(|id| *id == "D").unwrap();
        let e = ids.iter().position(|id| *id == "E").unwrap();
        assert!(d < e);
    }

    #[test]
    fn json_payload_flattens_stats() {
        let summary = broker_summary(1);
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["node_count"], 5);
        assert_eq!(value["dropped_rows"], 1);
        assert_eq!(value["top_pagerank"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn text_render_is_key_value_lines() {
        let mut buf = Vec::new();
        render_summary_text(&broker_summary(1), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("nodes  5\nedges  4\n"));
        assert!(text.contains("top_betweenness  C  "));
    }

    #[test]
    fn pretty_render_has_sections() {
        let mut buf = Vec::new();
        render_summary_pretty(&broker_summary(3), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Network summary"));
        assert!(text.contains("Top PageRank"));
        assert!(text.contains("Top betweenness"));
    }
}
