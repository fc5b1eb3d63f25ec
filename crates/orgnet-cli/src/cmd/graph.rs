//! `orgnet graph` — node/edge export for network renderers.
//!
//! Every graph node is exported regardless of the report scope. Nodes that
//! appear as a relationship source get the fixed `render.origin_size`; every
//! other node is sized `render.base_size + render.pagerank_scale * pagerank`.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use orgnet_core::config::RenderConfig;
use orgnet_metrics::{GraphView, NodeMetrics, NodeRole, NullSink, ViewEdge, VisualizationSink};
use serde::Serialize;

use crate::cmd::{InputArgs, build_engine, engine_failure, load_config};
use crate::output::{OutputMode, fmt_amount, pretty_section, render_to};

/// Arguments for `orgnet graph`.
#[derive(Args, Debug, Clone, Default)]
pub struct GraphArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// A view node with its presentation size.
#[derive(Debug, Serialize)]
pub struct SizedNode<'a> {
    #[serde(flatten)]
    pub metrics: &'a NodeMetrics,
    pub size: f64,
}

/// Export payload for `orgnet graph`.
#[derive(Debug, Serialize)]
pub struct GraphExport<'a> {
    pub nodes: Vec<SizedNode<'a>>,
    pub edges: &'a [ViewEdge],
}

/// Presentation size of a node.
#[must_use]
pub fn node_size(node: &NodeMetrics, render: &RenderConfig) -> f64 {
    match node.role {
        NodeRole::Origin | NodeRole::Both => render.origin_size,
        NodeRole::Destination | NodeRole::Isolated => {
            render.pagerank_scale.mul_add(node.pagerank, render.base_size)
        }
    }
}

impl<'a> GraphExport<'a> {
    #[must_use]
    pub fn new(view: &'a GraphView, render: &RenderConfig) -> Self {
        let nodes = view
            .nodes
            .iter()
            .map(|metrics| SizedNode {
                metrics,
                size: node_size(metrics, render),
            })
            .collect();
        Self {
            nodes,
            edges: &view.edges,
        }
    }
}

/// Writes a [`GraphView`] in the selected output mode.
pub struct GraphPrinter<W> {
    writer: W,
    mode: OutputMode,
    render: RenderConfig,
}

impl<W: Write> GraphPrinter<W> {
    pub const fn new(writer: W, mode: OutputMode, render: RenderConfig) -> Self {
        Self {
            writer,
            mode,
            render,
        }
    }
}

impl<W: Write> VisualizationSink for GraphPrinter<W> {
    fn write_view(&mut self, view: &GraphView) -> io::Result<()> {
        let export = GraphExport::new(view, &self.render);
        let mode = self.mode;
        render_to(&mut self.writer, mode, &export, |export, w| {
            if mode.is_pretty() {
                write_pretty(export, w)
            } else {
                write_text(export, w)
            }
        })
        .map_err(io::Error::other)?;
        self.writer.flush()
    }
}

fn write_pretty(export: &GraphExport<'_>, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("Nodes ({})", export.nodes.len()))?;
    for node in &export.nodes {
        writeln!(
            w,
            "  {:<30} {:<11} {:<16} size {:>6.2}",
            node.metrics.id,
            node.metrics.role.as_str(),
            node.metrics.category.as_deref().unwrap_or("-"),
            node.size
        )?;
    }
    writeln!(w)?;
    pretty_section(w, &format!("Edges ({})", export.edges.len()))?;
    for edge in export.edges {
        writeln!(
            w,
            "  {} → {} ({})",
            edge.source,
            edge.target,
            fmt_amount(edge.weight)
        )?;
    }
    Ok(())
}

fn write_text(export: &GraphExport<'_>, w: &mut dyn Write) -> io::Result<()> {
    for node in &export.nodes {
        writeln!(
            w,
            "node  {}  {}  {}  {:.4}",
            node.metrics.id,
            node.metrics.role,
            node.metrics.category.as_deref().unwrap_or("-"),
            node.size
        )?;
    }
    for edge in export.edges {
        writeln!(
            w,
            "edge  {}  {}  {}",
            edge.source,
            edge.target,
            fmt_amount(edge.weight)
        )?;
    }
    Ok(())
}

/// Execute `orgnet graph`.
pub fn run_graph(
    args: &GraphArgs,
    output: OutputMode,
    config_path: Option<&Path>,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path, project_root, output)?;
    args.input.apply(&mut config);
    let render = config.render;

    let engine = build_engine(config, output)?;
    let input = args.input.load(output)?;

    let mut printer = GraphPrinter::new(io::stdout().lock(), output, render);
    engine
        .run_into(
            &input.records,
            input.categories.as_ref(),
            &mut NullSink,
            &mut printer,
        )
        .map(drop)
        .map_err(|err| engine_failure(output, err))
}
