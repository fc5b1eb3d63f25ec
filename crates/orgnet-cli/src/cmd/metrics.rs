//! `orgnet metrics` — per-organization centrality table.

use std::io::{self, Write};
use std::path::Path;

use clap::Args;
use orgnet_core::config::{ReportScope, SortKey};
use orgnet_metrics::{JsonSink, MetricsReport, NodeMetrics, NullSink, ReportSink};

use crate::cmd::{InputArgs, build_engine, engine_failure, load_config};
use crate::output::{OutputMode, fmt_amount, pretty_kv, pretty_rule, pretty_section};

/// Arguments for `orgnet metrics`.
#[derive(Args, Debug, Clone, Default)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Sort column: pagerank, betweenness, degree, in_degree, out_degree, id.
    #[arg(long, value_name = "KEY")]
    pub sort_by: Option<SortKey>,

    /// Show only the first N rows.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Which nodes to list: all, destinations.
    #[arg(long, value_name = "SCOPE")]
    pub scope: Option<ReportScope>,
}

/// Execute `orgnet metrics`.
pub fn run_metrics(
    args: &MetricsArgs,
    output: OutputMode,
    config_path: Option<&Path>,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path, project_root, output)?;
    args.input.apply(&mut config);
    if let Some(sort_by) = args.sort_by {
        config.report.sort_by = sort_by;
    }
    if args.limit.is_some() {
        config.report.limit = args.limit;
    }
    if let Some(scope) = args.scope {
        config.report.scope = scope;
    }

    let engine = build_engine(config, output)?;
    let input = args.input.load(output)?;

    let mut printer = TablePrinter::new(io::stdout().lock(), output, quiet);
    let result = engine.run_into(
        &input.records,
        input.categories.as_ref(),
        &mut printer,
        &mut NullSink,
    );
    result.map(drop).map_err(|err| engine_failure(output, err))
}

/// Writes a [`MetricsReport`] as an aligned table (pretty) or plain rows (text).
pub struct TablePrinter<W> {
    writer: W,
    mode: OutputMode,
    quiet: bool,
}

impl<W: Write> TablePrinter<W> {
    pub const fn new(writer: W, mode: OutputMode, quiet: bool) -> Self {
        Self {
            writer,
            mode,
            quiet,
        }
    }

    fn write_pretty(&mut self, report: &MetricsReport) -> io::Result<()> {
        let w = &mut self.writer;
        pretty_section(
            w,
            &format!(
                "Organization metrics (sorted by {}, scope {})",
                report.sort_by, report.scope
            ),
        )?;

        if report.is_empty() {
            writeln!(w, "(no organizations)")?;
        } else {
            let id_width = report
                .rows
                .iter()
                .map(|row| row.id.chars().count())
                .max()
                .unwrap_or(2)
                .clamp(2, 40);
            let cat_width = report
                .rows
                .iter()
                .filter_map(|row| row.category.as_deref())
                .map(|c| c.chars().count())
                .max()
                .unwrap_or(1)
                .clamp(8, 24);

            writeln!(
                w,
                "{:<id_width$}  {:<11}  {:<cat_width$}  {:>7}  {:>7}  {:>7}  {:>9}  {:>11}",
                "ID", "ROLE", "CATEGORY", "DEGREE", "IN", "OUT", "PAGERANK", "BETWEENNESS"
            )?;
            for row in &report.rows {
                writeln!(
                    w,
                    "{:<id_width$}  {:<11}  {:<cat_width$}  {:>7}  {:>7}  {:>7}  {:>9.6}  {:>11.6}",
                    truncate(&row.id, id_width),
                    row.role.as_str(),
                    truncate(row.category.as_deref().unwrap_or("-"), cat_width),
                    fmt_amount(row.degree),
                    fmt_amount(row.in_degree),
                    fmt_amount(row.out_degree),
                    row.pagerank,
                    row.betweenness,
                )?;
            }
        }

        if !self.quiet {
            pretty_rule(w)?;
            pretty_kv(
                w,
                "graph",
                format!(
                    "{} nodes, {} edges",
                    report.stats.node_count, report.stats.edge_count
                ),
            )?;
            if report.dropped_rows > 0 {
                pretty_kv(w, "dropped rows", report.dropped_rows.to_string())?;
            }
            let convergence = if report.pagerank_converged {
                format!("converged in {} iterations", report.pagerank_iterations)
            } else {
                format!(
                    "NOT converged after {} iterations",
                    report.pagerank_iterations
                )
            };
            pretty_kv(w, "pagerank", convergence)?;
            pretty_kv(w, "graph hash", &report.graph_hash)?;
        }
        Ok(())
    }

    fn write_text(&mut self, report: &MetricsReport) -> io::Result<()> {
        let w = &mut self.writer;
        if report.is_empty() {
            return Ok(());
        }
        writeln!(
            w,
            "id  role  category  degree  in_degree  out_degree  pagerank  betweenness"
        )?;
        for row in &report.rows {
            write_text_row(w, row)?;
        }
        Ok(())
    }
}

fn write_text_row(w: &mut dyn Write, row: &NodeMetrics) -> io::Result<()> {
    writeln!(
        w,
        "{}  {}  {}  {}  {}  {}  {:.6}  {:.6}",
        row.id,
        row.role,
        row.category.as_deref().unwrap_or("-"),
        fmt_amount(row.degree),
        fmt_amount(row.in_degree),
        fmt_amount(row.out_degree),
        row.pagerank,
        row.betweenness,
    )
}

impl<W: Write> ReportSink for TablePrinter<W> {
    fn write_report(&mut self, report: &MetricsReport) -> io::Result<()> {
        if self.mode.is_json() {
            return JsonSink::new(&mut self.writer).write_report(report);
        }
        if self.mode.is_pretty() {
            self.write_pretty(report)?;
        } else {
            self.write_text(report)?;
        }
        self.writer.flush()
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
