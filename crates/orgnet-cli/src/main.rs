#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "orgnet: organization relationship graphs and centrality metrics",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format: pretty, text, json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Configuration file (defaults to ./orgnet.toml when present).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, `FORMAT`, and the terminal.
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Per-organization centrality table",
        long_about = "Build the relationship graph and report degree, in-degree, out-degree, PageRank, and betweenness per organization.",
        after_help = "EXAMPLES:\n    # Rank every organization by PageRank\n    orgnet metrics --relationships rels.jsonl\n\n    # Only organizations that receive relationships, top 10 by betweenness\n    orgnet metrics --relationships rels.jsonl --scope destinations --sort-by betweenness --limit 10\n\n    # Wide input with categories, machine-readable\n    orgnet metrics --wide survey.json --categories cats.json --json"
    )]
    Metrics(cmd::metrics::MetricsArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Export nodes and edges for a network renderer",
        long_about = "Export every node with its metrics, category, and presentation size, plus every weighted edge.",
        after_help = "EXAMPLES:\n    # Node/edge export as JSON\n    orgnet graph --relationships rels.jsonl --json\n\n    # Include organizations that only appear in the category table\n    orgnet graph --relationships rels.jsonl --categories cats.json --category-nodes include"
    )]
    Graph(cmd::graph::GraphArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Summarize the relationship network",
        long_about = "Report graph size, density, components, dropped rows, PageRank convergence, and the leading organizations.",
        after_help = "EXAMPLES:\n    # Network summary\n    orgnet stats --relationships rels.jsonl\n\n    # Top 3 per centrality as JSON\n    orgnet stats --relationships rels.jsonl --top 3 --json"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    orgnet completions bash\n\n    # Generate zsh completions\n    orgnet completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ORGNET_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "orgnet=debug,info"
        } else {
            "orgnet=info,warn"
        })
    });

    let format = env::var("ORGNET_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let output = cli.output_mode();
    let config = cli.config.as_deref();
    debug!(?output, "output mode resolved");

    match cli.command {
        Commands::Metrics(ref args) => {
            cmd::metrics::run_metrics(args, output, config, cli.quiet, &project_root)
        }
        Commands::Graph(ref args) => cmd::graph::run_graph(args, output, config, &project_root),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, output, config, &project_root),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgnet_core::config::{CategoryNodePolicy, EdgePolicy, ReportScope, SortKey};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["orgnet", "--json", "stats", "--relationships", "r.json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["orgnet", "stats", "--relationships", "r.json", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn format_flag_wins_over_json() {
        let cli = Cli::parse_from([
            "orgnet",
            "--json",
            "--format",
            "text",
            "metrics",
            "--relationships",
            "r.json",
        ]);
        assert_eq!(cli.output_mode(), OutputMode::Text);
    }

    #[test]
    fn metrics_args_parse() {
        let cli = Cli::parse_from([
            "orgnet",
            "metrics",
            "--relationships",
            "r.jsonl",
            "--categories",
            "c.jsonl",
            "--sort-by",
            "betweenness",
            "--limit",
            "3",
            "--scope",
            "destinations",
            "--edge-policy",
            "count",
            "--category-nodes",
            "include",
        ]);
        let Commands::Metrics(args) = cli.command else {
            panic!("expected metrics command");
        };
        assert_eq!(args.input.relationships, Some(PathBuf::from("r.jsonl")));
        assert_eq!(args.input.categories, Some(PathBuf::from("c.jsonl")));
        assert_eq!(args.sort_by, Some(SortKey::Betweenness));
        assert_eq!(args.limit, Some(3));
        assert_eq!(args.scope, Some(ReportScope::Destinations));
        assert_eq!(args.input.edge_policy, Some(EdgePolicy::Count));
        assert_eq!(
            args.input.category_nodes,
            Some(CategoryNodePolicy::Include)
        );
    }

    #[test]
    fn wide_input_replaces_relationships() {
        let cli = Cli::parse_from(["orgnet", "graph", "--wide", "w.json"]);
        let Commands::Graph(args) = cli.command else {
            panic!("expected graph command");
        };
        assert_eq!(args.input.wide, Some(PathBuf::from("w.json")));
        assert!(args.input.relationships.is_none());
    }

    #[test]
    fn input_is_required() {
        assert!(Cli::try_parse_from(["orgnet", "metrics"]).is_err());
    }

    #[test]
    fn relationships_and_wide_conflict() {
        assert!(
            Cli::try_parse_from([
                "orgnet",
                "metrics",
                "--relationships",
                "r.json",
                "--wide",
                "w.json"
            ])
            .is_err()
        );
    }

    #[test]
    fn stats_top_defaults_to_five() {
        let cli = Cli::parse_from(["orgnet", "stats", "--relationships", "r.json"]);
        let Commands::Stats(args) = cli.command else {
            panic!("expected stats command");
        };
        assert_eq!(args.top, 5);
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::parse_from([
            "orgnet",
            "stats",
            "--relationships",
            "r.json",
            "--config",
            "custom.toml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
    }
}
