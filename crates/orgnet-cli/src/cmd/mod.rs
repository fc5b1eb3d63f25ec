pub mod completions;
pub mod graph;
pub mod metrics;
pub mod source;
pub mod stats;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use orgnet_core::config::{CategoryNodePolicy, EdgePolicy, EngineConfig, load_config_file, load_project_config};
use orgnet_core::error::{EngineError, ErrorCode};
use orgnet_core::model::{CategoryEntry, CategoryTable, RelationshipRecord, WideRow, melt_wide_rows};
use orgnet_metrics::MetricsEngine;
use tracing::{debug, info};

use crate::output::{CliError, OutputMode, render_error};

/// Input tables and graph-construction overrides shared by every
/// analysis command.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Relationship rows: JSON array or JSON Lines of
    /// `{"source", "target", "weight"}` objects.
    #[arg(
        long,
        value_name = "FILE",
        required_unless_present = "wide",
        conflicts_with = "wide"
    )]
    pub relationships: Option<PathBuf>,

    /// Wide rows: JSON array or JSON Lines of
    /// `{"source", "destinations": [...]}` objects.
    #[arg(long, value_name = "FILE")]
    pub wide: Option<PathBuf>,

    /// Node categories: JSON array or JSON Lines of `{"id", "category"}`.
    #[arg(long, value_name = "FILE")]
    pub categories: Option<PathBuf>,

    /// How repeated (source, target) rows combine: sum, count, dedupe.
    #[arg(long, value_name = "POLICY")]
    pub edge_policy: Option<EdgePolicy>,

    /// Whether category-only ids become isolated nodes: exclude, include.
    #[arg(long, value_name = "POLICY")]
    pub category_nodes: Option<CategoryNodePolicy>,
}

/// Tables read from disk, ready for the engine.
#[derive(Debug, Default)]
pub struct LoadedInput {
    pub records: Vec<RelationshipRecord>,
    pub categories: Option<CategoryTable>,
}

impl InputArgs {
    /// Apply graph overrides on top of the file configuration.
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(policy) = self.edge_policy {
            config.graph.edge_policy = policy;
        }
        if let Some(policy) = self.category_nodes {
            config.graph.category_nodes = policy;
        }
    }

    /// Read the relationship (or wide) table and the optional category table.
    ///
    /// # Errors
    ///
    /// Renders a coded [`CliError`] and fails if a file cannot be read or
    /// parsed.
    pub fn load(&self, output: OutputMode) -> anyhow::Result<LoadedInput> {
        let records = if let Some(path) = &self.wide {
            let rows: Vec<WideRow> = read_or_report(path, output)?;
            debug!(rows = rows.len(), "melting wide rows");
            melt_wide_rows(&rows)
        } else if let Some(path) = &self.relationships {
            read_or_report(path, output)?
        } else {
            let message = "either --relationships or --wide is required";
            render_error(output, &CliError::new(message))?;
            anyhow::bail!(message);
        };

        let categories = match &self.categories {
            Some(path) => {
                let entries: Vec<CategoryEntry> = read_or_report(path, output)?;
                Some(CategoryTable::from_entries(&entries))
            }
            None => None,
        };

        info!(
            records = records.len(),
            categories = categories.as_ref().map_or(0, CategoryTable::len),
            "input loaded"
        );
        Ok(LoadedInput {
            records,
            categories,
        })
    }
}

fn read_or_report<T: serde::de::DeserializeOwned>(
    path: &Path,
    output: OutputMode,
) -> anyhow::Result<Vec<T>> {
    match source::read_table(path) {
        Ok(rows) => Ok(rows),
        Err(err) => {
            let code = match err {
                source::SourceError::Read { .. } => ErrorCode::InputReadFailed,
                source::SourceError::Parse { .. } => ErrorCode::InputParseError,
            };
            render_error(output, &CliError::from_code(code, err.to_string()))?;
            Err(err).with_context(|| format!("failed to load {}", path.display()))
        }
    }
}

/// Load `--config <path>` or `orgnet.toml` from `project_root`.
///
/// # Errors
///
/// Renders the coded error and fails if the file is unreadable or invalid.
pub fn load_config(
    explicit: Option<&Path>,
    project_root: &Path,
    output: OutputMode,
) -> anyhow::Result<EngineConfig> {
    let loaded = explicit.map_or_else(
        || load_project_config(project_root),
        load_config_file,
    );
    loaded.map_err(|err| engine_failure(output, err))
}

/// Build an engine, rendering configuration errors.
///
/// # Errors
///
/// Fails if the merged configuration does not validate.
pub fn build_engine(config: EngineConfig, output: OutputMode) -> anyhow::Result<MetricsEngine> {
    MetricsEngine::new(config).map_err(|err| engine_failure(output, err))
}

/// Render an engine error in the selected mode and wrap it for `main`.
pub fn engine_failure(output: OutputMode, err: EngineError) -> anyhow::Error {
    if let Err(render_err) = render_error(output, &CliError::from(&err)) {
        return render_err.context(err.to_string());
    }
    anyhow::Error::new(err)
}
