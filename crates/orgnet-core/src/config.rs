//! Engine configuration loaded from `orgnet.toml`.
//!
//! Every field has a default, so a missing file or a partial file is valid.
//! Edge de-duplication and category-only node handling are explicit
//! settings rather than implicit behavior.
//!
//! ```toml
//! [graph]
//! edge_policy = "sum"         # sum | count | dedupe
//! category_nodes = "exclude"  # exclude | include
//!
//! [degree]
//! weighted = false
//!
//! [pagerank]
//! damping = 0.85
//! tolerance = 1e-6
//! max_iter = 100
//! require_convergence = false
//!
//! [betweenness]
//! weighted = false
//! normalized = true
//!
//! [report]
//! sort_by = "pagerank"        # pagerank | betweenness | degree | in_degree | out_degree | id
//! scope = "all"               # all | destinations
//! # limit = 20
//!
//! [render]
//! origin_size = 20.0
//! base_size = 10.0
//! pagerank_scale = 40.0
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, Result};

/// File name looked up in the working directory when no path is given.
pub const PROJECT_CONFIG_FILE: &str = "orgnet.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub degree: DegreeConfig,
    #[serde(default)]
    pub pagerank: PageRankSettings,
    #[serde(default)]
    pub betweenness: BetweennessSettings,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl EngineConfig {
    /// Check numeric ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let pr = &self.pagerank;
        if !(0.0..=1.0).contains(&pr.damping) {
            return Err(EngineError::InvalidConfig(format!(
                "pagerank.damping must be within [0, 1], got {}",
                pr.damping
            )));
        }
        if !pr.tolerance.is_finite() || pr.tolerance <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "pagerank.tolerance must be > 0, got {}",
                pr.tolerance
            )));
        }
        if pr.max_iter == 0 {
            return Err(EngineError::InvalidConfig(
                "pagerank.max_iter must be at least 1".to_string(),
            ));
        }
        if self.report.limit == Some(0) {
            return Err(EngineError::InvalidConfig(
                "report.limit must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub edge_policy: EdgePolicy,
    #[serde(default)]
    pub category_nodes: CategoryNodePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegreeConfig {
    /// Sum incident edge weights instead of counting incident edges.
    #[serde(default)]
    pub weighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRankSettings {
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Fail the run instead of warning when the iteration cap is hit.
    #[serde(default)]
    pub require_convergence: bool,
}

impl Default for PageRankSettings {
    fn default() -> Self {
        Self {
            damping: default_damping(),
            tolerance: default_tolerance(),
            max_iter: default_max_iter(),
            require_convergence: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetweennessSettings {
    /// Use edge weights as path lengths (Dijkstra) instead of hop counts.
    #[serde(default)]
    pub weighted: bool,
    /// Divide by `(n - 1)(n - 2)`.
    #[serde(default = "default_true")]
    pub normalized: bool,
}

impl Default for BetweennessSettings {
    fn default() -> Self {
        Self {
            weighted: false,
            normalized: default_true(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub scope: ReportScope,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Presentation constants for the node/edge export. Not used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_origin_size")]
    pub origin_size: f64,
    #[serde(default = "default_base_size")]
    pub base_size: f64,
    #[serde(default = "default_pagerank_scale")]
    pub pagerank_scale: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            origin_size: default_origin_size(),
            base_size: default_base_size(),
            pagerank_scale: default_pagerank_scale(),
        }
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// How repeated `(source, target)` rows combine into one edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgePolicy {
    /// Edge weight is the sum of row weights.
    #[default]
    Sum,
    /// Edge weight is the number of rows; row weights are ignored.
    Count,
    /// Repeats are ignored; the first row's weight is kept.
    Dedupe,
}

/// Whether ids present only in the category table become graph nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryNodePolicy {
    /// Only ids referenced by relationships are nodes.
    #[default]
    Exclude,
    /// Category-only ids are added as isolated nodes before metrics run.
    Include,
}

/// Metric the report is sorted by (descending, except `Id`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Pagerank,
    Betweenness,
    Degree,
    InDegree,
    OutDegree,
    Id,
}

/// Which nodes appear in the metrics table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportScope {
    /// Every graph node.
    #[default]
    All,
    /// Only nodes that are the target of at least one relationship.
    Destinations,
}

macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Stable lowercase name, matching the config file spelling.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown value '{other}', expected one of: {}",
                        [$($name),+].join(", ")
                    )),
                }
            }
        }
    };
}

str_enum!(EdgePolicy { Sum => "sum", Count => "count", Dedupe => "dedupe" });
str_enum!(CategoryNodePolicy { Exclude => "exclude", Include => "include" });
str_enum!(SortKey {
    Pagerank => "pagerank",
    Betweenness => "betweenness",
    Degree => "degree",
    InDegree => "in_degree",
    OutDegree => "out_degree",
    Id => "id",
});
str_enum!(ReportScope { All => "all", Destinations => "destinations" });

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load `orgnet.toml` from `project_root`, or defaults when it is absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, parsed, or fails
/// [`EngineConfig::validate`].
pub fn load_project_config(project_root: &Path) -> Result<EngineConfig> {
    let path = project_root.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    load_config_file(&path)
}

/// Load and validate an explicit config file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub fn load_config_file(path: &Path) -> Result<EngineConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    let config = toml::from_str::<EngineConfig>(&content).map_err(|source| {
        EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    config.validate()?;
    debug!(path = %path.display(), "loaded engine config");
    Ok(config)
}

const fn default_true() -> bool {
    true
}

const fn default_damping() -> f64 {
    0.85
}

const fn default_tolerance() -> f64 {
    1e-6
}

const fn default_max_iter() -> usize {
    100
}

const fn default_origin_size() -> f64 {
    20.0
}

const fn default_base_size() -> f64 {
    10.0
}

const fn default_pagerank_scale() -> f64 {
    40.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_project_config_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = load_project_config(dir.path()).expect("load");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.graph.edge_policy, EdgePolicy::Sum);
        assert_eq!(config.graph.category_nodes, CategoryNodePolicy::Exclude);
        assert!((config.pagerank.damping - 0.85).abs() < f64::EPSILON);
        assert_eq!(config.pagerank.max_iter, 100);
        assert!(config.betweenness.normalized);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            "[graph]\nedge_policy = \"dedupe\"\n\n[report]\nsort_by = \"in_degree\"\nlimit = 5\n",
        )
        .expect("write config");

        let config = load_project_config(dir.path()).expect("load");
        assert_eq!(config.graph.edge_policy, EdgePolicy::Dedupe);
        assert_eq!(config.report.sort_by, SortKey::InDegree);
        assert_eq!(config.report.limit, Some(5));
        assert_eq!(config.report.scope, ReportScope::All);
        assert!((config.pagerank.tolerance - 1e-6).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[graph]\nedge_policy = \"average\"\n").expect("write config");

        let err = load_config_file(&path).expect_err("unknown policy must fail");
        assert!(matches!(err, EngineError::ConfigParse { .. }));
    }

    #[test]
    fn missing_explicit_config_is_a_read_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_config_file(&dir.path().join("nope.toml")).expect_err("must fail");
        assert!(matches!(err, EngineError::ConfigRead { .. }));
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = EngineConfig::default();
        config.pagerank.damping = 1.5;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.pagerank.tolerance = 0.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.pagerank.max_iter = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.report.limit = Some(0);
        assert!(config.validate().is_err());

        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn policies_parse_from_cli_spelling() {
        assert_eq!("Dedupe".parse::<EdgePolicy>(), Ok(EdgePolicy::Dedupe));
        assert_eq!("in-degree".parse::<SortKey>(), Ok(SortKey::InDegree));
        assert_eq!(
            "destinations".parse::<ReportScope>(),
            Ok(ReportScope::Destinations)
        );
        assert_eq!(
            "include".parse::<CategoryNodePolicy>(),
            Ok(CategoryNodePolicy::Include)
        );
        assert!("median".parse::<SortKey>().is_err());
        assert_eq!(SortKey::OutDegree.to_string(), "out_degree");
    }
}
