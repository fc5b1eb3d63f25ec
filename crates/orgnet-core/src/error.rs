use std::fmt;
use std::path::PathBuf;

/// Machine-readable error codes for scripted consumers of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    ConfigReadFailed,
    InvalidConfig,
    InvalidWeight,
    InputParseError,
    PageRankDiverged,
    InputReadFailed,
    SinkWriteFailed,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::ConfigReadFailed => "E1002",
            Self::InvalidConfig => "E1003",
            Self::InvalidWeight => "E2001",
            Self::InputParseError => "E2002",
            Self::PageRankDiverged => "E3001",
            Self::InputReadFailed => "E5001",
            Self::SinkWriteFailed => "E5002",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::ConfigReadFailed => "Config file could not be read",
            Self::InvalidConfig => "Invalid configuration value",
            Self::InvalidWeight => "Invalid relationship weight",
            Self::InputParseError => "Input table parse error",
            Self::PageRankDiverged => "PageRank did not converge",
            Self::InputReadFailed => "Input table could not be read",
            Self::SinkWriteFailed => "Report output could not be written",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in orgnet.toml and retry."),
            Self::ConfigReadFailed => Some("Check the --config path and file permissions."),
            Self::InvalidConfig => Some(
                "damping must be within [0, 1], tolerance must be > 0, max_iter must be >= 1.",
            ),
            Self::InvalidWeight => {
                Some("Weights must be finite and >= 0; omit the weight to default to 1.")
            }
            Self::InputParseError => {
                Some("Provide a JSON array or JSON Lines of objects with the documented fields.")
            }
            Self::PageRankDiverged => Some(
                "Raise pagerank.max_iter, loosen pagerank.tolerance, or set require_convergence = false.",
            ),
            Self::InputReadFailed => Some("Check the input path and file permissions."),
            Self::SinkWriteFailed => Some("Check disk space and write permissions for the output."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors surfaced by record normalization, configuration, and metric runs.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("row {row}: weight {weight} is not a finite non-negative number")]
    InvalidWeight { row: usize, weight: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("PageRank did not converge after {iterations} iterations (residual {residual:.3e})")]
    PageRankDiverged { iterations: usize, residual: f64 },

    #[error("report sink failed: {0}")]
    Sink(#[source] std::io::Error),
}

impl EngineError {
    /// The stable [`ErrorCode`] for this error.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::InvalidWeight { .. } => ErrorCode::InvalidWeight,
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::ConfigRead { .. } => ErrorCode::ConfigReadFailed,
            Self::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Self::PageRankDiverged { .. } => ErrorCode::PageRankDiverged,
            Self::Sink(_) => ErrorCode::SinkWriteFailed,
        }
    }

    /// Remediation text for terminal output.
    #[must_use]
    pub fn suggestion(&self) -> String {
        self.error_code()
            .hint()
            .unwrap_or_else(|| self.error_code().message())
            .to_string()
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
