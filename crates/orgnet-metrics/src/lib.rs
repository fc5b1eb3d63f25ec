#![forbid(unsafe_code)]
//! orgnet-metrics library.
//!
//! Builds a directed, weighted relationship graph between organizations and
//! computes degree, in/out-degree, PageRank, and betweenness for every node.
//!
//! # Conventions
//!
//! - **Errors**: operations return [`orgnet_core::error::Result`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//!
//! ```rust
//! use orgnet_core::model::RelationshipRecord;
//! use orgnet_metrics::MetricsEngine;
//!
//! let records = vec![
//!     RelationshipRecord::new("A", "B"),
//!     RelationshipRecord::new("A", "C"),
//!     RelationshipRecord::new("B", "C"),
//! ];
//! let report = MetricsEngine::default().run(&records, None)?;
//! assert_eq!(report.rows[0].id, "C");
//! # Ok::<(), orgnet_core::EngineError>(())
//! ```

pub mod engine;
pub mod graph;
pub mod metrics;
pub mod report;
pub mod sink;
pub mod view;

pub use engine::{EngineOutput, MetricsEngine};
pub use graph::{GraphStats, RelationshipGraph};
pub use metrics::basic::NodeRole;
pub use report::{MetricsReport, NodeMetrics};
pub use sink::{JsonSink, MemorySink, NullSink, ReportSink, VisualizationSink};
pub use view::{GraphView, ViewEdge};
