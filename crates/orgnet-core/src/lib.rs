#![forbid(unsafe_code)]
//! orgnet-core library.
//!
//! Shared data model for the relationship metrics engine: raw and normalized
//! relationship rows, the wide (one origin, many destinations) layout, the
//! category lookup table, engine configuration, and error types.
//!
//! # Conventions
//!
//! - **Errors**: library operations return [`error::Result`]; the binary
//!   wraps them in `anyhow`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod config;
pub mod error;
pub mod model;

pub use config::EngineConfig;
pub use error::{EngineError, ErrorCode};
pub use model::{
    CategoryEntry, CategoryTable, NormalizedRelationships, Relationship, RelationshipRecord,
    WideRow, melt_wide_rows, normalize_records,
};
