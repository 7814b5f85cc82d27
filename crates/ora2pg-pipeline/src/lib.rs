//! Orchestrates the Oracle-to-PostgreSQL migration: extraction and write
//! jobs wired over the State Store, DDL text generation, and the declared
//! sixteen-stage sequence that runs them in order.

mod ddl;
mod error;
mod extract;
mod pipeline;
mod stages;

pub use error::MigrationError;
pub use pipeline::{MigrationPipeline, RenderConfig, StageOutcome, StageReport};
pub use stages::{Stage, ORDERED_STAGES};
