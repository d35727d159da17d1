//! Relational import of a directory of legacy league tables.

mod dimensions;
mod facts;
pub mod files;
pub mod identity;
mod pipeline;
pub mod report;
pub mod schema;

pub use files::{TableFiles, TableKind};
pub use identity::{DimensionMaps, IdentityMap, Registration, normalize_name};
pub use pipeline::{
    IMPORT_THREAD_NAME, ImportOutcome, ImportPipeline, Stage, import_directory, spawn_import,
};
pub use report::{ImportReport, IssueKind, KindCounters, Level, LogLine};
