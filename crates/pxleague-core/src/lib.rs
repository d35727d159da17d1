pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod import;
pub mod table;

pub use config::{ImportOptions, LayoutConfig};
pub use dataset::{
    Dataset, Division, EntityId, EntityKind, Fixture, FrameResult, Player, Season, Side, Team,
    Venue,
};
pub use error::{Error, Result};
pub use format::{FieldDescriptor, FieldType, TableHeader, Value, decode, read_header};
pub use import::{
    ImportOutcome, ImportPipeline, ImportReport, IssueKind, Stage, TableKind, import_directory,
    spawn_import,
};
pub use table::{DecodedRow, ReadMode, TableReader, TableSummary};
