//! Row-level access to one table file.

mod columns;
mod reader;

pub use columns::{ColumnKind, ColumnMap, ColumnSpec, MatchedBy, ResolvedColumn};
pub use reader::{DecodedRow, ID_COLUMN, NAME_COLUMN, ReadMode, Rows, TableReader, TableSummary};
