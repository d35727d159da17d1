//! Decoding of the legacy binary table format.
//!
//! - [`header`]: fixed-offset header scalars, descriptors, name recovery
//! - [`locator`]: record offset arithmetic
//! - [`decoder`]: typed field payload decoding
//! - [`scanner`]: heuristic single-label recovery

mod bytes;
pub mod decoder;
pub mod header;
pub mod locator;
pub mod scanner;
mod value;

// Synthetic table files for unit and integration tests
#[doc(hidden)]
pub mod mock;

pub use bytes::{ByteBuffer, decode_ascii, is_all_zero, is_numeric_text, is_printable};
pub use decoder::decode;
pub use header::{FieldDescriptor, FieldType, TableHeader, read_header};
pub use locator::RecordLayout;
pub use scanner::TextScanner;
pub use value::Value;

#[doc(hidden)]
pub use mock::{Cell, TableFileBuilder};
