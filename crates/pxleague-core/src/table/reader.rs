use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use strum::{Display, IntoStaticStr};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::format::decoder::{decode, decode_legacy_id};
use crate::format::{FieldDescriptor, FieldType, RecordLayout, TableHeader, TextScanner, Value};
use crate::format::read_header;

/// Column names produced in [`ReadMode::NameOnly`].
pub const ID_COLUMN: &str = "ID";
pub const NAME_COLUMN: &str = "Name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize)]
pub enum ReadMode {
    /// One value per declared field.
    Structured,
    /// Leading legacy ID plus a heuristically scanned label.
    NameOnly,
}

/// One decoded record: field names in declared order with their values.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    index: usize,
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl DecodedRow {
    pub fn new(index: usize, names: Arc<[String]>, values: Vec<Value>) -> Self {
        Self {
            index,
            names,
            values,
        }
    }

    /// Record index within the table.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .and_then(|i| self.values.get(i))
    }

    pub fn get_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(|n| n.as_str()).zip(self.values.iter())
    }
}

impl Serialize for DecodedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Header statistics for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub record_size: i32,
    pub block_size: usize,
    pub declared_records: usize,
    pub available_records: usize,
    pub field_count: usize,
    pub names_recovered: usize,
}

impl TableSummary {
    pub fn is_truncated(&self) -> bool {
        self.available_records < self.declared_records
    }
}

/// Reads the rows of one table file held fully in memory.
#[derive(Debug, Clone)]
pub struct TableReader {
    source: Option<PathBuf>,
    bytes: Vec<u8>,
    header: TableHeader,
    record_layout: RecordLayout,
    scanner: TextScanner,
}

impl TableReader {
    /// Read `path` fully and parse its header.
    ///
    /// # Errors
    ///
    /// [`Error::UnrecoverableIo`] when the file cannot be read,
    /// [`Error::TruncatedHeader`] when it is too short to hold a header,
    /// [`Error::OptionsParse`] when `layout` is invalid.
    pub fn open<P: AsRef<Path>>(path: P, layout: &LayoutConfig) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::unrecoverable_io(path, e))?;
        debug!("Read {} bytes from {:?}", bytes.len(), path);
        let mut reader = Self::from_bytes(bytes, layout)?;
        reader.source = Some(path.to_path_buf());
        Ok(reader)
    }

    /// Parse the header of an in-memory table file. Fails like [`open`](Self::open).
    pub fn from_bytes(bytes: Vec<u8>, layout: &LayoutConfig) -> Result<Self> {
        let header = read_header(&bytes, layout)?;
        let record_layout = RecordLayout::from_header(&header, layout);
        Ok(Self {
            source: None,
            bytes,
            header,
            record_layout,
            scanner: TextScanner::from_layout(layout),
        })
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn record_layout(&self) -> &RecordLayout {
        &self.record_layout
    }

    pub fn file_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn declared_records(&self) -> usize {
        if self.header.is_empty_table() {
            0
        } else {
            self.header.record_count
        }
    }

    pub fn available_records(&self) -> usize {
        self.record_layout.available_records(self.bytes.len())
    }

    /// Upper bound on rows the iterator will produce.
    pub fn readable_records(&self) -> usize {
        self.declared_records().min(self.available_records())
    }

    pub fn summary(&self) -> TableSummary {
        TableSummary {
            record_size: self.header.record_size,
            block_size: self.header.block_size,
            declared_records: self.declared_records(),
            available_records: self.available_records(),
            field_count: self.header.fields.len(),
            names_recovered: self.header.recovered_name_count(),
        }
    }

    /// Field descriptors of the rows produced in `mode`.
    pub fn columns(&self, mode: ReadMode) -> Vec<FieldDescriptor> {
        match mode {
            ReadMode::Structured => self.header.fields.clone(),
            ReadMode::NameOnly => vec![
                FieldDescriptor {
                    field_type: FieldType::LongInt,
                    size: 4,
                    name: ID_COLUMN.to_string(),
                    name_recovered: true,
                },
                FieldDescriptor {
                    field_type: FieldType::String,
                    size: self.header.record_size_bytes().saturating_sub(4),
                    name: NAME_COLUMN.to_string(),
                    name_recovered: true,
                },
            ],
        }
    }

    /// Raw bytes of record `index`.
    pub fn record_bytes(&self, index: usize) -> Result<&[u8]> {
        let offset = self.record_layout.locate(index, self.bytes.len())?;
        Ok(&self.bytes[offset..offset + self.record_layout.record_size])
    }

    /// Lazily decode rows. Each call starts a fresh pass from record 0.
    pub fn rows(&self, mode: ReadMode) -> Rows<'_> {
        let names: Arc<[String]> = self
            .columns(mode)
            .into_iter()
            .map(|f| f.name)
            .collect();
        Rows {
            reader: self,
            mode,
            names,
            next: 0,
            limit: self.declared_records(),
            done: false,
        }
    }

    fn decode_structured(&self, record: &[u8]) -> Vec<Value> {
        let mut values = Vec::with_capacity(self.header.fields.len());
        let mut pos = 0usize;
        for field in &self.header.fields {
            let end = pos.saturating_add(field.size);
            let value = match record.get(pos..end) {
                Some(raw) => decode(raw, field.field_type),
                None => Value::Null,
            };
            values.push(value);
            pos = end;
        }
        values
    }

    fn decode_name_only(&self, record: &[u8]) -> Vec<Value> {
        let id = decode_legacy_id(record).map_or(Value::Null, Value::Integer);
        let name = self.scanner.scan(record).map_or(Value::Null, Value::Text);
        vec![id, name]
    }
}

/// Single-pass row iterator over a [`TableReader`].
///
/// Yields at most the declared record count. When a record would extend past
/// the end of the file, yields one `Err(OutOfRange)` and stops; rows already
/// produced remain valid.
pub struct Rows<'a> {
    reader: &'a TableReader,
    mode: ReadMode,
    names: Arc<[String]>,
    next: usize,
    limit: usize,
    done: bool,
}

impl Iterator for Rows<'_> {
    type Item = Result<DecodedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.next >= self.limit {
            return None;
        }

        let index = self.next;
        let record = match self.reader.record_bytes(index) {
            Ok(record) => record,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.next += 1;

        let values = match self.mode {
            ReadMode::Structured => self.reader.decode_structured(record),
            ReadMode::NameOnly => self.reader.decode_name_only(record),
        };
        Some(Ok(DecodedRow::new(index, Arc::clone(&self.names), values)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        (0, Some(self.limit.saturating_sub(self.next)))
    }
}
