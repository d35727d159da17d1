//! Table header and field descriptor parsing.
//!
//! Scalars sit at fixed offsets in the first block. Field names have no fixed
//! offset: they are recovered by scanning the bytes between the descriptor
//! arrays and the first data block for printable runs. Name recovery is
//! best-effort; every field always has a usable (possibly synthetic) name.

use serde::Serialize;
use strum::IntoStaticStr;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::config::block;
use crate::error::{Error, Result};
use crate::format::bytes::{ByteBuffer, is_numeric_text, is_printable};

/// Header field offsets (relative to file start).
pub mod offsets {
    pub const RECORD_SIZE: usize = 0x00;
    pub const HEADER_SIZE: usize = 0x02;
    pub const FILE_TYPE: usize = 0x04;
    pub const BLOCK_SIZE_FACTOR: usize = 0x05;
    pub const RECORD_COUNT: usize = 0x06;
    pub const FIELD_COUNT: usize = 0x21;
    pub const PRIMARY_KEY_FIELDS: usize = 0x23;
    pub const SORT_ORDER: usize = 0x29;
    pub const FILE_VERSION: usize = 0x39;
    pub const CODE_PAGE: usize = 0x6A;
}

/// Declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr)]
pub enum FieldType {
    String,
    Date,
    ShortInt,
    LongInt,
    Currency,
    Number,
    Logical,
    Memo,
    Blob,
    Time,
    Timestamp,
    AutoIncrement,
    Unknown(u8),
}

impl FieldType {
    /// Maps a descriptor type byte to its field type. Unrecognised tags are
    /// kept as [`FieldType::Unknown`].
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0x01 => Self::String,
            0x02 => Self::Date,
            0x03 => Self::ShortInt,
            0x04 => Self::LongInt,
            0x05 => Self::Currency,
            0x06 => Self::Number,
            0x09 => Self::Logical,
            0x0C => Self::Memo,
            0x0D => Self::Blob,
            0x14 => Self::Time,
            0x15 => Self::Timestamp,
            0x16 => Self::AutoIncrement,
            other => Self::Unknown(other),
        }
    }

    /// Returns the descriptor type byte for this field type.
    pub fn tag(&self) -> u8 {
        match self {
            Self::String => 0x01,
            Self::Date => 0x02,
            Self::ShortInt => 0x03,
            Self::LongInt => 0x04,
            Self::Currency => 0x05,
            Self::Number => 0x06,
            Self::Logical => 0x09,
            Self::Memo => 0x0C,
            Self::Blob => 0x0D,
            Self::Time => 0x14,
            Self::Timestamp => 0x15,
            Self::AutoIncrement => 0x16,
            Self::Unknown(tag) => *tag,
        }
    }

    /// Returns the type name used in listings.
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Integer-valued types usable as legacy keys.
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::ShortInt | Self::LongInt | Self::AutoIncrement)
    }

    /// Types whose payload decodes as text.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::String | Self::Unknown(_))
    }
}

/// One field of a table: declared type, payload width and name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub field_type: FieldType,
    pub size: usize,
    pub name: String,
    /// False when `name` is a synthetic `FieldN` placeholder.
    pub name_recovered: bool,
}

impl FieldDescriptor {
    /// Placeholder name for the zero-based field `index`: `Field1`, `Field2`, ...
    pub fn synthetic_name(index: usize) -> String {
        format!("Field{}", index + 1)
    }
}

/// Parsed header of one table file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableHeader {
    pub record_size: i32,
    pub header_size_bytes: usize,
    pub header_size_in_blocks: usize,
    pub file_type: u8,
    pub block_size_factor: u8,
    pub block_size: usize,
    pub record_count: usize,
    pub field_count: usize,
    pub primary_key_field_count: usize,
    pub fields: Vec<FieldDescriptor>,
    pub code_page: Option<u16>,
    pub sort_order: u8,
    pub file_version: u8,
    /// Internal table name recovered from the name region, if any.
    pub table_name: Option<String>,
    /// Non-fatal anomalies noticed while parsing.
    pub notes: Vec<String>,
}

impl TableHeader {
    /// A table with no positive record size yields no rows.
    pub fn is_empty_table(&self) -> bool {
        self.record_size <= 0
    }

    /// Record size as a byte count, zero for a non-positive declared size.
    pub fn record_size_bytes(&self) -> usize {
        self.record_size.max(0) as usize
    }

    /// Returns the number of fields whose name was recovered from the file.
    pub fn recovered_name_count(&self) -> usize {
        self.fields.iter().filter(|f| f.name_recovered).count()
    }

    /// Finds a field by name, ignoring ASCII case.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// Parse a table header from the start of `data`.
///
/// # Errors
///
/// Returns [`Error::OptionsParse`] when `layout` fails validation and
/// [`Error::TruncatedHeader`] when `data` is shorter than the fixed scalar
/// region. Every other anomaly is recorded in [`TableHeader::notes`].
pub fn read_header(data: &[u8], layout: &LayoutConfig) -> Result<TableHeader> {
    layout.validate()?;

    let buf = ByteBuffer::new(data);
    if buf.len() < layout.min_header_len {
        return Err(Error::TruncatedHeader {
            len: buf.len(),
            required: layout.min_header_len,
        });
    }

    let record_size = buf.read_u16_le_at(offsets::RECORD_SIZE)? as i16 as i32;
    let header_size_bytes = buf.read_u16_le_at(offsets::HEADER_SIZE)? as usize;
    let file_type = buf.read_u8_at(offsets::FILE_TYPE)?;
    let block_size_factor = buf.read_u8_at(offsets::BLOCK_SIZE_FACTOR)?;
    let record_count = buf.read_u32_le_at(offsets::RECORD_COUNT)? as usize;
    let field_count = buf.read_u16_le_at(offsets::FIELD_COUNT)? as usize;
    let primary_key_field_count = buf.read_u16_le_at(offsets::PRIMARY_KEY_FIELDS)? as usize;
    let sort_order = buf.read_u8_at(offsets::SORT_ORDER)?;
    let file_version = buf.read_u8_at(offsets::FILE_VERSION)?;

    let block_size = block_size_bytes(block_size_factor, layout);
    let header_size_in_blocks = header_size_bytes.div_ceil(block_size).max(1);

    let mut notes = Vec::new();

    let (types, sizes) = read_descriptor_arrays(&buf, field_count, layout.descriptor_base);
    if types.len() < field_count {
        notes.push(format!(
            "descriptor arrays truncated: {} of {} fields present",
            types.len(),
            field_count
        ));
    }

    let descriptors_end = layout.descriptor_base + field_count * 2;
    let code_page = if descriptors_end <= offsets::CODE_PAGE {
        buf.read_u16_le_at(offsets::CODE_PAGE).ok()
    } else {
        None
    };

    let names_start = match code_page {
        Some(_) => descriptors_end.max(offsets::CODE_PAGE + 2),
        None => descriptors_end,
    };
    let data_start = header_size_in_blocks.saturating_mul(block_size);
    let name_region =
        buf.slice_clamped(names_start, data_start.saturating_sub(names_start));
    let mut runs = scan_name_runs(name_region, layout).into_iter();
    let table_name = runs.next();
    let recovered: Vec<String> = runs.collect();

    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(types.len());
    for (index, (&tag, &size)) in types.iter().zip(sizes.iter()).enumerate() {
        let candidate = recovered
            .get(index)
            .filter(|name| !fields.iter().any(|f| f.name.eq_ignore_ascii_case(name)))
            .cloned();
        let name_recovered = candidate.is_some();
        fields.push(FieldDescriptor {
            field_type: FieldType::from_tag(tag),
            size: size as usize,
            name: candidate.unwrap_or_else(|| FieldDescriptor::synthetic_name(index)),
            name_recovered,
        });
    }

    let synthetic = fields.iter().filter(|f| !f.name_recovered).count();
    if synthetic > 0 {
        notes.push(format!(
            "{} of {} field names synthesized",
            synthetic,
            fields.len()
        ));
    }

    debug!(
        "Header: record_size={} block_size={} records={} fields={} names_recovered={}",
        record_size,
        block_size,
        record_count,
        fields.len(),
        fields.len() - synthetic
    );

    Ok(TableHeader {
        record_size,
        header_size_bytes,
        header_size_in_blocks,
        file_type,
        block_size_factor,
        block_size,
        record_count,
        field_count,
        primary_key_field_count,
        fields,
        code_page,
        sort_order,
        file_version,
        table_name,
        notes,
    })
}

/// Block size in bytes for a declared size factor.
pub fn block_size_bytes(factor: u8, layout: &LayoutConfig) -> usize {
    match factor {
        0 => layout.default_block_size,
        f => f as usize * block::SIZE_UNIT,
    }
}

fn read_descriptor_arrays<'a>(
    buf: &ByteBuffer<'a>,
    field_count: usize,
    base: usize,
) -> (&'a [u8], &'a [u8]) {
    let types = buf.slice_clamped(base, field_count);
    let sizes = buf.slice_clamped(base + field_count, field_count);
    let usable = types.len().min(sizes.len());
    (&types[..usable], &sizes[..usable])
}

/// Collect plausible names from a region: printable runs terminated by a
/// non-printable byte, within the configured length range, not purely numeric.
pub fn scan_name_runs(region: &[u8], layout: &LayoutConfig) -> Vec<String> {
    let mut names = Vec::new();
    let mut start: Option<usize> = None;

    for (i, &byte) in region.iter().enumerate() {
        if is_printable(byte) {
            start.get_or_insert(i);
            continue;
        }
        if let Some(s) = start.take() {
            let run = &region[s..i];
            if let Some(name) = accept_name(run, layout) {
                names.push(name);
            }
        }
    }

    names
}

fn accept_name(run: &[u8], layout: &LayoutConfig) -> Option<String> {
    if run.len() < layout.min_name_len || run.len() > layout.max_name_len {
        return None;
    }
    // Printable bytes are all ASCII, so this cannot lose data.
    let text: String = run.iter().map(|&b| b as char).collect();
    let text = text.trim();
    if text.len() < layout.min_name_len || is_numeric_text(text) {
        return None;
    }
    Some(text.to_string())
}
