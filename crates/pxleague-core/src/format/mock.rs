//! Synthetic table files for tests.
//!
//! Builds byte buffers laid out like real table files so decoding and import
//! logic can be exercised without sample data. Only the subset of the format
//! the reader understands is produced.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::config::block;
use crate::config::header::DESCRIPTOR_BASE;
use crate::format::header::{FieldType, offsets};

/// Encode an integer with the sign-flipped big-endian convention.
pub fn encode_signed(value: i64, width: usize) -> Vec<u8> {
    let width = width.clamp(1, 8);
    let bits = width as u32 * 8;
    let full_mask = if bits == 64 { u64::MAX } else { (1u64 << bits) - 1 };
    let sign_bit = 1u64 << (bits - 1);
    let encoded = ((value as u64) & full_mask) ^ sign_bit;
    encoded.to_be_bytes()[8 - width..].to_vec()
}

pub fn encode_number(value: f64) -> Vec<u8> {
    let mut bytes = value.to_be_bytes();
    if bytes[0] & 0x80 == 0 {
        bytes[0] |= 0x80;
    } else {
        for b in bytes.iter_mut() {
            *b ^= 0xFF;
        }
    }
    bytes.to_vec()
}

pub fn encode_date(date: NaiveDate) -> Vec<u8> {
    encode_signed(date.num_days_from_ce() as i64, 4)
}

/// One cell of a synthetic record.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Text(String),
    Date(NaiveDate),
    Number(f64),
    Bool(bool),
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<NaiveDate> for Cell {
    fn from(v: NaiveDate) -> Self {
        Cell::Date(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl Cell {
    fn encode(&self, field_type: FieldType, size: usize) -> Vec<u8> {
        let mut bytes = match self {
            Cell::Null => Vec::new(),
            Cell::Int(v) => encode_signed(*v, size.min(8)),
            Cell::Text(s) => s.as_bytes().to_vec(),
            Cell::Date(d) => encode_date(*d),
            Cell::Number(v) => encode_number(*v),
            Cell::Bool(b) if field_type == FieldType::Logical => vec![if *b { 0x81 } else { 0x80 }],
            Cell::Bool(b) => encode_signed(*b as i64, size.min(8)),
        };
        bytes.resize(size, 0);
        bytes
    }
}

#[derive(Debug, Clone)]
struct FieldSpec {
    name: String,
    field_type: FieldType,
    size: usize,
}

/// Builder for synthetic table files.
#[derive(Debug, Clone)]
pub struct TableFileBuilder {
    table_name: String,
    fields: Vec<FieldSpec>,
    records: Vec<Vec<u8>>,
    block_size_factor: u8,
    write_names: bool,
    declared_records: Option<usize>,
}

impl TableFileBuilder {
    pub fn new(table_name: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            fields: Vec::new(),
            records: Vec::new(),
            block_size_factor: 2,
            write_names: true,
            declared_records: None,
        }
    }

    pub fn field(mut self, name: &str, field_type: FieldType, size: usize) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            field_type,
            size,
        });
        self
    }

    pub fn block_size_factor(mut self, factor: u8) -> Self {
        self.block_size_factor = factor;
        self
    }

    /// Leave the name region empty so every field gets a synthetic name.
    pub fn without_names(mut self) -> Self {
        self.write_names = false;
        self
    }

    /// Override the record count written to the header.
    pub fn declared_records(mut self, count: usize) -> Self {
        self.declared_records = Some(count);
        self
    }

    /// Append a record built from one cell per field.
    pub fn row<I, C>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        let mut record = Vec::with_capacity(self.record_size());
        let mut cells = cells.into_iter().map(Into::into);
        for field in &self.fields {
            let cell = cells.next().unwrap_or(Cell::Null);
            record.extend(cell.encode(field.field_type, field.size));
        }
        self.records.push(record);
        self
    }

    pub fn record_size(&self) -> usize {
        self.fields.iter().map(|f| f.size).sum()
    }

    fn block_size(&self) -> usize {
        match self.block_size_factor {
            0 => block::DEFAULT_SIZE,
            f => f as usize * block::SIZE_UNIT,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let block_size = self.block_size();
        let record_size = self.record_size();
        let per_block = if record_size == 0 {
            1
        } else {
            ((block_size - block::HEADER_BYTES) / record_size).max(1)
        };
        let blocks = self.records.len().div_ceil(per_block);
        let mut data = vec![0u8; block_size * (1 + blocks)];

        let field_count = self.fields.len();
        let record_count = self.declared_records.unwrap_or(self.records.len());
        put(&mut data, offsets::RECORD_SIZE, &(record_size as u16).to_le_bytes());
        put(&mut data, offsets::HEADER_SIZE, &(block_size.min(u16::MAX as usize) as u16).to_le_bytes());
        data[offsets::FILE_TYPE] = 0;
        data[offsets::BLOCK_SIZE_FACTOR] = self.block_size_factor;
        put(&mut data, offsets::RECORD_COUNT, &(record_count as u32).to_le_bytes());
        put(&mut data, offsets::FIELD_COUNT, &(field_count as u16).to_le_bytes());
        put(&mut data, offsets::PRIMARY_KEY_FIELDS, &1u16.to_le_bytes());
        data[offsets::FILE_VERSION] = 0x0C;

        for (i, field) in self.fields.iter().enumerate() {
            data[DESCRIPTOR_BASE + i] = field.field_type.tag();
            data[DESCRIPTOR_BASE + field_count + i] = field.size as u8;
        }

        let descriptors_end = DESCRIPTOR_BASE + field_count * 2;
        let mut names_at = descriptors_end;
        if descriptors_end <= offsets::CODE_PAGE {
            put(&mut data, offsets::CODE_PAGE, &437u16.to_le_bytes());
            names_at = names_at.max(offsets::CODE_PAGE + 2);
        }
        if self.write_names {
            let names = std::iter::once(self.table_name.as_str())
                .chain(self.fields.iter().map(|f| f.name.as_str()));
            for name in names {
                put(&mut data, names_at, name.as_bytes());
                names_at += name.len() + 1;
            }
        }

        for (index, record) in self.records.iter().enumerate() {
            let block_index = index / per_block;
            let slot = index % per_block;
            let block_start = block_size * (1 + block_index);
            if slot == 0 {
                let in_block = (self.records.len() - index).min(per_block);
                let next = if block_index + 1 < blocks { block_index + 2 } else { 0 };
                put(&mut data, block_start, &(next as u16).to_le_bytes());
                put(&mut data, block_start + 2, &(block_index as u16).to_le_bytes());
                let add_data = ((in_block - 1) * record_size) as u16;
                put(&mut data, block_start + 4, &add_data.to_le_bytes());
            }
            put(&mut data, block_start + block::HEADER_BYTES + slot * record_size, record);
        }

        data
    }

    /// Write the table into `dir` under `file_name`.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> std::io::Result<PathBuf> {
        let path = dir.join(file_name);
        fs::write(&path, self.build())?;
        Ok(path)
    }
}

fn put(data: &mut [u8], offset: usize, bytes: &[u8]) {
    data[offset..offset + bytes.len()].copy_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_signed_known_values() {
        assert_eq!(encode_signed(5, 4), vec![0x80, 0x00, 0x00, 0x05]);
        assert_eq!(encode_signed(-1, 4), vec![0x7F, 0xFF, 0xFF, 0xFF]);
        assert_eq!(encode_signed(0, 2), vec![0x80, 0x00]);
    }

    #[test]
    fn test_builder_layout() {
        let data = TableFileBuilder::new("Team")
            .field("ID", FieldType::LongInt, 4)
            .field("Name", FieldType::String, 16)
            .row([Cell::Int(1), Cell::from("Reds")])
            .build();

        assert_eq!(data.len(), 4096);
        assert_eq!(&data[2048 + 6..2048 + 10], &[0x80, 0x00, 0x00, 0x01]);
        assert_eq!(&data[2048 + 10..2048 + 14], b"Reds");
    }
}
