//! Record offset arithmetic.
//!
//! Records pack into fixed-size blocks. Each block starts with a small block
//! header, then as many whole records as fit. Block 0 holds the table header,
//! so data begins at block `header_size_in_blocks`.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::error::{Error, Result};
use crate::format::header::TableHeader;

/// Block geometry of a table's data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordLayout {
    pub record_size: usize,
    pub block_size: usize,
    pub header_size_in_blocks: usize,
    pub block_header_bytes: usize,
}

impl RecordLayout {
    /// Creates a layout from explicit sizes, all in bytes except
    /// `header_size_in_blocks`.
    pub fn new(
        record_size: usize,
        block_size: usize,
        header_size_in_blocks: usize,
        block_header_bytes: usize,
    ) -> Self {
        Self {
            record_size,
            block_size,
            header_size_in_blocks,
            block_header_bytes,
        }
    }

    /// Creates the layout described by a parsed header.
    pub fn from_header(header: &TableHeader, layout: &LayoutConfig) -> Self {
        Self::new(
            header.record_size_bytes(),
            header.block_size,
            header.header_size_in_blocks,
            layout.block_header_bytes,
        )
    }

    /// Returns how many records fit in one block after its header, never less
    /// than one.
    pub fn records_per_block(&self) -> usize {
        if self.record_size == 0 {
            return 1;
        }
        (self.block_size.saturating_sub(self.block_header_bytes) / self.record_size).max(1)
    }

    /// Returns the byte offset of the first data block.
    pub fn data_start(&self) -> usize {
        self.header_size_in_blocks.saturating_mul(self.block_size)
    }

    /// Byte offset of record `index`, or `OutOfRange` if the record would end
    /// past `file_len`.
    pub fn locate(&self, index: usize, file_len: usize) -> Result<usize> {
        let per_block = self.records_per_block();
        let block = index / per_block;
        let slot = index % per_block;

        let out_of_range = |offset: usize| Error::OutOfRange {
            index,
            offset,
            record_size: self.record_size,
            file_len,
        };

        let offset = block
            .checked_mul(self.block_size)
            .and_then(|o| o.checked_add(self.data_start()))
            .and_then(|o| o.checked_add(self.block_header_bytes))
            .and_then(|o| o.checked_add(slot * self.record_size))
            .ok_or_else(|| out_of_range(usize::MAX))?;

        match offset.checked_add(self.record_size) {
            Some(end) if end <= file_len => Ok(offset),
            _ => Err(out_of_range(offset)),
        }
    }

    /// Number of leading records that fit entirely inside `file_len` bytes.
    pub fn available_records(&self, file_len: usize) -> usize {
        if self.record_size == 0 || file_len <= self.data_start() {
            return 0;
        }
        let per_block = self.records_per_block();
        let body = file_len - self.data_start();
        let full_blocks = body / self.block_size;
        let tail = body % self.block_size;
        let tail_records = tail.saturating_sub(self.block_header_bytes) / self.record_size;
        full_blocks * per_block + tail_records.min(per_block)
    }
}
