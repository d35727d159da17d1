//! Single-label text recovery for records whose layout cannot be trusted.
//!
//! Dimension tables only need an ID and a label. When descriptors are
//! unreliable the label is recovered by skipping the leading ID bytes and
//! taking the first printable run. Fact tables never go through here: their
//! foreign keys must decode structurally.

use crate::config::LayoutConfig;
use crate::format::bytes::{is_numeric_text, is_printable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextScanner {
    skip: usize,
    min_len: usize,
    max_len: usize,
}

impl Default for TextScanner {
    fn default() -> Self {
        Self::from_layout(&LayoutConfig::default())
    }
}

impl TextScanner {
    pub fn from_layout(layout: &LayoutConfig) -> Self {
        Self {
            skip: layout.scanner_skip_bytes,
            min_len: layout.min_label_len,
            max_len: layout.max_label_len,
        }
    }

    /// Extract the label from one record, if a plausible one exists.
    pub fn scan(&self, record: &[u8]) -> Option<String> {
        let body = record.get(self.skip..)?;

        let mut end = body.len();
        for (i, &byte) in body.iter().enumerate() {
            if is_printable(byte) {
                continue;
            }
            if i == 0 {
                return None;
            }
            end = i;
            break;
        }

        // Printable bytes are ASCII.
        let text: String = body[..end].iter().map(|&b| b as char).collect();
        self.accept(text.trim())
    }

    fn accept(&self, text: &str) -> Option<String> {
        if text.len() < self.min_len || text.len() > self.max_len || is_numeric_text(text) {
            return None;
        }
        Some(text.to_string())
    }
}
