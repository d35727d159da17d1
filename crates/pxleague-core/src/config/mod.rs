//! Import options and format layout parameters.
//!
//! The block-boundary constants were measured from sample files rather than
//! taken from a published format description, so they are carried in
//! [`LayoutConfig`] and can be overridden per import.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Header layout constants.
pub mod header {
    /// Smallest file that still holds every fixed-offset scalar.
    pub const MIN_HEADER_LEN: usize = 88;

    /// Start of the descriptor arrays (type tags, then sizes).
    pub const DESCRIPTOR_BASE: usize = 0x58;

    /// Recovered field names outside this range are discarded.
    pub const MIN_NAME_LEN: usize = 2;
    pub const MAX_NAME_LEN: usize = 30;
}

/// Block layout defaults.
pub mod block {
    /// Bytes reserved at the start of every data block.
    pub const HEADER_BYTES: usize = 6;

    /// Block size used when the header declares a zero size factor.
    pub const DEFAULT_SIZE: usize = 2048;

    /// Multiplier applied to the declared block size factor.
    pub const SIZE_UNIT: usize = 1024;
}

/// Heuristic label scanner defaults.
pub mod scanner {
    /// Leading bytes skipped before scanning (presumed legacy ID).
    pub const SKIP_BYTES: usize = 4;

    pub const MIN_LABEL_LEN: usize = 2;
    pub const MAX_LABEL_LEN: usize = 60;
}

/// Binary layout parameters for one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub block_header_bytes: usize,
    pub default_block_size: usize,
    pub min_header_len: usize,
    pub descriptor_base: usize,
    pub min_name_len: usize,
    pub max_name_len: usize,
    pub scanner_skip_bytes: usize,
    pub min_label_len: usize,
    pub max_label_len: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            block_header_bytes: block::HEADER_BYTES,
            default_block_size: block::DEFAULT_SIZE,
            min_header_len: header::MIN_HEADER_LEN,
            descriptor_base: header::DESCRIPTOR_BASE,
            min_name_len: header::MIN_NAME_LEN,
            max_name_len: header::MAX_NAME_LEN,
            scanner_skip_bytes: scanner::SKIP_BYTES,
            min_label_len: scanner::MIN_LABEL_LEN,
            max_label_len: scanner::MAX_LABEL_LEN,
        }
    }
}

impl LayoutConfig {
    /// Reject combinations that would make offset arithmetic meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.default_block_size <= self.block_header_bytes {
            return Err(Error::OptionsParse(format!(
                "default_block_size ({}) must exceed block_header_bytes ({})",
                self.default_block_size, self.block_header_bytes
            )));
        }
        if self.min_header_len < self.descriptor_base {
            return Err(Error::OptionsParse(format!(
                "min_header_len ({}) must cover descriptor_base ({})",
                self.min_header_len, self.descriptor_base
            )));
        }
        if self.min_name_len == 0 || self.min_name_len > self.max_name_len {
            return Err(Error::OptionsParse(format!(
                "invalid field name length range {}..={}",
                self.min_name_len, self.max_name_len
            )));
        }
        if self.min_label_len == 0 || self.min_label_len > self.max_label_len {
            return Err(Error::OptionsParse(format!(
                "invalid label length range {}..={}",
                self.min_label_len, self.max_label_len
            )));
        }
        Ok(())
    }
}

/// Options for one relational import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Name given to the season that receives the imported data.
    pub season_name: String,
    /// Share of nameless rows above which a dimension table is re-read
    /// in name-only mode.
    pub name_fallback_ratio: f64,
    pub layout: LayoutConfig,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            season_name: "Imported Season".to_string(),
            name_fallback_ratio: 0.5,
            layout: LayoutConfig::default(),
        }
    }
}

impl ImportOptions {
    pub fn with_season_name(mut self, name: impl Into<String>) -> Self {
        self.season_name = name.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.name_fallback_ratio) {
            return Err(Error::OptionsParse(format!(
                "name_fallback_ratio must be within 0..=1, got {}",
                self.name_fallback_ratio
            )));
        }
        self.layout.validate()
    }
}
