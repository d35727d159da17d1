//! Dump command: decoded rows as JSON lines.

use anyhow::Result;
use pxleague_core::{LayoutConfig, ReadMode, TableReader};

/// Run the dump command
pub fn run(file: &str, name_only: bool, limit: Option<usize>) -> Result<()> {
    let reader = TableReader::open(file, &LayoutConfig::default())?;
    let mode = if name_only {
        ReadMode::NameOnly
    } else {
        ReadMode::Structured
    };

    for line in dump_lines(&reader, mode, limit)? {
        println!("{}", line);
    }
    Ok(())
}

/// One JSON object per row. A record past the end of the file stops the
/// dump with a warning on stderr.
fn dump_lines(reader: &TableReader, mode: ReadMode, limit: Option<usize>) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for result in reader.rows(mode).take(limit.unwrap_or(usize::MAX)) {
        match result {
            Ok(row) => lines.push(serde_json::to_string(&row)?),
            Err(e) => {
                eprintln!("Stopped after {} rows: {}", lines.len(), e);
                break;
            }
        }
    }
    Ok(lines)
}
