//! Inspect command: print the parsed header of one table file.

use std::fmt::Write as _;

use anyhow::Result;
use owo_colors::OwoColorize;
use pxleague_core::{LayoutConfig, TableReader};
use serde::Serialize;

#[derive(Serialize)]
struct InspectOutput<'a> {
    header: &'a pxleague_core::TableHeader,
    summary: pxleague_core::TableSummary,
}

/// Run the inspect command
pub fn run(file: &str, json: bool) -> Result<()> {
    let reader = TableReader::open(file, &LayoutConfig::default())?;

    if json {
        let output = InspectOutput {
            header: reader.header(),
            summary: reader.summary(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_header(file, &reader));
    }
    Ok(())
}

fn format_header(file: &str, reader: &TableReader) -> String {
    let mut output = String::new();
    let header = reader.header();
    let summary = reader.summary();

    let _ = writeln!(output, "{}", file.bold());
    let _ = writeln!(
        output,
        "  Table name   : {}",
        header.table_name.as_deref().unwrap_or("(not recovered)")
    );
    let _ = writeln!(
        output,
        "  File type    : {} (version 0x{:02X})",
        header.file_type, header.file_version
    );
    let _ = writeln!(output, "  Record size  : {}", header.record_size);
    let _ = writeln!(
        output,
        "  Block size   : {} (factor {}, {} header blocks)",
        header.block_size, header.block_size_factor, header.header_size_in_blocks
    );
    let records = format!(
        "{} declared, {} available",
        summary.declared_records, summary.available_records
    );
    if summary.is_truncated() {
        let _ = writeln!(output, "  Records      : {}", records.yellow());
    } else {
        let _ = writeln!(output, "  Records      : {}", records);
    }
    match header.code_page {
        Some(cp) => {
            let _ = writeln!(output, "  Code page    : {}", cp);
        }
        None => {
            let _ = writeln!(output, "  Code page    : -");
        }
    }
    let _ = writeln!(
        output,
        "  Primary key  : {} fields, sort order {}",
        header.primary_key_field_count, header.sort_order
    );

    let _ = writeln!(output, "  Fields ({}):", header.fields.len());
    for (i, field) in header.fields.iter().enumerate() {
        let name = if field.name_recovered {
            field.name.clone()
        } else {
            field.name.dimmed().to_string()
        };
        let _ = writeln!(
            output,
            "    {:>3}  {:<24} {:<14} {:>4}",
            i + 1,
            name,
            format!("{:?}", field.field_type),
            field.size
        );
    }

    for note in &header.notes {
        let _ = writeln!(output, "  {} {}", "note:".yellow(), note);
    }
    output
}
