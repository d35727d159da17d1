//! Import command: run the pipeline over a directory and write the dataset.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use owo_colors::OwoColorize;
use pxleague_core::import::{Level, LogLine};
use pxleague_core::{EntityKind, ImportOptions, ImportOutcome, Stage, spawn_import};
use strum::IntoEnumIterator;

/// Run the import command
pub fn run(
    dir: &str,
    season: Option<&str>,
    options_file: Option<&str>,
    output: Option<&str>,
) -> Result<()> {
    let current_version = env!("CARGO_PKG_VERSION");
    eprintln!("pxleague {} - Import Mode", current_version);

    let mut options = match options_file {
        Some(path) => load_options(path)?,
        None => ImportOptions::default(),
    };
    if let Some(season) = season {
        options.season_name = season.to_string();
    }

    let handle = spawn_import(PathBuf::from(dir), options)?;
    let outcome = handle
        .join()
        .map_err(|_| anyhow!("Import thread panicked"))?;

    eprint!("{}", format_report(&outcome));

    if outcome.stage == Stage::Failed {
        bail!("Import of {} failed", dir);
    }

    let json = serde_json::to_string_pretty(&outcome.dataset)?;
    if let Some(path) = output {
        fs::write(path, &json).with_context(|| format!("Failed to write {}", path))?;
        eprintln!("Dataset written to: {}", path);
    } else {
        println!("{}", json);
    }

    if !outcome.report.is_success() {
        bail!(
            "Import finished with {} errors",
            outcome.report.error_count()
        );
    }
    Ok(())
}

/// Load import options from a TOML file. Missing keys take their defaults.
pub fn load_options(path: &str) -> Result<ImportOptions> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read options from {}", path))?;
    let options = parse_options(&text)?;
    Ok(options)
}

fn parse_options(text: &str) -> pxleague_core::Result<ImportOptions> {
    let options: ImportOptions = toml::from_str(text)
        .map_err(|e| pxleague_core::Error::OptionsParse(e.to_string()))?;
    options.validate()?;
    Ok(options)
}

fn format_line(line: &LogLine) -> String {
    match line.level {
        Level::Info => line.to_string(),
        Level::Warning => line.to_string().yellow().to_string(),
        Level::Error => line.to_string().red().bold().to_string(),
    }
}

/// Colored report: the log lines, then a per-kind counter table.
pub fn format_report(outcome: &ImportOutcome) -> String {
    let mut output = String::new();
    let report = &outcome.report;

    for line in report.lines() {
        let _ = writeln!(output, "{}", format_line(line));
    }

    let border = "━".repeat(48);
    let _ = writeln!(output, "{}", border.dimmed());
    let _ = writeln!(
        output,
        "  {:<12} {:>9} {:>11} {:>9}",
        "KIND".bold(),
        "IMPORTED".bold(),
        "DUPLICATES".bold(),
        "WARNINGS".bold()
    );
    for kind in EntityKind::iter() {
        let c = report.counters(kind);
        let _ = writeln!(
            output,
            "  {:<12} {:>9} {:>11} {:>9}",
            kind.to_string(),
            outcome.dataset.count(kind),
            c.duplicates,
            c.warnings
        );
    }
    let _ = writeln!(output, "{}", border.dimmed());

    let status = if outcome.is_success() {
        "OK".green().bold().to_string()
    } else {
        "FAILED".red().bold().to_string()
    };
    let _ = writeln!(
        output,
        "  {} ({} warnings, {} errors, stage {})",
        status,
        report.warning_count(),
        report.error_count(),
        outcome.stage
    );
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_options() {
        let options = parse_options(
            r#"
season_name = "Winter 2009"

[layout]
scanner_skip_bytes = 2
"#,
        )
        .unwrap();
        assert_eq!(options.season_name, "Winter 2009");
        assert_eq!(options.name_fallback_ratio, 0.5);
        assert_eq!(options.layout.scanner_skip_bytes, 2);
        assert_eq!(options.layout.default_block_size, 2048);
    }

    #[test]
    fn test_parse_rejects_invalid_ratio() {
        let result = parse_options("name_fallback_ratio = 1.5");
        assert!(matches!(result, Err(pxleague_core::Error::OptionsParse(_))));
    }

    #[test]
    fn test_parse_rejects_bad_toml() {
        assert!(parse_options("season_name = ").is_err());
    }

    #[test]
    fn test_report_lists_every_kind() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = pxleague_core::import_directory(dir.path(), ImportOptions::default()).unwrap();
        let text = format_report(&outcome);
        assert!(text.contains("Venue.DB not found"));
        assert!(text.contains("FrameResult"));
        assert!(text.contains("7 warnings, 0 errors"));
    }
}
