//! Staged import of one legacy directory into a [`Dataset`].
//!
//! Stages run in order: dimensions, then facts, then finalize. Each stage
//! receives the identity maps built by the previous one; nothing survives the
//! run except the returned [`ImportOutcome`].

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use serde::Serialize;
use strum::{Display, IntoEnumIterator, IntoStaticStr};
use tracing::{debug, info};

use crate::config::ImportOptions;
use crate::dataset::{Dataset, EntityKind};
use crate::error::{Error, Result};
use crate::import::dimensions::import_dimensions;
use crate::import::facts::import_facts;
use crate::import::files::{TableFiles, TableKind};
use crate::import::report::{ImportReport, IssueKind};
use crate::table::{DecodedRow, ReadMode, TableReader};

/// Name of the thread started by [`spawn_import`].
pub const IMPORT_THREAD_NAME: &str = "legacy-import";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr, Serialize)]
pub enum Stage {
    Init,
    ImportDimensions,
    ImportFacts,
    Finalize,
    Done,
    Failed,
}

impl Stage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Result of one run. The dataset is present even when the run failed.
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub stage: Stage,
    pub dataset: Dataset,
    pub report: ImportReport,
}

impl ImportOutcome {
    pub fn is_success(&self) -> bool {
        self.stage == Stage::Done && self.report.is_success()
    }
}

/// State shared by the stages of one run.
pub(crate) struct ImportContext<'a> {
    pub options: &'a ImportOptions,
    pub files: &'a TableFiles,
    pub report: ImportReport,
    pub dataset: Dataset,
}

impl ImportContext<'_> {
    /// Open the file for `kind`, logging why it could not be used.
    pub fn open_table(&mut self, kind: TableKind) -> Option<TableReader> {
        let Some(path) = self.files.get(kind) else {
            self.report.warn(
                Some(kind),
                IssueKind::MissingFile,
                format!("{} not found, table skipped", kind.file_name()),
            );
            return None;
        };

        match TableReader::open(path, &self.options.layout) {
            Ok(reader) => {
                let s = reader.summary();
                self.report.info(
                    Some(kind),
                    format!(
                        "{} records declared, {} available, record size {}, block size {}, {} fields ({} names recovered)",
                        s.declared_records,
                        s.available_records,
                        s.record_size,
                        s.block_size,
                        s.field_count,
                        s.names_recovered
                    ),
                );
                for note in &reader.header().notes {
                    self.report.info(Some(kind), note.clone());
                }
                if reader.header().is_empty_table() {
                    self.report
                        .info(Some(kind), "record size is not positive, table treated as empty");
                }
                Some(reader)
            }
            Err(e @ Error::TruncatedHeader { .. }) => {
                self.report
                    .warn(Some(kind), IssueKind::TruncatedHeader, e.to_string());
                None
            }
            Err(e) => {
                self.report
                    .error(Some(kind), IssueKind::UnrecoverableIo, e.to_string());
                None
            }
        }
    }

    /// Decode every reachable row. A record past the end of the file stops
    /// the pass with one warning; earlier rows are kept.
    pub fn read_rows(&mut self, kind: TableKind, reader: &TableReader, mode: ReadMode) -> Vec<DecodedRow> {
        let (rows, stopped) = collect_rows(reader, mode);
        if let Some(e) = stopped {
            self.warn_truncated(kind, reader, rows.len(), &e);
        }
        rows
    }

    pub fn warn_truncated(&mut self, kind: TableKind, reader: &TableReader, read: usize, e: &Error) {
        self.report.warn(
            Some(kind),
            IssueKind::OutOfRange,
            format!(
                "stopped after {} of {} declared records: {}",
                read,
                reader.declared_records(),
                e
            ),
        );
    }
}

/// Decode rows without logging; returns the error that stopped the pass.
pub(crate) fn collect_rows(reader: &TableReader, mode: ReadMode) -> (Vec<DecodedRow>, Option<Error>) {
    let mut rows = Vec::with_capacity(reader.readable_records());
    for result in reader.rows(mode) {
        match result {
            Ok(row) => rows.push(row),
            Err(e) => return (rows, Some(e)),
        }
    }
    (rows, None)
}

pub struct ImportPipeline {
    options: ImportOptions,
    stage: Stage,
}

impl ImportPipeline {
    /// # Errors
    ///
    /// [`Error::OptionsParse`] when `options` fail validation.
    pub fn new(options: ImportOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            stage: Stage::Init,
        })
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Import every table found in `dir`.
    ///
    /// Per-table problems are logged in the report and never abort the run.
    /// Only a directory that cannot be listed ends in [`Stage::Failed`].
    pub fn run<P: AsRef<Path>>(self, dir: P) -> ImportOutcome {
        let dir = dir.as_ref();
        let Self { options, mut stage } = self;
        let mut report = ImportReport::new();
        let dataset = Dataset::new(options.season_name.clone());
        report.info(None, format!("Importing legacy tables from {}", dir.display()));

        let files = match TableFiles::discover(dir) {
            Ok(files) => files,
            Err(e) => {
                report.error(None, IssueKind::UnrecoverableIo, e.to_string());
                advance(&mut stage, Stage::Failed);
                return ImportOutcome {
                    stage,
                    dataset,
                    report,
                };
            }
        };
        for kind in TableKind::iter() {
            if let Some(path) = files.get(kind) {
                debug!("{} -> {}", kind, path.display());
            }
        }

        let mut ctx = ImportContext {
            options: &options,
            files: &files,
            report,
            dataset,
        };

        advance(&mut stage, Stage::ImportDimensions);
        let maps = import_dimensions(&mut ctx);

        advance(&mut stage, Stage::ImportFacts);
        import_facts(&mut ctx, &maps);

        advance(&mut stage, Stage::Finalize);
        finalize(&mut ctx);

        advance(&mut stage, Stage::Done);
        ImportOutcome {
            stage,
            dataset: ctx.dataset,
            report: ctx.report,
        }
    }
}

fn advance(stage: &mut Stage, next: Stage) {
    debug!("Import stage {} -> {}", stage, next);
    *stage = next;
}

fn finalize(ctx: &mut ImportContext<'_>) {
    if let Some((start, end)) = ctx.dataset.fixture_date_range() {
        ctx.dataset.season.start_date = Some(start);
        ctx.dataset.season.end_date = Some(end);
        ctx.report.info(
            None,
            format!("Season '{}' runs {} to {}", ctx.dataset.season.name, start, end),
        );
    }

    let counts = EntityKind::iter()
        .map(|kind| format!("{} {}", ctx.dataset.count(kind), kind))
        .collect::<Vec<_>>()
        .join(", ");
    ctx.report.info(
        None,
        format!(
            "Imported {}, {} doubles frames counted",
            counts, ctx.dataset.doubles_frames
        ),
    );
    info!(
        "Import finished with {} warnings and {} errors",
        ctx.report.warning_count(),
        ctx.report.error_count()
    );
}

/// Validate `options` and run the import on the calling thread.
pub fn import_directory<P: AsRef<Path>>(dir: P, options: ImportOptions) -> Result<ImportOutcome> {
    Ok(ImportPipeline::new(options)?.run(dir))
}

/// Run the import on a dedicated thread. The caller joins the handle to
/// receive the outcome.
///
/// # Errors
///
/// Invalid options, or the thread could not be started.
pub fn spawn_import(dir: PathBuf, options: ImportOptions) -> Result<JoinHandle<ImportOutcome>> {
    let pipeline = ImportPipeline::new(options)?;
    let handle = thread::Builder::new()
        .name(IMPORT_THREAD_NAME.to_string())
        .spawn(move || pipeline.run(&dir))?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Cell, FieldType, TableFileBuilder};

    #[test]
    fn test_invalid_options_rejected() {
        let options = ImportOptions {
            name_fallback_ratio: 2.0,
            ..ImportOptions::default()
        };
        assert!(matches!(
            ImportPipeline::new(options),
            Err(Error::OptionsParse(_))
        ));
    }

    #[test]
    fn test_unreadable_directory_fails() {
        let pipeline = ImportPipeline::new(ImportOptions::default()).unwrap();
        assert_eq!(pipeline.stage(), Stage::Init);
        let outcome = pipeline.run("/nonexistent/league/data");
        assert_eq!(outcome.stage, Stage::Failed);
        assert!(!outcome.is_success());
        assert_eq!(outcome.report.issue_count(IssueKind::UnrecoverableIo), 1);
        assert_eq!(outcome.dataset.count(EntityKind::Team), 0);
    }

    #[test]
    fn test_empty_directory_logs_every_missing_table() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = import_directory(dir.path(), ImportOptions::default()).unwrap();
        assert_eq!(outcome.stage, Stage::Done);
        assert!(outcome.is_success());
        assert_eq!(
            outcome.report.issue_count(IssueKind::MissingFile),
            TableKind::iter().count()
        );
    }

    #[test]
    fn test_collect_rows_keeps_rows_before_truncation() {
        let mut bytes = TableFileBuilder::new("Team")
            .field("ID", FieldType::LongInt, 4)
            .field("Name", FieldType::String, 16)
            .row([Cell::Int(1), "Reds".into()])
            .row([Cell::Int(2), "Blues".into()])
            .build();
        bytes.truncate(2048 + 6 + 20);
        let reader = TableReader::from_bytes(bytes, &Default::default()).unwrap();
        let (rows, stopped) = collect_rows(&reader, ReadMode::Structured);
        assert_eq!(rows.len(), 1);
        assert!(matches!(stopped, Some(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_spawn_import_names_thread() {
        let dir = tempfile::tempdir().unwrap();
        let handle = spawn_import(dir.path().to_path_buf(), ImportOptions::default()).unwrap();
        assert_eq!(handle.thread().name(), Some(IMPORT_THREAD_NAME));
        let outcome = handle.join().unwrap();
        assert_eq!(outcome.stage, Stage::Done);
    }
}
