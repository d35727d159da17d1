//! Diagnostic report for one import run.
//!
//! Every entry is also emitted through `tracing` at the matching level, so a
//! subscriber sees the same log the caller receives.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use strum::{Display, IntoStaticStr};
use tracing::{error, info, warn};

use crate::dataset::EntityKind;
use crate::import::files::TableKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Display)]
pub enum Level {
    Info,
    Warning,
    Error,
}

/// Classified problems recorded in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
pub enum IssueKind {
    TruncatedHeader,
    OutOfRange,
    UnresolvedForeignKey,
    MissingFile,
    UnrecoverableIo,
    /// A legacy ID was reused by rows that are not duplicates of each other.
    DuplicateLegacyId,
    /// A row was dropped (no usable name, no identity to fall back to).
    SkippedRow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub level: Level,
    pub issue: Option<IssueKind>,
    pub table: Option<TableKind>,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            Level::Info => {}
            level => write!(f, "[{}] ", level)?,
        }
        if let Some(table) = self.table {
            write!(f, "{}: ", table.file_name())?;
        }
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounters {
    pub imported: usize,
    pub duplicates: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    lines: Vec<LogLine>,
    counters: BTreeMap<EntityKind, KindCounters>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, table: Option<TableKind>, message: impl Into<String>) {
        let message = message.into();
        info!("{}", message);
        self.lines.push(LogLine {
            level: Level::Info,
            issue: None,
            table,
            message,
        });
    }

    /// Record a warning and count it against the table's entity kind.
    pub fn warn(&mut self, table: Option<TableKind>, issue: IssueKind, message: impl Into<String>) {
        let message = message.into();
        warn!("{}: {}", issue, message);
        if let Some(kind) = table.and_then(|t| t.entity_kind()) {
            self.counters.entry(kind).or_default().warnings += 1;
        }
        self.lines.push(LogLine {
            level: Level::Warning,
            issue: Some(issue),
            table,
            message,
        });
    }

    pub fn error(&mut self, table: Option<TableKind>, issue: IssueKind, message: impl Into<String>) {
        let message = message.into();
        error!("{}: {}", issue, message);
        self.lines.push(LogLine {
            level: Level::Error,
            issue: Some(issue),
            table,
            message,
        });
    }

    pub fn count_imported(&mut self, kind: EntityKind) {
        self.counters.entry(kind).or_default().imported += 1;
    }

    pub fn count_duplicate(&mut self, kind: EntityKind) {
        self.counters.entry(kind).or_default().duplicates += 1;
    }

    pub fn counters(&self, kind: EntityKind) -> KindCounters {
        self.counters.get(&kind).copied().unwrap_or_default()
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn issues(&self, issue: IssueKind) -> impl Iterator<Item = &LogLine> {
        self.lines.iter().filter(move |l| l.issue == Some(issue))
    }

    pub fn issue_count(&self, issue: IssueKind) -> usize {
        self.issues(issue).count()
    }

    pub fn warning_count(&self) -> usize {
        self.lines.iter().filter(|l| l.level == Level::Warning).count()
    }

    pub fn error_count(&self) -> usize {
        self.lines.iter().filter(|l| l.level == Level::Error).count()
    }

    /// True when no errors were logged; warnings do not count.
    pub fn is_success(&self) -> bool {
        self.error_count() == 0
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        for (kind, c) in &self.counters {
            writeln!(
                f,
                "{}: {} imported, {} duplicates, {} warnings",
                kind, c.imported, c.duplicates, c.warnings
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_do_not_fail_run() {
        let mut report = ImportReport::new();
        report.info(None, "start");
        report.warn(Some(TableKind::Venue), IssueKind::MissingFile, "Venue.DB not found");
        assert!(report.is_success());
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.counters(EntityKind::Venue).warnings, 1);

        report.error(Some(TableKind::Team), IssueKind::UnrecoverableIo, "permission denied");
        assert!(!report.is_success());
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_counters() {
        let mut report = ImportReport::new();
        report.count_imported(EntityKind::Team);
        report.count_imported(EntityKind::Team);
        report.count_duplicate(EntityKind::Team);
        let c = report.counters(EntityKind::Team);
        assert_eq!((c.imported, c.duplicates, c.warnings), (2, 1, 0));
        assert_eq!(report.counters(EntityKind::Player), KindCounters::default());
    }

    #[test]
    fn test_display() {
        let mut report = ImportReport::new();
        report.warn(Some(TableKind::Doubles), IssueKind::OutOfRange, "stopped at record 4");
        report.count_imported(EntityKind::Division);
        let text = report.to_string();
        assert!(text.contains("[Warning] Dbls.DB: stopped at record 4"));
        assert!(text.contains("Division: 1 imported, 0 duplicates, 0 warnings"));
    }
}
