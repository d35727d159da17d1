//! Dimension stage: divisions, venues, teams and players.
//!
//! Tables are read structured first. If the name column cannot be matched,
//! or too many rows come back without a name, the table is read again in
//! name-only mode and the scanned label is used instead.

use tracing::debug;

use crate::dataset::EntityId;
use crate::import::files::TableKind;
use crate::import::identity::{DimensionMaps, IdentityMap, Registration};
use crate::import::pipeline::{ImportContext, collect_rows};
use crate::import::report::IssueKind;
use crate::import::schema::{
    DIVISION, DIVISION_COLUMNS, FIRST_NAME, ID, LAST_NAME, NAME, PLAYER_COLUMNS, TEAM,
    TEAM_COLUMNS, VENUE, VENUE_COLUMNS,
};
use crate::table::{ColumnMap, ColumnSpec, DecodedRow, ReadMode, TableReader};

/// Rows of one dimension table together with the column map they were read with.
pub(crate) struct DimensionRows {
    pub mode: ReadMode,
    pub columns: ColumnMap,
    pub rows: Vec<DecodedRow>,
}

pub(crate) fn import_dimensions(ctx: &mut ImportContext<'_>) -> DimensionMaps {
    let divisions = import_named(ctx, TableKind::Division, DIVISION_COLUMNS, |ctx, _, name| {
        ctx.dataset.add_division(name)
    });
    let venues = import_named(ctx, TableKind::Venue, VENUE_COLUMNS, |ctx, _, name| {
        ctx.dataset.add_venue(name)
    });
    let teams = import_named(ctx, TableKind::Team, TEAM_COLUMNS, |ctx, table, name| {
        let division = table.reference(ctx, TableKind::Team, DIVISION, &divisions);
        let venue = table.reference(ctx, TableKind::Team, VENUE, &venues);
        ctx.dataset.add_team(name, division, venue)
    });
    let players = import_named(ctx, TableKind::Player, PLAYER_COLUMNS, |ctx, table, name| {
        let team = table.reference(ctx, TableKind::Player, TEAM, &teams);
        ctx.dataset.add_player(name, team)
    });

    DimensionMaps {
        divisions,
        venues,
        teams,
        players,
    }
}

/// The row being registered, handed to the entity constructor so it can
/// resolve references.
pub(crate) struct RowRef<'r> {
    columns: &'r ColumnMap,
    row: &'r DecodedRow,
}

impl RowRef<'_> {
    /// Resolve the foreign key in column `key` against `target`.
    ///
    /// A null key leaves the reference empty. A key missing from `target`
    /// falls back to the target identities cycled by row index, with a
    /// warning. When nothing of the target kind was imported the reference
    /// stays empty; the absent table is reported on its own.
    fn reference(
        &self,
        ctx: &mut ImportContext<'_>,
        kind: TableKind,
        key: &str,
        target: &IdentityMap,
    ) -> Option<EntityId> {
        let legacy = self.columns.integer(self.row, key)?;
        if let Some(id) = target.resolve(legacy) {
            return Some(id);
        }
        let Some(fallback) = target.cycle(self.row.index()) else {
            debug!(
                "{}: record {}: {} {} left empty, none imported",
                kind,
                self.row.index(),
                key,
                legacy
            );
            return None;
        };
        ctx.report.warn(
            Some(kind),
            IssueKind::UnresolvedForeignKey,
            format!(
                "record {}: {} {} not found, assigned {} by position",
                self.row.index(),
                key,
                legacy,
                fallback
            ),
        );
        Some(fallback)
    }
}

fn import_named<F>(
    ctx: &mut ImportContext<'_>,
    kind: TableKind,
    specs: &[ColumnSpec],
    mut create: F,
) -> IdentityMap
where
    F: FnMut(&mut ImportContext<'_>, &RowRef<'_>, &str) -> EntityId,
{
    let mut map = IdentityMap::new();
    let Some(table) = read_dimension(ctx, kind, specs) else {
        return map;
    };
    let Some(entity) = kind.entity_kind() else {
        return map;
    };

    for row in &table.rows {
        let Some(name) = row_name(&table.columns, row) else {
            ctx.report.warn(
                Some(kind),
                IssueKind::SkippedRow,
                format!("record {} has no name", row.index()),
            );
            continue;
        };
        let legacy = table.columns.integer(row, ID);
        let row_ref = RowRef {
            columns: &table.columns,
            row,
        };
        let registration = map.register_named(legacy, &name, || create(ctx, &row_ref, &name));
        note_registration(ctx, kind, &registration, legacy, &name);
        if registration.merged {
            ctx.report.count_duplicate(entity);
        } else {
            ctx.report.count_imported(entity);
        }
    }

    let c = ctx.report.counters(entity);
    ctx.report.info(
        Some(kind),
        format!(
            "{} {} rows read {}, {} imported, {} duplicates merged",
            table.rows.len(),
            kind,
            table.mode,
            c.imported,
            c.duplicates
        ),
    );
    map
}

fn note_registration(
    ctx: &mut ImportContext<'_>,
    kind: TableKind,
    registration: &Registration,
    legacy: Option<i64>,
    name: &str,
) {
    if registration.merged {
        debug!(
            "{} '{}' (legacy {:?}) merged into {}",
            kind, name, legacy, registration.id
        );
    }
    if registration.legacy_conflict {
        ctx.report.warn(
            Some(kind),
            IssueKind::DuplicateLegacyId,
            format!(
                "legacy ID {} of '{}' already used by another row, kept the first",
                legacy.unwrap_or_default(),
                name
            ),
        );
    }
}

/// Display name of a dimension row: the name column, or first and last name
/// joined.
pub(crate) fn row_name(columns: &ColumnMap, row: &DecodedRow) -> Option<String> {
    if let Some(name) = columns.text(row, NAME) {
        return Some(name);
    }
    let parts: Vec<String> = [FIRST_NAME, LAST_NAME]
        .iter()
        .filter_map(|key| columns.text(row, key))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn has_name_column(columns: &ColumnMap) -> bool {
    [NAME, FIRST_NAME, LAST_NAME]
        .iter()
        .any(|key| columns.contains(key))
}

/// Read a dimension table, switching to name-only mode when structured
/// decoding does not yield usable names.
pub(crate) fn read_dimension(
    ctx: &mut ImportContext<'_>,
    kind: TableKind,
    specs: &[ColumnSpec],
) -> Option<DimensionRows> {
    let reader = ctx.open_table(kind)?;

    let columns = ColumnMap::resolve(&reader.columns(ReadMode::Structured), specs);
    let (rows, stopped) = collect_rows(&reader, ReadMode::Structured);

    let reason = if has_name_column(&columns) {
        let nameless = rows
            .iter()
            .filter(|row| row_name(&columns, row).is_none())
            .count();
        let limit = ctx.options.name_fallback_ratio * rows.len() as f64;
        if (nameless as f64) <= limit {
            log_columns(kind, &columns);
            if let Some(e) = stopped {
                ctx.warn_truncated(kind, &reader, rows.len(), &e);
            }
            return Some(DimensionRows {
                mode: ReadMode::Structured,
                columns,
                rows,
            });
        }
        format!("{} of {} rows have no name", nameless, rows.len())
    } else {
        "no name column matched".to_string()
    };

    ctx.report
        .info(Some(kind), format!("{}, re-reading name-only", reason));
    Some(read_name_only(ctx, kind, &reader, specs))
}

fn read_name_only(
    ctx: &mut ImportContext<'_>,
    kind: TableKind,
    reader: &TableReader,
    specs: &[ColumnSpec],
) -> DimensionRows {
    // Only the ID and name columns exist in this mode.
    let specs: Vec<ColumnSpec> = specs
        .iter()
        .filter(|s| s.key == ID || s.key == NAME)
        .copied()
        .collect();
    let columns = ColumnMap::resolve(&reader.columns(ReadMode::NameOnly), &specs);
    log_columns(kind, &columns);
    let rows = ctx.read_rows(kind, reader, ReadMode::NameOnly);
    DimensionRows {
        mode: ReadMode::NameOnly,
        columns,
        rows,
    }
}

fn log_columns(kind: TableKind, columns: &ColumnMap) {
    for c in columns.iter() {
        debug!(
            "{}: {} <- field {} '{}' ({:?})",
            kind, c.key, c.field_index, c.field_name, c.matched_by
        );
    }
}
