//! Fact stage: fixtures, singles frames and the doubles count.
//!
//! Fact tables are always read structured. A foreign key that does not
//! resolve is replaced by a known identity chosen by row index, so every
//! readable row lands in the dataset.

use crate::dataset::{EntityId, EntityKind, Fixture, FrameResult, Side};
use crate::import::files::TableKind;
use crate::import::identity::{DimensionMaps, IdentityMap};
use crate::import::pipeline::ImportContext;
use crate::import::report::IssueKind;
use crate::import::schema::{
    AWAY_PLAYER, AWAY_SCORE, AWAY_TEAM, DATE, DIVISION, FRAME, HOME_PLAYER, HOME_SCORE,
    HOME_TEAM, HOME_WON, ID, MATCH, MATCH_COLUMNS, SINGLE_COLUMNS, WINNER,
};
use crate::table::{ColumnMap, DecodedRow, ReadMode};

pub(crate) fn import_facts(ctx: &mut ImportContext<'_>, maps: &DimensionMaps) {
    let fixtures = import_matches(ctx, maps);
    import_singles(ctx, maps, &fixtures);
    count_doubles(ctx);
}

/// How a foreign key was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference {
    Resolved(EntityId),
    Fallback(EntityId),
    /// Nothing to fall back to.
    Missing,
}

impl Reference {
    fn id(self) -> Option<EntityId> {
        match self {
            Self::Resolved(id) | Self::Fallback(id) => Some(id),
            Self::Missing => None,
        }
    }
}

/// Look up column `key` of `row` in `target`. `fallback` picks the stand-in
/// identity when the key is null or unknown.
fn resolve_key<F>(
    ctx: &mut ImportContext<'_>,
    kind: TableKind,
    columns: &ColumnMap,
    row: &DecodedRow,
    key: &str,
    target: &IdentityMap,
    fallback: F,
) -> Reference
where
    F: FnOnce(&IdentityMap) -> Option<EntityId>,
{
    let legacy = columns.integer(row, key);
    if let Some(id) = legacy.and_then(|legacy| target.resolve(legacy)) {
        return Reference::Resolved(id);
    }
    let Some(id) = fallback(target) else {
        return Reference::Missing;
    };
    let wanted = legacy.map_or_else(|| "null".to_string(), |l| l.to_string());
    ctx.report.warn(
        Some(kind),
        IssueKind::UnresolvedForeignKey,
        format!(
            "record {}: {} {} not found, assigned {} by position",
            row.index(),
            key,
            wanted,
            id
        ),
    );
    Reference::Fallback(id)
}

/// Resolve a home/away key pair against `target`. A side that falls back
/// avoids the other side's identity when another one exists.
fn resolve_sides(
    ctx: &mut ImportContext<'_>,
    kind: TableKind,
    columns: &ColumnMap,
    row: &DecodedRow,
    home_key: &str,
    away_key: &str,
    target: &IdentityMap,
) -> Option<(EntityId, EntityId)> {
    let i = row.index();
    let known_away = columns
        .integer(row, away_key)
        .and_then(|legacy| target.resolve(legacy));
    let home = resolve_key(ctx, kind, columns, row, home_key, target, |t| match known_away {
        Some(away) => t.cycle_excluding(i, away),
        None => t.cycle(i),
    })
    .id()?;
    let away = resolve_key(ctx, kind, columns, row, away_key, target, |t| {
        t.cycle_excluding(i + 1, home)
    })
    .id()?;
    Some((home, away))
}

fn skip_row(ctx: &mut ImportContext<'_>, kind: TableKind, row: &DecodedRow, missing: &str) {
    ctx.report.warn(
        Some(kind),
        IssueKind::SkippedRow,
        format!("record {} skipped: no {} imported", row.index(), missing),
    );
}

fn import_matches(ctx: &mut ImportContext<'_>, maps: &DimensionMaps) -> IdentityMap {
    let kind = TableKind::Match;
    let mut fixtures = IdentityMap::new();
    let Some(reader) = ctx.open_table(kind) else {
        return fixtures;
    };
    let columns = ColumnMap::resolve(&reader.columns(ReadMode::Structured), MATCH_COLUMNS);
    let rows = ctx.read_rows(kind, &reader, ReadMode::Structured);

    for row in &rows {
        let i = row.index();
        let Some((home, away)) =
            resolve_sides(ctx, kind, &columns, row, HOME_TEAM, AWAY_TEAM, &maps.teams)
        else {
            skip_row(ctx, kind, row, "team");
            continue;
        };

        let division = if columns.integer(row, DIVISION).is_some() {
            resolve_key(ctx, kind, &columns, row, DIVISION, &maps.divisions, |d| d.cycle(i)).id()
        } else {
            ctx.dataset.team(home).and_then(|t| t.division)
        };

        let fixture = Fixture {
            id: EntityId(0),
            date: columns.value(row, DATE).and_then(|v| v.as_date()),
            division,
            home_team: home,
            away_team: away,
            home_score: columns.integer(row, HOME_SCORE),
            away_score: columns.integer(row, AWAY_SCORE),
        };
        let id = ctx.dataset.add_fixture(fixture);
        let legacy = columns.integer(row, ID);
        if !fixtures.register(legacy, id) {
            ctx.report.warn(
                Some(kind),
                IssueKind::DuplicateLegacyId,
                format!(
                    "record {}: match ID {} already used, frames resolve to the first",
                    i,
                    legacy.unwrap_or_default()
                ),
            );
        }
        ctx.report.count_imported(EntityKind::Fixture);
    }

    ctx.report.info(
        Some(kind),
        format!("{} fixtures imported from {} rows", fixtures.len(), rows.len()),
    );
    fixtures
}

fn winner(columns: &ColumnMap, row: &DecodedRow) -> Option<Side> {
    match columns.integer(row, WINNER) {
        Some(1) => return Some(Side::Home),
        Some(2) => return Some(Side::Away),
        _ => {}
    }
    columns
        .value(row, HOME_WON)
        .and_then(|v| v.as_bool())
        .map(|home| if home { Side::Home } else { Side::Away })
}

fn import_singles(ctx: &mut ImportContext<'_>, maps: &DimensionMaps, fixtures: &IdentityMap) {
    let kind = TableKind::Single;
    let Some(reader) = ctx.open_table(kind) else {
        return;
    };
    let columns = ColumnMap::resolve(&reader.columns(ReadMode::Structured), SINGLE_COLUMNS);
    let rows = ctx.read_rows(kind, &reader, ReadMode::Structured);

    let mut imported = 0usize;
    for row in &rows {
        let i = row.index();
        let Some(fixture) = resolve_key(ctx, kind, &columns, row, MATCH, fixtures, |f| f.cycle(i)).id()
        else {
            skip_row(ctx, kind, row, "fixture");
            continue;
        };
        let Some((home, away)) =
            resolve_sides(ctx, kind, &columns, row, HOME_PLAYER, AWAY_PLAYER, &maps.players)
        else {
            skip_row(ctx, kind, row, "player");
            continue;
        };

        ctx.dataset.add_frame(FrameResult {
            id: EntityId(0),
            fixture,
            frame_number: columns.integer(row, FRAME),
            home_player: home,
            away_player: away,
            winner: winner(&columns, row),
        });
        ctx.report.count_imported(EntityKind::FrameResult);
        imported += 1;
    }

    ctx.report.info(
        Some(kind),
        format!("{} frames imported from {} rows", imported, rows.len()),
    );
}

/// Doubles frames only contribute a count.
fn count_doubles(ctx: &mut ImportContext<'_>) {
    let kind = TableKind::Doubles;
    let Some(reader) = ctx.open_table(kind) else {
        return;
    };
    let rows = ctx.read_rows(kind, &reader, ReadMode::Structured);
    ctx.dataset.doubles_frames = u32::try_from(rows.len()).unwrap_or(u32::MAX);
    ctx.report
        .info(Some(kind), format!("{} doubles frames counted", rows.len()));
}
