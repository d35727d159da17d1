//! Mapping logical columns onto decoded fields.
//!
//! A column is matched by recovered field name first. When no name matches
//! (names are often synthetic), the column falls back to the N-th field of a
//! compatible type in declared order, so imports work on `FieldN` names alone.

use serde::Serialize;

use crate::format::{FieldDescriptor, FieldType, Value};
use crate::table::DecodedRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnKind {
    Integer,
    Text,
    Date,
    Logical,
}

impl ColumnKind {
    fn accepts(&self, field_type: FieldType) -> bool {
        match self {
            Self::Integer => field_type.is_integer(),
            Self::Text => field_type.is_text(),
            Self::Date => matches!(field_type, FieldType::Date | FieldType::Timestamp),
            Self::Logical => field_type == FieldType::Logical,
        }
    }
}

/// A logical column of an import schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    /// Accepted field names, compared ignoring case, spaces and underscores.
    pub names: &'static [&'static str],
    pub kind: ColumnKind,
    /// Position among fields of `kind` used when no name matches.
    /// `None` disables the positional fallback.
    pub ordinal: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchedBy {
    Name,
    Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedColumn {
    pub key: &'static str,
    pub field_index: usize,
    pub field_name: String,
    pub matched_by: MatchedBy,
}

/// Field positions for every column of a schema that could be matched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMap {
    columns: Vec<ResolvedColumn>,
}

impl ColumnMap {
    pub fn resolve(fields: &[FieldDescriptor], specs: &[ColumnSpec]) -> Self {
        let mut claimed = vec![false; fields.len()];
        let mut slots: Vec<Option<(usize, MatchedBy)>> = vec![None; specs.len()];

        for (slot, spec) in slots.iter_mut().zip(specs) {
            let found = fields.iter().enumerate().find(|(i, f)| {
                !claimed[*i]
                    && f.name_recovered
                    && spec.kind.accepts(f.field_type)
                    && spec.names.iter().any(|n| same_name(n, &f.name))
            });
            if let Some((i, _)) = found {
                claimed[i] = true;
                *slot = Some((i, MatchedBy::Name));
            }
        }

        for (slot, spec) in slots.iter_mut().zip(specs) {
            if slot.is_some() {
                continue;
            }
            let Some(ordinal) = spec.ordinal else {
                continue;
            };
            let of_kind: Vec<usize> = fields
                .iter()
                .enumerate()
                .filter(|(_, f)| spec.kind.accepts(f.field_type))
                .map(|(i, _)| i)
                .collect();
            let found = of_kind
                .iter()
                .skip(ordinal)
                .chain(of_kind.iter().take(ordinal).rev())
                .copied()
                .find(|&i| !claimed[i]);
            if let Some(i) = found {
                claimed[i] = true;
                *slot = Some((i, MatchedBy::Position));
            }
        }

        let columns = slots
            .into_iter()
            .zip(specs)
            .filter_map(|(slot, spec)| {
                slot.map(|(i, matched_by)| ResolvedColumn {
                    key: spec.key,
                    field_index: i,
                    field_name: fields[i].name.clone(),
                    matched_by,
                })
            })
            .collect();

        Self { columns }
    }

    pub fn column(&self, key: &str) -> Option<&ResolvedColumn> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.column(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedColumn> {
        self.columns.iter()
    }

    /// Value of column `key` in `row`; `None` when the column was not matched.
    pub fn value<'r>(&self, row: &'r DecodedRow, key: &str) -> Option<&'r Value> {
        self.column(key).and_then(|c| row.get_at(c.field_index))
    }

    pub fn integer(&self, row: &DecodedRow, key: &str) -> Option<i64> {
        self.value(row, key).and_then(Value::as_i64)
    }

    pub fn text(&self, row: &DecodedRow, key: &str) -> Option<String> {
        self.value(row, key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

fn same_name(a: &str, b: &str) -> bool {
    let normalize = |s: &str| -> String {
        s.chars()
            .filter(|c| !matches!(c, ' ' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect()
    };
    normalize(a) == normalize(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: FieldType, recovered: bool) -> FieldDescriptor {
        FieldDescriptor {
            field_type,
            size: 4,
            name: name.to_string(),
            name_recovered: recovered,
        }
    }

    const SPECS: &[ColumnSpec] = &[
        ColumnSpec {
            key: "id",
            names: &["ID", "MatchID"],
            kind: ColumnKind::Integer,
            ordinal: Some(0),
        },
        ColumnSpec {
            key: "home",
            names: &["HomeTeamID", "Home Team"],
            kind: ColumnKind::Integer,
            ordinal: Some(1),
        },
        ColumnSpec {
            key: "away",
            names: &["AwayTeamID"],
            kind: ColumnKind::Integer,
            ordinal: Some(2),
        },
        ColumnSpec {
            key: "played",
            names: &["Played"],
            kind: ColumnKind::Date,
            ordinal: None,
        },
    ];

    #[test]
    fn test_resolve_by_name() {
        let fields = vec![
            field("Away_Team_ID", FieldType::LongInt, true),
            field("HOME TEAM", FieldType::ShortInt, true),
            field("MatchID", FieldType::AutoIncrement, true),
        ];
        let map = ColumnMap::resolve(&fields, SPECS);
        assert_eq!(map.column("id").unwrap().field_index, 2);
        assert_eq!(map.column("home").unwrap().field_index, 1);
        assert_eq!(map.column("away").unwrap().field_index, 0);
        assert!(map.iter().all(|c| c.matched_by == MatchedBy::Name));
    }

    #[test]
    fn test_resolve_synthetic_names_positionally() {
        let fields = vec![
            field("Field1", FieldType::LongInt, false),
            field("Field2", FieldType::Date, false),
            field("Field3", FieldType::LongInt, false),
            field("Field4", FieldType::LongInt, false),
        ];
        let map = ColumnMap::resolve(&fields, SPECS);
        assert_eq!(map.column("id").unwrap().field_index, 0);
        assert_eq!(map.column("home").unwrap().field_index, 2);
        assert_eq!(map.column("away").unwrap().field_index, 3);
        assert_eq!(map.column("home").unwrap().matched_by, MatchedBy::Position);
        // Positional fallback disabled for this column.
        assert!(!map.contains("played"));
    }

    #[test]
    fn test_positional_skips_name_claimed_fields() {
        let fields = vec![
            field("Field1", FieldType::LongInt, false),
            field("ID", FieldType::LongInt, true),
            field("Field3", FieldType::LongInt, false),
        ];
        let map = ColumnMap::resolve(&fields, SPECS);
        assert_eq!(map.column("id").unwrap().field_index, 1);
        assert_eq!(map.column("home").unwrap().field_index, 2);
        assert_eq!(map.column("away").unwrap().field_index, 0);
    }

    #[test]
    fn test_type_mismatch_is_not_matched_by_name() {
        let fields = vec![field("ID", FieldType::String, true)];
        let map = ColumnMap::resolve(&fields, SPECS);
        assert!(!map.contains("id"));
    }
}
