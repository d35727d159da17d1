//! Locating each table kind's file in an import directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::dataset::EntityKind;
use crate::error::{Error, Result};

/// Source tables, in import order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, IntoStaticStr, Serialize,
)]
pub enum TableKind {
    Division,
    Venue,
    Team,
    Player,
    Match,
    Single,
    Doubles,
}

impl TableKind {
    /// Conventional file name written by the legacy application.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Division => "Division.DB",
            Self::Venue => "Venue.DB",
            Self::Team => "Team.DB",
            Self::Player => "Player.DB",
            Self::Match => "Match.DB",
            Self::Single => "Single.DB",
            Self::Doubles => "Dbls.DB",
        }
    }

    /// Stems accepted when scanning for a non-conventional file name.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Division => &["division", "div"],
            Self::Venue => &["venue"],
            Self::Team => &["team"],
            Self::Player => &["player"],
            Self::Match => &["match", "fixture"],
            Self::Single => &["single"],
            Self::Doubles => &["dbls", "double"],
        }
    }

    pub fn is_dimension(&self) -> bool {
        matches!(self, Self::Division | Self::Venue | Self::Team | Self::Player)
    }

    /// Destination entity kind, if rows of this table become entities.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            Self::Division => Some(EntityKind::Division),
            Self::Venue => Some(EntityKind::Venue),
            Self::Team => Some(EntityKind::Team),
            Self::Player => Some(EntityKind::Player),
            Self::Match => Some(EntityKind::Fixture),
            Self::Single => Some(EntityKind::FrameResult),
            Self::Doubles => None,
        }
    }
}

/// The table files found in one directory.
#[derive(Debug, Clone, Default)]
pub struct TableFiles {
    found: HashMap<TableKind, PathBuf>,
}

impl TableFiles {
    /// List `dir` and match every table kind against its file names.
    ///
    /// # Errors
    ///
    /// [`Error::UnrecoverableIo`] when the directory cannot be listed.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut names = Vec::new();
        let entries = fs::read_dir(dir).map_err(|e| Error::unrecoverable_io(dir, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| Error::unrecoverable_io(dir, e))?;
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(Self::match_names(dir, &names))
    }

    fn match_names(dir: &Path, names: &[String]) -> Self {
        let mut found = HashMap::new();
        let mut claimed = vec![false; names.len()];

        for kind in TableKind::iter() {
            if let Some(i) = names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(kind.file_name()))
            {
                claimed[i] = true;
                found.insert(kind, dir.join(&names[i]));
            }
        }

        for kind in TableKind::iter() {
            if found.contains_key(&kind) {
                continue;
            }
            let candidate = names.iter().enumerate().find(|(i, name)| {
                !claimed[*i] && is_db_file(name) && {
                    let stem = stem_lowercase(name);
                    kind.aliases().iter().any(|alias| stem.contains(alias))
                }
            });
            if let Some((i, name)) = candidate {
                claimed[i] = true;
                found.insert(kind, dir.join(name));
            }
        }

        Self { found }
    }

    pub fn get(&self, kind: TableKind) -> Option<&Path> {
        self.found.get(&kind).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.found.len()
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}

fn is_db_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("db"))
}

fn stem_lowercase(name: &str) -> String {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}
