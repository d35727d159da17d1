//! Destination shape for imported league data.
//!
//! Only the identity and reference structure matters here; the league
//! application maps these records onto its own model. Legacy IDs never appear
//! in the dataset.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

/// Identity of an entity within its kind, assigned in insertion order from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
pub enum EntityKind {
    Division,
    Venue,
    Team,
    Player,
    Fixture,
    FrameResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    pub id: EntityId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: EntityId,
    pub name: String,
    pub division: Option<EntityId>,
    pub venue: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub name: String,
    pub team: Option<EntityId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: EntityId,
    pub date: Option<NaiveDate>,
    pub division: Option<EntityId>,
    pub home_team: EntityId,
    pub away_team: EntityId,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameResult {
    pub id: EntityId,
    pub fixture: EntityId,
    pub frame_number: Option<i64>,
    pub home_player: EntityId,
    pub away_player: EntityId,
    pub winner: Option<Side>,
}

/// Everything produced by one import run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub season: Season,
    pub divisions: Vec<Division>,
    pub venues: Vec<Venue>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub fixtures: Vec<Fixture>,
    pub frames: Vec<FrameResult>,
    /// Doubles frames seen in the source; they are counted, not expanded.
    pub doubles_frames: u32,
}

fn next_id(len: usize) -> EntityId {
    EntityId(len as u32 + 1)
}

impl Dataset {
    pub fn new(season_name: impl Into<String>) -> Self {
        Self {
            season: Season {
                name: season_name.into(),
                start_date: None,
                end_date: None,
            },
            divisions: Vec::new(),
            venues: Vec::new(),
            teams: Vec::new(),
            players: Vec::new(),
            fixtures: Vec::new(),
            frames: Vec::new(),
            doubles_frames: 0,
        }
    }

    pub fn add_division(&mut self, name: &str) -> EntityId {
        let id = next_id(self.divisions.len());
        self.divisions.push(Division {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_venue(&mut self, name: &str) -> EntityId {
        let id = next_id(self.venues.len());
        self.venues.push(Venue {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn add_team(
        &mut self,
        name: &str,
        division: Option<EntityId>,
        venue: Option<EntityId>,
    ) -> EntityId {
        let id = next_id(self.teams.len());
        self.teams.push(Team {
            id,
            name: name.to_string(),
            division,
            venue,
        });
        id
    }

    pub fn add_player(&mut self, name: &str, team: Option<EntityId>) -> EntityId {
        let id = next_id(self.players.len());
        self.players.push(Player {
            id,
            name: name.to_string(),
            team,
        });
        id
    }

    /// Adds a fixture; the `id` field of `fixture` is replaced.
    pub fn add_fixture(&mut self, mut fixture: Fixture) -> EntityId {
        let id = next_id(self.fixtures.len());
        fixture.id = id;
        self.fixtures.push(fixture);
        id
    }

    /// Adds a frame result; the `id` field of `frame` is replaced.
    pub fn add_frame(&mut self, mut frame: FrameResult) -> EntityId {
        let id = next_id(self.frames.len());
        frame.id = id;
        self.frames.push(frame);
        id
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Division => self.divisions.len(),
            EntityKind::Venue => self.venues.len(),
            EntityKind::Team => self.teams.len(),
            EntityKind::Player => self.players.len(),
            EntityKind::Fixture => self.fixtures.len(),
            EntityKind::FrameResult => self.frames.len(),
        }
    }

    pub fn team(&self, id: EntityId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn team_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Earliest and latest dated fixture.
    pub fn fixture_date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.fixtures.iter().filter_map(|f| f.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }
}
