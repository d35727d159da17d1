//! Logical columns of each source table.
//!
//! Name lists cover the spellings seen across versions of the legacy
//! application. Ordinals give the positional fallback among fields of the same
//! kind when names were not recovered.

use crate::table::{ColumnKind, ColumnSpec};

pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const FIRST_NAME: &str = "first_name";
pub const LAST_NAME: &str = "last_name";
pub const DIVISION: &str = "division";
pub const VENUE: &str = "venue";
pub const TEAM: &str = "team";
pub const DATE: &str = "date";
pub const HOME_TEAM: &str = "home_team";
pub const AWAY_TEAM: &str = "away_team";
pub const HOME_SCORE: &str = "home_score";
pub const AWAY_SCORE: &str = "away_score";
pub const MATCH: &str = "match";
pub const FRAME: &str = "frame";
pub const HOME_PLAYER: &str = "home_player";
pub const AWAY_PLAYER: &str = "away_player";
pub const WINNER: &str = "winner";
pub const HOME_WON: &str = "home_won";

const fn int(key: &'static str, names: &'static [&'static str], ordinal: Option<usize>) -> ColumnSpec {
    ColumnSpec {
        key,
        names,
        kind: ColumnKind::Integer,
        ordinal,
    }
}

const fn text(key: &'static str, names: &'static [&'static str], ordinal: Option<usize>) -> ColumnSpec {
    ColumnSpec {
        key,
        names,
        kind: ColumnKind::Text,
        ordinal,
    }
}

pub const DIVISION_COLUMNS: &[ColumnSpec] = &[
    int(ID, &["ID", "DivisionID", "DivID", "DivNo"], Some(0)),
    text(NAME, &["Name", "Division", "DivisionName", "Description"], Some(0)),
];

pub const VENUE_COLUMNS: &[ColumnSpec] = &[
    int(ID, &["ID", "VenueID", "VenueNo"], Some(0)),
    text(NAME, &["Name", "Venue", "VenueName"], Some(0)),
];

pub const TEAM_COLUMNS: &[ColumnSpec] = &[
    int(ID, &["ID", "TeamID", "TeamNo"], Some(0)),
    text(NAME, &["Name", "Team", "TeamName"], Some(0)),
    int(DIVISION, &["DivisionID", "Division", "DivID", "DivNo"], Some(1)),
    int(VENUE, &["VenueID", "Venue", "VenueNo"], Some(2)),
];

pub const PLAYER_COLUMNS: &[ColumnSpec] = &[
    int(ID, &["ID", "PlayerID", "PlayerNo"], Some(0)),
    text(NAME, &["Name", "PlayerName", "FullName"], Some(0)),
    text(FIRST_NAME, &["FirstName", "Forename"], None),
    text(LAST_NAME, &["LastName", "Surname"], None),
    int(TEAM, &["TeamID", "Team", "TeamNo"], Some(1)),
];

pub const MATCH_COLUMNS: &[ColumnSpec] = &[
    int(ID, &["ID", "MatchID", "MatchNo"], Some(0)),
    ColumnSpec {
        key: DATE,
        names: &["Date", "MatchDate", "Played", "PlayedOn"],
        kind: ColumnKind::Date,
        ordinal: Some(0),
    },
    int(HOME_TEAM, &["HomeTeamID", "HomeTeam", "Home", "HomeID"], Some(1)),
    int(AWAY_TEAM, &["AwayTeamID", "AwayTeam", "Away", "AwayID"], Some(2)),
    int(HOME_SCORE, &["HomeScore", "HomeFrames", "HomePoints"], Some(3)),
    int(AWAY_SCORE, &["AwayScore", "AwayFrames", "AwayPoints"], Some(4)),
    int(DIVISION, &["DivisionID", "Division", "DivID"], None),
];

pub const SINGLE_COLUMNS: &[ColumnSpec] = &[
    int(ID, &["ID", "SingleID", "FrameID"], Some(0)),
    int(MATCH, &["MatchID", "Match", "MatchNo"], Some(1)),
    int(HOME_PLAYER, &["HomePlayerID", "HomePlayer", "Player1"], Some(2)),
    int(AWAY_PLAYER, &["AwayPlayerID", "AwayPlayer", "Player2"], Some(3)),
    int(FRAME, &["FrameNo", "Frame", "FrameNumber"], None),
    int(WINNER, &["Winner", "WinnerSide", "WonBy"], None),
    ColumnSpec {
        key: HOME_WON,
        names: &["HomeWon", "HomeWin"],
        kind: ColumnKind::Logical,
        ordinal: Some(0),
    },
];
