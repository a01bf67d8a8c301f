//! Match (game), its topology label, slots and lifecycle state.

use crate::models::group::GroupId;
use crate::models::team::TeamId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Position of a match inside its bracket template.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub enum MatchLabel {
    M1,
    M2,
    Winners,
    Losers,
    Decider,
    #[serde(rename = "SF1")]
    Sf1,
    #[serde(rename = "SF2")]
    Sf2,
    Bronze,
    Final,
}

impl MatchLabel {
    /// Round number inside the template. Forward pointers always go to a higher round.
    pub fn round(self) -> u8 {
        use MatchLabel::*;
        match self {
            M1 | M2 | Sf1 | Sf2 => 1,
            Winners | Losers | Bronze | Final => 2,
            Decider => 3,
        }
    }

    pub fn is_knockout(self) -> bool {
        matches!(
            self,
            MatchLabel::Sf1 | MatchLabel::Sf2 | MatchLabel::Bronze | MatchLabel::Final
        )
    }
}

impl fmt::Display for MatchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchLabel::M1 => "M1",
            MatchLabel::M2 => "M2",
            MatchLabel::Winners => "Winners",
            MatchLabel::Losers => "Losers",
            MatchLabel::Decider => "Decider",
            MatchLabel::Sf1 => "SF1",
            MatchLabel::Sf2 => "SF2",
            MatchLabel::Bronze => "Bronze",
            MatchLabel::Final => "Final",
        };
        f.write_str(s)
    }
}

/// One of the two team positions in a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    A,
    B,
}

/// Lifecycle of a match.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// No slot filled yet.
    #[default]
    Empty,
    /// One or both slots filled.
    Seeded,
    /// Winner recorded, downstream not yet updated.
    Played,
    /// Downstream writes attempted (success or reported warning).
    Propagated,
    /// Group-terminal match whose winner went through promotion.
    Promoted,
}

/// A single match between two team slots.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub group_id: GroupId,
    pub label: MatchLabel,
    pub team_a: Option<TeamId>,
    pub team_b: Option<TeamId>,
    /// None if not yet played. Always one of `team_a` / `team_b`.
    pub winner: Option<TeamId>,
    /// Free-form, e.g. "21-19, 21-18".
    pub score: Option<String>,
    pub video_url: Option<String>,
    pub played_at: Option<DateTime<Utc>>,
    pub next_on_win: Option<MatchId>,
    pub next_on_lose: Option<MatchId>,
    pub state: MatchState,
}

impl GameMatch {
    pub fn new(group_id: GroupId, label: MatchLabel) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            label,
            team_a: None,
            team_b: None,
            winner: None,
            score: None,
            video_url: None,
            played_at: None,
            next_on_win: None,
            next_on_lose: None,
            state: MatchState::Empty,
        }
    }

    /// Builder-style: seed both slots (opening matches).
    pub fn with_teams(mut self, team_a: TeamId, team_b: TeamId) -> Self {
        self.team_a = Some(team_a);
        self.team_b = Some(team_b);
        self.state = MatchState::Seeded;
        self
    }

    /// Builder-style: forward pointers.
    pub fn with_next(mut self, on_win: Option<MatchId>, on_lose: Option<MatchId>) -> Self {
        self.next_on_win = on_win;
        self.next_on_lose = on_lose;
        self
    }

    pub fn slot(&self, slot: Slot) -> Option<TeamId> {
        match slot {
            Slot::A => self.team_a,
            Slot::B => self.team_b,
        }
    }

    /// First slot with no occupant, A before B.
    pub fn first_empty_slot(&self) -> Option<Slot> {
        if self.team_a.is_none() {
            Some(Slot::A)
        } else if self.team_b.is_none() {
            Some(Slot::B)
        } else {
            None
        }
    }

    pub fn has_team(&self, team: TeamId) -> bool {
        self.team_a == Some(team) || self.team_b == Some(team)
    }

    /// The occupant of the other slot, given one occupant.
    pub fn opponent_of(&self, team: TeamId) -> Option<TeamId> {
        if self.team_a == Some(team) {
            self.team_b
        } else if self.team_b == Some(team) {
            self.team_a
        } else {
            None
        }
    }

    /// Write `team` into `slot`, replacing any prior occupant. Returns the displaced team.
    ///
    /// If the displaced team was this match's recorded winner, the result is cleared so
    /// the winner always stays one of the occupants.
    pub fn fill_slot(&mut self, slot: Slot, team: TeamId) -> Option<TeamId> {
        let target = match slot {
            Slot::A => &mut self.team_a,
            Slot::B => &mut self.team_b,
        };
        let previous = target.replace(team);
        if let Some(prev) = previous {
            if prev != team && self.winner == Some(prev) {
                self.clear_result();
            }
        }
        if self.state == MatchState::Empty {
            self.state = MatchState::Seeded;
        }
        previous
    }

    /// Record the outcome. Caller has validated `winner` against the slots.
    pub fn set_result(&mut self, winner: TeamId, score: Option<String>, video_url: Option<String>) {
        self.winner = Some(winner);
        self.score = score;
        self.video_url = video_url;
        self.played_at = Some(Utc::now());
        self.state = MatchState::Played;
    }

    fn clear_result(&mut self) {
        self.winner = None;
        self.score = None;
        self.video_url = None;
        self.played_at = None;
        self.state = MatchState::Seeded;
    }

    pub fn is_played(&self) -> bool {
        self.winner.is_some()
    }
}
