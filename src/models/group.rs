//! Group: a named container of matches (one GSL mini-bracket, or the knockout bracket).

use crate::models::game::{GameMatch, MatchLabel};
use crate::models::team::{Pool, TeamId};
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// Reserved name of the single knockout group of a tournament.
pub const KNOCKOUT_GROUP_NAME: &str = "KNOCKOUT";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub tournament_id: TournamentId,
    /// Display name ("Group 1"). Never used to infer the pool.
    pub name: String,
    /// None for the knockout group.
    pub pool: Option<Pool>,
    pub created_at: DateTime<Utc>,
    /// Loaded with the group by the store; empty on insert.
    #[serde(default)]
    pub matches: Vec<GameMatch>,
}

impl Group {
    pub fn new(tournament_id: TournamentId, name: impl Into<String>, pool: Option<Pool>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            pool,
            created_at: Utc::now(),
            matches: Vec::new(),
        }
    }

    pub fn is_knockout(&self) -> bool {
        self.pool.is_none() && self.name == KNOCKOUT_GROUP_NAME
    }

    pub fn match_by_label(&self, label: MatchLabel) -> Option<&GameMatch> {
        self.matches.iter().find(|m| m.label == label)
    }

    /// (rank-1, rank-2) qualifiers as far as they are known: winners of Winners and Decider.
    pub fn qualifiers(&self) -> (Option<TeamId>, Option<TeamId>) {
        let first = self.match_by_label(MatchLabel::Winners).and_then(|m| m.winner);
        let second = self.match_by_label(MatchLabel::Decider).and_then(|m| m.winner);
        (first, second)
    }
}
