//! Tournament, its rules document, TournamentError and PropagationWarning.

use crate::models::game::{MatchId, MatchLabel};
use crate::models::group::GroupId;
use crate::models::team::{Pool, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Lifecycle of a tournament: `Draft` until the first group is built, `Active` while
/// matches are played, `Completed` once the final has a result.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    #[serde(default)]
    pub status: TournamentStatus,
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            status: TournamentStatus::Draft,
            created_at: Utc::now(),
        }
    }
}

/// Free-text rules shown to players, one document per tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    pub tournament_id: TournamentId,
    pub content: String,
    /// `None` for the placeholder returned before any rules were saved.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Rules {
    pub const PLACEHOLDER: &'static str = "No rules defined yet.";

    pub fn placeholder(tournament_id: TournamentId) -> Self {
        Self {
            tournament_id,
            content: Self::PLACEHOLDER.to_string(),
            updated_at: None,
        }
    }
}

/// Coarse classification of [`TournamentError`], for adapters mapping to status codes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    NotReady,
    Conflict,
}

/// Errors that reject an operation. Nothing was written when one of these is returned
/// from a primary write.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TournamentError {
    /// Malformed request: wrong team count, duplicate ids, bad names, bad roster rows.
    #[error("{0}")]
    InvalidInput(String),
    #[error("team {team} is not in pool {pool}")]
    TeamNotInPool { team: TeamId, pool: Pool },
    #[error("team {0} is already competing in another group")]
    TeamBusy(TeamId),
    #[error("team {winner} is not playing in match {match_id}")]
    InvalidWinner { match_id: MatchId, winner: TeamId },
    #[error("match {0} does not have both teams yet")]
    IncompleteMatch(MatchId),
    #[error("tournament {0} not found")]
    TournamentNotFound(TournamentId),
    #[error("match {0} not found")]
    MatchNotFound(MatchId),
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error("team {0} not found")]
    TeamNotFound(TeamId),
    #[error("knockout group {group} has no {label} match")]
    KnockoutMatchMissing { group: GroupId, label: MatchLabel },
    /// Knockout stage requested before enough groups / qualifiers exist.
    #[error("{0}")]
    NotReady(String),
    #[error("{0}")]
    Conflict(String),
    /// The source match no longer holds the result being forwarded.
    #[error("match {0} has a newer result")]
    Superseded(MatchId),
}

impl TournamentError {
    pub fn kind(&self) -> ErrorKind {
        use TournamentError::*;
        match self {
            InvalidInput(_) | TeamNotInPool { .. } | TeamBusy(_) | InvalidWinner { .. }
            | IncompleteMatch(_) => ErrorKind::Validation,
            TournamentNotFound(_) | MatchNotFound(_) | GroupNotFound(_) | TeamNotFound(_)
            | KnockoutMatchMissing { .. } => ErrorKind::NotFound,
            NotReady(_) => ErrorKind::NotReady,
            Conflict(_) | Superseded(_) => ErrorKind::Conflict,
        }
    }
}

/// A downstream effect of a recorded result that could not be applied.
/// The primary write has already succeeded when one of these is reported.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum PropagationWarning {
    #[error("{source_label} points to match {target} which could not be updated: {reason}")]
    TargetUnavailable {
        source_label: MatchLabel,
        target: MatchId,
        reason: String,
    },
    #[error("match {target} has no free slot for the {source_label} result")]
    NoSlotAvailable {
        source_label: MatchLabel,
        target: MatchId,
    },
    #[error("result of {label} match {match_id} was cleared because team {displaced} was replaced")]
    DownstreamResultCleared {
        match_id: MatchId,
        label: MatchLabel,
        displaced: TeamId,
    },
    #[error("result of {label} match {match_id} was replaced while forwarding; newer result wins")]
    SourceSuperseded { match_id: MatchId, label: MatchLabel },
    #[error("rank {rank} qualifier {team} was not promoted: {reason}")]
    PromotionSkipped {
        rank: u8,
        team: TeamId,
        reason: String,
    },
}
