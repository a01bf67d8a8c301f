//! Data structures for the tournament: teams, groups, matches, errors.

mod game;
mod group;
mod team;
mod tournament;

pub use game::{GameMatch, MatchId, MatchLabel, MatchState, Slot};
pub use group::{Group, GroupId, KNOCKOUT_GROUP_NAME};
pub use team::{Pool, Team, TeamId};
pub use tournament::{
    ErrorKind, PropagationWarning, Rules, Tournament, TournamentError, TournamentId,
    TournamentStatus,
};
