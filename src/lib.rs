//! GSL tournament engine: group-stage mini-brackets feeding a cross-seeded knockout stage.

pub mod config;
pub mod logic;
pub mod models;
pub mod roster;
pub mod store;

pub use logic::{
    auto_generate_groups, available_teams, build_group_bracket, build_knockout_bracket,
    get_rules, promote_qualifier, propagate, record_result, seed_slot, shuffle_seats,
    update_rules, Outcome, Placement, Rank, ResultReport, SlotWrite,
};
pub use models::{
    ErrorKind, GameMatch, Group, GroupId, MatchId, MatchLabel, MatchState, Pool,
    PropagationWarning, Rules, Slot, Team, TeamId, Tournament, TournamentError, TournamentId,
    TournamentStatus, KNOCKOUT_GROUP_NAME,
};
pub use store::{MemoryStore, Store};
