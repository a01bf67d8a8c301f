//! Storage collaborator used by the bracket logic.
//!
//! The logic never holds a match across two store calls when it mutates it: every slot or
//! result write goes through [`Store::update_match`], which runs the mutation under the
//! store's own lock (load, mutate, write back) so concurrent corrections cannot lose updates.

mod memory;

pub use memory::MemoryStore;

use crate::models::{
    GameMatch, Group, GroupId, MatchId, MatchLabel, Pool, Rules, Team, TeamId, Tournament,
    TournamentError, TournamentId,
};

/// Mutation applied by [`Store::update_match`]. Returning an error aborts the write.
pub type MatchMutation<'a> = &'a mut dyn FnMut(&mut GameMatch) -> Result<(), TournamentError>;

/// Mutation applied by [`Store::update_match_from`]: reads the source match, writes the
/// target. Returning an error aborts the write.
pub type LinkedMutation<'a> =
    &'a mut dyn FnMut(&GameMatch, &mut GameMatch) -> Result<(), TournamentError>;

/// Mutation applied by [`Store::update_tournament`].
pub type TournamentMutation<'a> =
    &'a mut dyn FnMut(&mut Tournament) -> Result<(), TournamentError>;

pub trait Store {
    fn insert_tournament(&self, tournament: &Tournament) -> Result<(), TournamentError>;
    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError>;
    /// Locked read-modify-write of one tournament row.
    fn update_tournament(
        &self,
        id: TournamentId,
        mutate: TournamentMutation<'_>,
    ) -> Result<Tournament, TournamentError>;

    /// Rules document of a tournament, if one was ever saved.
    fn get_rules(&self, tournament_id: TournamentId) -> Result<Option<Rules>, TournamentError>;
    /// Insert or replace the rules document of `rules.tournament_id`.
    fn put_rules(&self, rules: &Rules) -> Result<(), TournamentError>;

    fn insert_team(&self, team: &Team) -> Result<(), TournamentError>;
    fn get_team(&self, id: TeamId) -> Result<Team, TournamentError>;
    /// All teams, optionally restricted to one pool, oldest first.
    fn list_teams(&self, pool: Option<Pool>) -> Result<Vec<Team>, TournamentError>;
    /// Number of matches with any of `ids` in slot A or B.
    fn count_matches_referencing_teams(&self, ids: &[TeamId]) -> Result<usize, TournamentError>;

    /// Insert a group row (its `matches` are ignored). Fails with `Conflict` when the
    /// tournament already has a group with the same name.
    fn insert_group(&self, group: &Group) -> Result<(), TournamentError>;
    /// Insert a group row together with `group.matches`, all or nothing. Readers never see
    /// the group without its matches. Same `Conflict` rule as [`Store::insert_group`].
    fn insert_group_with_matches(&self, group: &Group) -> Result<(), TournamentError>;
    /// Group with its matches loaded.
    fn get_group(&self, id: GroupId) -> Result<Group, TournamentError>;
    /// Groups of a tournament with their matches, ordered by name.
    fn list_groups_by_tournament(&self, id: TournamentId) -> Result<Vec<Group>, TournamentError>;
    fn find_group_by_name(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> Result<Option<Group>, TournamentError>;

    fn insert_match(&self, game: &GameMatch) -> Result<(), TournamentError>;
    fn get_match(&self, id: MatchId) -> Result<GameMatch, TournamentError>;
    fn find_match_by_label(
        &self,
        group_id: GroupId,
        label: MatchLabel,
    ) -> Result<Option<GameMatch>, TournamentError>;
    /// Full overwrite of an existing match row.
    fn save_match(&self, game: &GameMatch) -> Result<(), TournamentError>;
    /// Locked read-modify-write of one match. Returns the match as written.
    ///
    /// The mutation must not call back into the store.
    fn update_match(&self, id: MatchId, mutate: MatchMutation<'_>) -> Result<GameMatch, TournamentError>;
    /// Like [`Store::update_match`] on `target`, with `source` read under the same lock so
    /// the mutation can check that the source still holds the result being forwarded.
    fn update_match_from(
        &self,
        source: MatchId,
        target: MatchId,
        mutate: LinkedMutation<'_>,
    ) -> Result<GameMatch, TournamentError>;
}
