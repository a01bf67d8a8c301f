//! Shared fixtures: an in-memory store with one tournament and helpers to play groups.

#![allow(dead_code)]

use gsl_tournament_web::{
    build_group_bracket, record_result, Group, MatchLabel, MemoryStore, Pool, Store, Team,
    TeamId, Tournament, TournamentId,
};

pub fn store_with_tournament() -> (MemoryStore, TournamentId) {
    let store = MemoryStore::new();
    let tournament = Tournament::new("Test Cup");
    store.insert_tournament(&tournament).unwrap();
    (store, tournament.id)
}

pub fn add_teams(store: &MemoryStore, pool: Pool, n: usize) -> Vec<TeamId> {
    (0..n)
        .map(|i| {
            let team = Team::new(format!("{pool}{i}"), pool, format!("{pool}{i}a"), format!("{pool}{i}b"));
            store.insert_team(&team).unwrap();
            team.id
        })
        .collect()
}

pub fn group_of(
    store: &MemoryStore,
    tournament: TournamentId,
    name: &str,
    pool: Pool,
) -> (Group, Vec<TeamId>) {
    let teams = add_teams(store, pool, 4);
    let group = build_group_bracket(store, tournament, name, pool, &teams).unwrap();
    (group, teams)
}

pub fn match_id(store: &MemoryStore, group: &Group, label: MatchLabel) -> gsl_tournament_web::MatchId {
    store
        .find_match_by_label(group.id, label)
        .unwrap()
        .unwrap_or_else(|| panic!("no {label} match"))
        .id
}

pub fn play(store: &MemoryStore, group: &Group, label: MatchLabel, winner: TeamId) {
    let report = record_result(store, match_id(store, group, label), winner, None, None).unwrap();
    assert_eq!(report.game.winner, Some(winner));
}

/// Play a whole group so that t[0] is rank 1 and t[2] is rank 2.
///
/// M1: t0 beats t1, M2: t3 beats t2, Winners: t0 beats t3, Losers: t2 beats t1,
/// Decider: t2 beats t3.
pub fn play_group(store: &MemoryStore, group: &Group, t: &[TeamId]) {
    play(store, group, MatchLabel::M1, t[0]);
    play(store, group, MatchLabel::M2, t[3]);
    play(store, group, MatchLabel::Winners, t[0]);
    play(store, group, MatchLabel::Losers, t[2]);
    play(store, group, MatchLabel::Decider, t[2]);
}
