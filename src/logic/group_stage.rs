//! Group stage: building GSL mini-brackets for 4 teams of one pool.

use crate::logic::lifecycle::advance_status;
use crate::models::{
    GameMatch, Group, MatchLabel, Pool, Team, TeamId, TournamentError, TournamentId,
    TournamentStatus, KNOCKOUT_GROUP_NAME,
};
use crate::store::Store;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Teams per GSL group.
pub const GROUP_SIZE: usize = 4;

/// Build one GSL group: M1 = t0 vs t1, M2 = t2 vs t3, then Winners, Losers and Decider.
///
/// Teams are seated in the given order; use [`shuffle_seats`] first for a random draw.
/// Fails if the ids are not 4 distinct teams of `pool` that have never played a match.
pub fn build_group_bracket<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    name: &str,
    pool: Pool,
    team_ids: &[TeamId],
) -> Result<Group, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::InvalidInput("Group name is required".into()));
    }
    if name.eq_ignore_ascii_case(KNOCKOUT_GROUP_NAME) {
        return Err(TournamentError::InvalidInput(format!(
            "'{KNOCKOUT_GROUP_NAME}' is reserved for the knockout stage"
        )));
    }
    if team_ids.len() != GROUP_SIZE {
        return Err(TournamentError::InvalidInput(format!(
            "Group must have exactly {GROUP_SIZE} teams (got {})",
            team_ids.len()
        )));
    }
    let distinct: HashSet<_> = team_ids.iter().collect();
    if distinct.len() != GROUP_SIZE {
        return Err(TournamentError::InvalidInput(
            "Group teams must be distinct".into(),
        ));
    }

    store.get_tournament(tournament_id)?;
    for &id in team_ids {
        let team = store.get_team(id)?;
        if team.pool != pool {
            return Err(TournamentError::TeamNotInPool { team: id, pool });
        }
    }
    if store.count_matches_referencing_teams(team_ids)? > 0 {
        for &id in team_ids {
            if store.count_matches_referencing_teams(&[id])? > 0 {
                return Err(TournamentError::TeamBusy(id));
            }
        }
    }

    let mut group = Group::new(tournament_id, name, Some(pool));
    group.matches = gsl_matches(&group, team_ids);
    store.insert_group_with_matches(&group)?;
    advance_status(store, tournament_id, TournamentStatus::Active)?;
    log::info!(
        "Created group '{}' ({}) in pool {} with {} matches",
        group.name,
        group.id,
        pool,
        group.matches.len()
    );
    Ok(group)
}

/// The five matches of a GSL group, targets first so forward pointers are known.
fn gsl_matches(group: &Group, t: &[TeamId]) -> Vec<GameMatch> {
    let decider = GameMatch::new(group.id, MatchLabel::Decider);
    let winners = GameMatch::new(group.id, MatchLabel::Winners).with_next(None, Some(decider.id));
    let losers = GameMatch::new(group.id, MatchLabel::Losers).with_next(Some(decider.id), None);
    let m1 = GameMatch::new(group.id, MatchLabel::M1)
        .with_teams(t[0], t[1])
        .with_next(Some(winners.id), Some(losers.id));
    let m2 = GameMatch::new(group.id, MatchLabel::M2)
        .with_teams(t[2], t[3])
        .with_next(Some(winners.id), Some(losers.id));
    vec![decider, winners, losers, m1, m2]
}

/// Shuffle team seats in place with the given randomness source.
pub fn shuffle_seats<R: Rng + ?Sized>(team_ids: &mut [TeamId], rng: &mut R) {
    team_ids.shuffle(rng);
}

/// Teams of `pool` that no match references yet, oldest first.
pub fn available_teams<S: Store + ?Sized>(
    store: &S,
    pool: Pool,
) -> Result<Vec<Team>, TournamentError> {
    let mut available = Vec::new();
    for team in store.list_teams(Some(pool))? {
        if store.count_matches_referencing_teams(&[team.id])? == 0 {
            available.push(team);
        }
    }
    Ok(available)
}

/// Split every available team of `pool` into randomly seated groups of 4.
///
/// Groups are named "<prefix> <n>" (prefix defaults to "Group"), numbered after the
/// tournament's existing groups. Fails without creating anything if the number of
/// available teams is zero or not a multiple of 4.
pub fn auto_generate_groups<S: Store + ?Sized, R: Rng + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    pool: Pool,
    name_prefix: Option<&str>,
    rng: &mut R,
) -> Result<Vec<Group>, TournamentError> {
    store.get_tournament(tournament_id)?;
    let mut ids: Vec<TeamId> = available_teams(store, pool)?.iter().map(|t| t.id).collect();
    if ids.is_empty() {
        return Err(TournamentError::InvalidInput(format!(
            "No available teams in pool {pool}"
        )));
    }
    if ids.len() % GROUP_SIZE != 0 {
        return Err(TournamentError::InvalidInput(format!(
            "Cannot auto-generate: {} teams available, but groups must have exactly {GROUP_SIZE} teams",
            ids.len()
        )));
    }

    let prefix = name_prefix
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("Group");
    let existing = store
        .list_groups_by_tournament(tournament_id)?
        .iter()
        .filter(|g| !g.is_knockout())
        .count();

    shuffle_seats(&mut ids, rng);
    let mut groups = Vec::with_capacity(ids.len() / GROUP_SIZE);
    for (i, seats) in ids.chunks_exact(GROUP_SIZE).enumerate() {
        let name = format!("{prefix} {}", existing + i + 1);
        groups.push(build_group_bracket(store, tournament_id, &name, pool, seats)?);
    }
    log::info!("Auto-generated {} group(s) for pool {}", groups.len(), pool);
    Ok(groups)
}
