//! Knockout stage: semifinals, bronze match and final, cross-seeded from group qualifiers.

use crate::logic::template::{seed_slot, Rank};
use crate::models::{
    GameMatch, Group, MatchLabel, Pool, TeamId, TournamentError, TournamentId,
    KNOCKOUT_GROUP_NAME,
};
use crate::store::Store;

/// How much of the group stage must be finished before the knockout group may be created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Readiness {
    /// Both qualifiers known in every pool (explicit build request).
    AllQualifiers,
    /// Every pool has a group; missing qualifiers leave empty slots (auto-build on promotion).
    GroupsOnly,
}

/// Create the knockout bracket of a tournament, or return the existing one unchanged.
///
/// Needs, for each pool, a group whose rank-1 and rank-2 qualifiers are decided.
pub fn build_knockout_bracket<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<Group, TournamentError> {
    ensure_knockout(store, tournament_id, Readiness::AllQualifiers).map(|(group, _)| group)
}

/// Qualifiers known so far, one group per pool (first group of the pool by name).
pub fn known_qualifiers(groups: &[Group]) -> Vec<(Pool, Rank, TeamId)> {
    let mut seeds = Vec::new();
    for pool in Pool::ALL {
        let Some(group) = seeding_group(groups, pool) else {
            continue;
        };
        let (first, second) = group.qualifiers();
        if let Some(team) = first {
            seeds.push((pool, Rank::First, team));
        }
        if let Some(team) = second {
            seeds.push((pool, Rank::Second, team));
        }
    }
    seeds
}

fn seeding_group(groups: &[Group], pool: Pool) -> Option<&Group> {
    groups
        .iter()
        .filter(|g| g.pool == Some(pool))
        .min_by(|a, b| a.name.cmp(&b.name))
}

fn check_ready(groups: &[Group], readiness: Readiness) -> Result<(), TournamentError> {
    if groups.len() < 2 {
        return Err(TournamentError::NotReady(
            "Need at least 2 groups to generate knockout".into(),
        ));
    }
    for pool in Pool::ALL {
        let group = seeding_group(groups, pool).ok_or_else(|| {
            TournamentError::NotReady(format!("Pool {pool} has no group yet"))
        })?;
        if readiness == Readiness::AllQualifiers {
            if let (Some(_), Some(_)) = group.qualifiers() {
                continue;
            }
            return Err(TournamentError::NotReady(format!(
                "Group '{}' (pool {pool}) has not decided both qualifiers",
                group.name
            )));
        }
    }
    Ok(())
}

/// Knockout group of the tournament, building it if absent. The flag is true only when
/// this call inserted the group.
pub(crate) fn ensure_knockout<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    readiness: Readiness,
) -> Result<(Group, bool), TournamentError> {
    if let Some(existing) = store.find_group_by_name(tournament_id, KNOCKOUT_GROUP_NAME)? {
        log::debug!("Knockout group {} already exists", existing.id);
        return Ok((existing, false));
    }
    store.get_tournament(tournament_id)?;

    let groups: Vec<Group> = store
        .list_groups_by_tournament(tournament_id)?
        .into_iter()
        .filter(|g| !g.is_knockout())
        .collect();
    check_ready(&groups, readiness)?;

    let mut knockout = Group::new(tournament_id, KNOCKOUT_GROUP_NAME, None);
    let final_match = GameMatch::new(knockout.id, MatchLabel::Final);
    let bronze = GameMatch::new(knockout.id, MatchLabel::Bronze);
    let mut sf1 = GameMatch::new(knockout.id, MatchLabel::Sf1)
        .with_next(Some(final_match.id), Some(bronze.id));
    let mut sf2 = GameMatch::new(knockout.id, MatchLabel::Sf2)
        .with_next(Some(final_match.id), Some(bronze.id));

    for (pool, rank, team) in known_qualifiers(&groups) {
        let (label, slot) = seed_slot(pool, rank);
        let semi = if label == MatchLabel::Sf1 { &mut sf1 } else { &mut sf2 };
        semi.fill_slot(slot, team);
        log::debug!("Seeded pool {pool} rank {} team {team} into {label}", rank.number());
    }
    knockout.matches = vec![final_match, bronze, sf1, sf2];

    match store.insert_group_with_matches(&knockout) {
        Ok(()) => {}
        Err(TournamentError::Conflict(_)) => {
            // Another build got there first; use its group.
            log::info!("Knockout group for tournament {tournament_id} was created concurrently");
            let existing = store
                .find_group_by_name(tournament_id, KNOCKOUT_GROUP_NAME)?
                .ok_or_else(|| {
                    TournamentError::Conflict("Knockout group vanished after conflict".into())
                })?;
            return Ok((existing, false));
        }
        Err(e) => return Err(e),
    }
    log::info!(
        "Created knockout group {} for tournament {}",
        knockout.id,
        tournament_id
    );
    Ok((knockout, true))
}
