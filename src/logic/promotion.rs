//! Promotion of group qualifiers into their cross-seeded knockout slot.

use crate::logic::knockout::{ensure_knockout, Readiness};
use crate::logic::template::{seed_slot, Rank};
use crate::models::{
    GameMatch, GroupId, MatchId, MatchLabel, Slot, TeamId, TournamentError, KNOCKOUT_GROUP_NAME,
};
use crate::store::Store;
use serde::Serialize;

/// Where a qualifier ended up.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Placement {
    pub knockout_group_id: GroupId,
    pub match_id: MatchId,
    pub label: MatchLabel,
    pub slot: Slot,
    pub team: TeamId,
    /// Previous occupant of the slot, if it was a different team.
    pub displaced: Option<TeamId>,
    /// True when this promotion created the knockout group.
    pub knockout_created: bool,
}

/// Write the rank-`rank` qualifier of `group_id` into its knockout slot.
///
/// Builds the knockout group on first use, as long as every pool has a group; slots of
/// qualifiers that are still unknown stay empty. The slot is overwritten unconditionally,
/// so a corrected group result simply replaces the earlier qualifier.
pub fn promote_qualifier<S: Store + ?Sized>(
    store: &S,
    group_id: GroupId,
    rank: Rank,
    team: TeamId,
) -> Result<Placement, TournamentError> {
    place_qualifier(store, group_id, rank, team, None)
}

/// Promotion driven by a recorded result: the slot is only written while `source` still
/// has `team` as its winner, otherwise [`TournamentError::Superseded`].
pub(crate) fn promote_from_result<S: Store + ?Sized>(
    store: &S,
    source: &GameMatch,
    rank: Rank,
    team: TeamId,
) -> Result<Placement, TournamentError> {
    place_qualifier(store, source.group_id, rank, team, Some(source.id))
}

fn place_qualifier<S: Store + ?Sized>(
    store: &S,
    group_id: GroupId,
    rank: Rank,
    team: TeamId,
    source: Option<MatchId>,
) -> Result<Placement, TournamentError> {
    let group = store.get_group(group_id)?;
    let pool = group.pool.ok_or_else(|| {
        TournamentError::InvalidInput(format!(
            "Group '{}' is not a group-stage group",
            group.name
        ))
    })?;
    if !group.matches.iter().any(|m| m.has_team(team)) {
        return Err(TournamentError::InvalidInput(format!(
            "Team {team} does not play in group '{}'",
            group.name
        )));
    }

    let (knockout, knockout_created) =
        match store.find_group_by_name(group.tournament_id, KNOCKOUT_GROUP_NAME)? {
            Some(existing) => (existing, false),
            None => {
                log::info!("Knockout stage not found, attempting auto-generation");
                ensure_knockout(store, group.tournament_id, Readiness::GroupsOnly)?
            }
        };

    let (label, slot) = seed_slot(pool, rank);
    let target_id = match knockout.match_by_label(label) {
        Some(m) => m.id,
        None => {
            log::warn!("{label} not among loaded knockout matches, looking it up directly");
            store
                .find_match_by_label(knockout.id, label)?
                .map(|m| m.id)
                .ok_or(TournamentError::KnockoutMatchMissing {
                    group: knockout.id,
                    label,
                })?
        }
    };

    let mut displaced = None;
    match source {
        None => store.update_match(target_id, &mut |m| {
            displaced = m.fill_slot(slot, team).filter(|prev| *prev != team);
            Ok(())
        })?,
        Some(source_id) => store.update_match_from(source_id, target_id, &mut |src, m| {
            if src.winner != Some(team) {
                return Err(TournamentError::Superseded(src.id));
            }
            displaced = m.fill_slot(slot, team).filter(|prev| *prev != team);
            Ok(())
        })?,
    };

    log::info!(
        "Promoted pool {pool} rank {} team {team} to {label} slot {slot:?}",
        rank.number()
    );
    Ok(Placement {
        knockout_group_id: knockout.id,
        match_id: target_id,
        label,
        slot,
        team,
        displaced,
        knockout_created,
    })
}
