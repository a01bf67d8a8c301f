//! Forwarding a resolved match's winner and loser to the matches its pointers name.

use crate::logic::promotion::{promote_from_result, Placement};
use crate::logic::template::{qualifier_rank, route_for, Outcome, Rank};
use crate::models::{
    GameMatch, MatchId, MatchLabel, PropagationWarning, Slot, TeamId, TournamentError,
};
use crate::store::Store;
use serde::Serialize;

/// One team written into one downstream slot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SlotWrite {
    pub match_id: MatchId,
    pub label: MatchLabel,
    pub slot: Slot,
    pub team: TeamId,
    pub outcome: Outcome,
    /// Previous occupant, if it was a different team.
    pub displaced: Option<TeamId>,
    /// Slot chosen by "first free slot" because the route table had no answer.
    pub fallback: bool,
}

/// Everything propagation did (or failed to do) for one result.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Propagation {
    pub writes: Vec<SlotWrite>,
    /// Rank earned by the winner when the match is group-terminal.
    pub qualifier: Option<Rank>,
    pub promotion: Option<Placement>,
    pub warnings: Vec<PropagationWarning>,
}

/// Push the winner and loser of `resolved` downstream. Never fails: anything that cannot be
/// applied is logged and returned as a warning.
///
/// Each write checks, under the store lock, that `resolved` is still the stored result of
/// its match; writes of a result that was replaced meanwhile are skipped.
pub fn propagate<S: Store + ?Sized>(store: &S, resolved: &GameMatch) -> Propagation {
    let mut report = Propagation::default();
    let Some(winner) = resolved.winner else {
        return report;
    };
    let loser = resolved.opponent_of(winner);

    match resolved.next_on_win {
        Some(target) => forward(store, resolved, Outcome::Win, winner, target, &mut report),
        None => {
            if let Some(rank) = qualifier_rank(resolved.label) {
                report.qualifier = Some(rank);
                match promote_from_result(store, resolved, rank, winner) {
                    Ok(placement) => report.promotion = Some(placement),
                    Err(TournamentError::Superseded(_)) => superseded(resolved, &mut report),
                    Err(e) => {
                        log::warn!(
                            "Promotion of rank {} team {winner} skipped: {e}",
                            rank.number()
                        );
                        report.warnings.push(PropagationWarning::PromotionSkipped {
                            rank: rank.number(),
                            team: winner,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    if let (Some(target), Some(loser)) = (resolved.next_on_lose, loser) {
        forward(store, resolved, Outcome::Lose, loser, target, &mut report);
    }
    report
}

fn forward<S: Store + ?Sized>(
    store: &S,
    source: &GameMatch,
    outcome: Outcome,
    team: TeamId,
    target: MatchId,
    report: &mut Propagation,
) {
    let route = route_for(source.label, outcome);
    let source_teams = [source.team_a, source.team_b];
    let mut applied: Option<(Slot, bool, Option<TeamId>)> = None;
    let mut cleared: Option<(MatchLabel, TeamId)> = None;
    let mut no_slot = false;
    let mut stale = false;

    let result = store.update_match_from(source.id, target, &mut |current, m| {
        if !same_result(current, source) {
            stale = true;
            return Err(TournamentError::Superseded(source.id));
        }
        let (slot, fallback) = match route.filter(|r| r.target == m.label) {
            Some(r) => (r.slot, false),
            None => match fallback_slot(m, &source_teams) {
                Some(slot) => (slot, true),
                None => {
                    no_slot = true;
                    return Err(TournamentError::Conflict(format!(
                        "match {} has no free slot",
                        m.id
                    )));
                }
            },
        };
        let had_winner = m.winner;
        let displaced = m.fill_slot(slot, team).filter(|prev| *prev != team);
        if let (Some(w), None) = (had_winner, m.winner) {
            cleared = Some((m.label, w));
        }
        applied = Some((slot, fallback, displaced));
        Ok(())
    });

    let updated = match result {
        Ok(updated) => updated,
        Err(_) if stale => {
            superseded(source, report);
            return;
        }
        Err(_) if no_slot => {
            log::warn!(
                target: "bracket::fallback",
                "Match {target} has no free slot for the {} result",
                source.label
            );
            report.warnings.push(PropagationWarning::NoSlotAvailable {
                source_label: source.label,
                target,
            });
            return;
        }
        Err(e) => {
            log::warn!("Could not propagate {} result to match {target}: {e}", source.label);
            report.warnings.push(PropagationWarning::TargetUnavailable {
                source_label: source.label,
                target,
                reason: e.to_string(),
            });
            return;
        }
    };
    let Some((slot, fallback, displaced)) = applied else {
        return;
    };

    if fallback {
        log::warn!(
            target: "bracket::fallback",
            "No route for {} {:?} into {}; used slot {:?} of match {}",
            source.label,
            outcome,
            updated.label,
            slot,
            updated.id
        );
    } else {
        log::info!(
            "Propagated {:?} of {} ({team}) to {} slot {:?}",
            outcome,
            source.label,
            updated.label,
            slot
        );
    }
    if let Some((label, displaced_winner)) = cleared {
        log::warn!("Cleared result of {label} match {target}: its winner was replaced");
        report.warnings.push(PropagationWarning::DownstreamResultCleared {
            match_id: target,
            label,
            displaced: displaced_winner,
        });
    }
    report.writes.push(SlotWrite {
        match_id: updated.id,
        label: updated.label,
        slot,
        team,
        outcome,
        displaced,
        fallback,
    });
}

fn same_result(current: &GameMatch, forwarded: &GameMatch) -> bool {
    current.winner == forwarded.winner
        && current.team_a == forwarded.team_a
        && current.team_b == forwarded.team_b
}

fn superseded(source: &GameMatch, report: &mut Propagation) {
    let warning = PropagationWarning::SourceSuperseded {
        match_id: source.id,
        label: source.label,
    };
    if !report.warnings.contains(&warning) {
        log::info!("Not forwarding stale result of {} match {}", source.label, source.id);
        report.warnings.push(warning);
    }
}

/// Slot for a target the route table does not know: the slot already holding a team of
/// the source match (a re-propagated correction), otherwise the first empty one.
fn fallback_slot(target: &GameMatch, source_teams: &[Option<TeamId>; 2]) -> Option<Slot> {
    [Slot::A, Slot::B]
        .into_iter()
        .find(|slot| {
            target
                .slot(*slot)
                .map_or(false, |occupant| source_teams.contains(&Some(occupant)))
        })
        .or_else(|| target.first_empty_slot())
}
