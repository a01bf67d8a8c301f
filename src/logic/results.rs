//! Recording match results and reporting what propagation did with them.

use crate::logic::lifecycle::{advance_status, reopen};
use crate::logic::promotion::Placement;
use crate::logic::propagation::{propagate, SlotWrite};
use crate::logic::template::Rank;
use crate::models::{
    GameMatch, MatchId, MatchLabel, MatchState, PropagationWarning, TeamId, TournamentError,
    TournamentStatus,
};
use crate::store::Store;
use serde::Serialize;

/// Outcome of [`record_result`]: the result is stored; `warnings` lists downstream effects
/// that could not be applied.
#[derive(Clone, Debug, Serialize)]
pub struct ResultReport {
    #[serde(rename = "match")]
    pub game: GameMatch,
    pub loser: Option<TeamId>,
    pub writes: Vec<SlotWrite>,
    pub qualifier: Option<Rank>,
    pub promotion: Option<Placement>,
    pub warnings: Vec<PropagationWarning>,
}

impl ResultReport {
    /// True if every downstream effect was applied.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Record `winner` for a match and propagate the outcome.
///
/// Both slots must be filled and `winner` must occupy one of them. Recording again with
/// another winner is a correction: downstream slots are overwritten with the new outcome.
pub fn record_result<S: Store + ?Sized>(
    store: &S,
    match_id: MatchId,
    winner: TeamId,
    score: Option<String>,
    video_url: Option<String>,
) -> Result<ResultReport, TournamentError> {
    let score = non_blank(score);
    let video_url = non_blank(video_url);

    let recorded = store.update_match(match_id, &mut |m| {
        if m.team_a.is_none() || m.team_b.is_none() {
            return Err(TournamentError::IncompleteMatch(m.id));
        }
        if !m.has_team(winner) {
            return Err(TournamentError::InvalidWinner {
                match_id: m.id,
                winner,
            });
        }
        let correction = m.winner.is_some_and(|previous| previous != winner);
        if correction {
            log::info!("Correcting result of {} match {}", m.label, m.id);
        }
        m.set_result(winner, score.clone(), video_url.clone());
        Ok(())
    })?;
    log::info!(
        "Recorded {} match {}: winner {}",
        recorded.label,
        recorded.id,
        winner
    );

    let propagation = propagate(store, &recorded);
    let state = if propagation.qualifier.is_some() {
        MatchState::Promoted
    } else {
        MatchState::Propagated
    };
    // A concurrent correction may have replaced the winner meanwhile; its own run sets the state.
    let game = match store.update_match(match_id, &mut |m| {
        if m.winner == Some(winner) {
            m.state = state;
        }
        Ok(())
    }) {
        Ok(game) => game,
        Err(e) => {
            log::warn!("Could not mark match {match_id} as {state:?}: {e}");
            recorded
        }
    };

    sync_status(store, &game, &propagation.warnings);

    Ok(ResultReport {
        loser: game.opponent_of(winner),
        game,
        writes: propagation.writes,
        qualifier: propagation.qualifier,
        promotion: propagation.promotion,
        warnings: propagation.warnings,
    })
}

/// A decided final completes the tournament; a final whose result was cleared reopens it.
fn sync_status<S: Store + ?Sized>(store: &S, game: &GameMatch, warnings: &[PropagationWarning]) {
    let final_decided = game.label == MatchLabel::Final && game.is_played();
    let final_cleared = warnings.iter().any(|w| {
        matches!(
            w,
            PropagationWarning::DownstreamResultCleared {
                label: MatchLabel::Final,
                ..
            }
        )
    });
    if !final_decided && !final_cleared {
        return;
    }
    let result = store.get_group(game.group_id).and_then(|group| {
        if final_decided {
            advance_status(store, group.tournament_id, TournamentStatus::Completed)
        } else {
            reopen(store, group.tournament_id)
        }
    });
    if let Err(e) = result {
        log::warn!("Could not update tournament status after match {}: {e}", game.id);
    }
}
