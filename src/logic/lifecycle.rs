//! Tournament status transitions and the rules document.

use crate::models::{Rules, Tournament, TournamentError, TournamentId, TournamentStatus};
use crate::store::Store;
use chrono::Utc;

/// Move a tournament forward to `to`. Never moves it backwards; returns the row as stored.
pub(crate) fn advance_status<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    to: TournamentStatus,
) -> Result<Tournament, TournamentError> {
    store.update_tournament(tournament_id, &mut |t| {
        if t.status < to {
            log::info!("Tournament {} is now {:?} (was {:?})", t.id, to, t.status);
            t.status = to;
        }
        Ok(())
    })
}

/// A completed tournament whose final lost its result goes back to `Active`.
pub(crate) fn reopen<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<Tournament, TournamentError> {
    store.update_tournament(tournament_id, &mut |t| {
        if t.status == TournamentStatus::Completed {
            log::info!("Tournament {} reopened: its final has no result", t.id);
            t.status = TournamentStatus::Active;
        }
        Ok(())
    })
}

/// Rules of a tournament; a placeholder text when none were saved yet.
pub fn get_rules<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
) -> Result<Rules, TournamentError> {
    store.get_tournament(tournament_id)?;
    Ok(store
        .get_rules(tournament_id)?
        .unwrap_or_else(|| Rules::placeholder(tournament_id)))
}

/// Replace the rules of a tournament.
pub fn update_rules<S: Store + ?Sized>(
    store: &S,
    tournament_id: TournamentId,
    content: &str,
) -> Result<Rules, TournamentError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(TournamentError::InvalidInput("Rules content is required".into()));
    }
    let rules = Rules {
        tournament_id,
        content: content.to_string(),
        updated_at: Some(Utc::now()),
    };
    store.put_rules(&rules)?;
    log::info!("Updated rules of tournament {tournament_id}");
    Ok(rules)
}
