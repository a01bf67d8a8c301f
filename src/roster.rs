//! Team roster import from CSV (`name,pool,player_1,player_2`, header required).

use crate::models::{Pool, Team, TournamentError};
use crate::store::Store;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(default)]
    name: String,
    pool: String,
    player_1: String,
    player_2: String,
}

/// Parse teams from CSV. Fails on the first malformed row, naming its line.
pub fn read_teams<R: Read>(reader: R) -> Result<Vec<Team>, TournamentError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut teams = Vec::new();
    for (i, row) in csv_reader.deserialize::<RosterRow>().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        let row = row.map_err(|e| {
            TournamentError::InvalidInput(format!("Roster line {line}: {e}"))
        })?;
        let pool: Pool = row.pool.parse().map_err(|e| {
            TournamentError::InvalidInput(format!("Roster line {line}: {e}"))
        })?;
        if row.player_1.is_empty() || row.player_2.is_empty() {
            return Err(TournamentError::InvalidInput(format!(
                "Roster line {line}: a team needs two players"
            )));
        }
        teams.push(Team::new(row.name, pool, row.player_1, row.player_2));
    }
    Ok(teams)
}

/// Parse a roster and insert every team. Nothing is inserted if any row is invalid.
pub fn import_teams<S: Store + ?Sized, R: Read>(
    store: &S,
    reader: R,
) -> Result<Vec<Team>, TournamentError> {
    let teams = read_teams(reader)?;
    for team in &teams {
        store.insert_team(team)?;
    }
    log::info!("Imported {} team(s) from roster", teams.len());
    Ok(teams)
}
