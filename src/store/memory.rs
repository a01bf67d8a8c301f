//! In-memory store: everything behind one RwLock, like the web app's tournament map.

use super::{LinkedMutation, MatchMutation, Store, TournamentMutation};
use crate::models::{
    GameMatch, Group, GroupId, MatchId, MatchLabel, Pool, Rules, Team, TeamId, Tournament,
    TournamentError, TournamentId,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Tables {
    tournaments: HashMap<TournamentId, Tournament>,
    rules: HashMap<TournamentId, Rules>,
    teams: HashMap<TeamId, Team>,
    /// Stored without matches; matches are joined on read.
    groups: HashMap<GroupId, Group>,
    matches: HashMap<MatchId, GameMatch>,
    /// Insertion order of matches, so loaded groups list them deterministically.
    match_order: Vec<MatchId>,
}

impl Tables {
    fn load_group(&self, group: &Group) -> Group {
        let mut loaded = group.clone();
        loaded.matches = self
            .match_order
            .iter()
            .filter_map(|id| self.matches.get(id))
            .filter(|m| m.group_id == group.id)
            .cloned()
            .collect();
        loaded.matches.sort_by_key(|m| (m.label.round(), m.label));
        loaded
    }

    fn check_new_group(&self, group: &Group) -> Result<(), TournamentError> {
        let duplicate = self
            .groups
            .values()
            .any(|g| g.tournament_id == group.tournament_id && g.name == group.name);
        if duplicate || self.groups.contains_key(&group.id) {
            return Err(TournamentError::Conflict(format!(
                "group '{}' already exists in tournament {}",
                group.name, group.tournament_id
            )));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Writes validate before touching the maps, so a poisoned lock still guards consistent maps.
    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn insert_tournament(&self, tournament: &Tournament) -> Result<(), TournamentError> {
        let mut t = self.write();
        if t.tournaments.contains_key(&tournament.id) {
            return Err(TournamentError::Conflict(format!(
                "tournament {} already exists",
                tournament.id
            )));
        }
        t.tournaments.insert(tournament.id, tournament.clone());
        Ok(())
    }

    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.read()
            .tournaments
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    fn update_tournament(
        &self,
        id: TournamentId,
        mutate: TournamentMutation<'_>,
    ) -> Result<Tournament, TournamentError> {
        let mut t = self.write();
        let row = t
            .tournaments
            .get_mut(&id)
            .ok_or(TournamentError::TournamentNotFound(id))?;
        let mut draft = row.clone();
        mutate(&mut draft)?;
        *row = draft.clone();
        Ok(draft)
    }

    fn get_rules(&self, tournament_id: TournamentId) -> Result<Option<Rules>, TournamentError> {
        Ok(self.read().rules.get(&tournament_id).cloned())
    }

    fn put_rules(&self, rules: &Rules) -> Result<(), TournamentError> {
        let mut t = self.write();
        if !t.tournaments.contains_key(&rules.tournament_id) {
            return Err(TournamentError::TournamentNotFound(rules.tournament_id));
        }
        t.rules.insert(rules.tournament_id, rules.clone());
        Ok(())
    }

    fn insert_team(&self, team: &Team) -> Result<(), TournamentError> {
        let mut t = self.write();
        if t.teams.contains_key(&team.id) {
            return Err(TournamentError::Conflict(format!("team {} already exists", team.id)));
        }
        t.teams.insert(team.id, team.clone());
        Ok(())
    }

    fn get_team(&self, id: TeamId) -> Result<Team, TournamentError> {
        self.read()
            .teams
            .get(&id)
            .cloned()
            .ok_or(TournamentError::TeamNotFound(id))
    }

    fn list_teams(&self, pool: Option<Pool>) -> Result<Vec<Team>, TournamentError> {
        let mut teams: Vec<Team> = self
            .read()
            .teams
            .values()
            .filter(|team| pool.map_or(true, |p| team.pool == p))
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(teams)
    }

    fn count_matches_referencing_teams(&self, ids: &[TeamId]) -> Result<usize, TournamentError> {
        Ok(self
            .read()
            .matches
            .values()
            .filter(|m| ids.iter().any(|id| m.has_team(*id)))
            .count())
    }

    fn insert_group(&self, group: &Group) -> Result<(), TournamentError> {
        let mut t = self.write();
        t.check_new_group(group)?;
        let mut row = group.clone();
        row.matches.clear();
        t.groups.insert(row.id, row);
        Ok(())
    }

    fn insert_group_with_matches(&self, group: &Group) -> Result<(), TournamentError> {
        let mut t = self.write();
        t.check_new_group(group)?;
        if let Some(m) = group.matches.iter().find(|m| m.group_id != group.id) {
            return Err(TournamentError::InvalidInput(format!(
                "match {} belongs to group {}, not {}",
                m.id, m.group_id, group.id
            )));
        }
        if let Some(m) = group.matches.iter().find(|m| t.matches.contains_key(&m.id)) {
            return Err(TournamentError::Conflict(format!("match {} already exists", m.id)));
        }
        let mut row = group.clone();
        let matches = std::mem::take(&mut row.matches);
        t.groups.insert(row.id, row);
        for m in matches {
            t.match_order.push(m.id);
            t.matches.insert(m.id, m);
        }
        Ok(())
    }

    fn get_group(&self, id: GroupId) -> Result<Group, TournamentError> {
        let t = self.read();
        t.groups
            .get(&id)
            .map(|g| t.load_group(g))
            .ok_or(TournamentError::GroupNotFound(id))
    }

    fn list_groups_by_tournament(&self, id: TournamentId) -> Result<Vec<Group>, TournamentError> {
        let t = self.read();
        let mut groups: Vec<Group> = t
            .groups
            .values()
            .filter(|g| g.tournament_id == id)
            .map(|g| t.load_group(g))
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    fn find_group_by_name(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> Result<Option<Group>, TournamentError> {
        let t = self.read();
        Ok(t.groups
            .values()
            .find(|g| g.tournament_id == tournament_id && g.name == name)
            .map(|g| t.load_group(g)))
    }

    fn insert_match(&self, game: &GameMatch) -> Result<(), TournamentError> {
        let mut t = self.write();
        if !t.groups.contains_key(&game.group_id) {
            return Err(TournamentError::GroupNotFound(game.group_id));
        }
        if t.matches.contains_key(&game.id) {
            return Err(TournamentError::Conflict(format!("match {} already exists", game.id)));
        }
        t.match_order.push(game.id);
        t.matches.insert(game.id, game.clone());
        Ok(())
    }

    fn get_match(&self, id: MatchId) -> Result<GameMatch, TournamentError> {
        self.read()
            .matches
            .get(&id)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(id))
    }

    fn find_match_by_label(
        &self,
        group_id: GroupId,
        label: MatchLabel,
    ) -> Result<Option<GameMatch>, TournamentError> {
        Ok(self
            .read()
            .matches
            .values()
            .find(|m| m.group_id == group_id && m.label == label)
            .cloned())
    }

    fn save_match(&self, game: &GameMatch) -> Result<(), TournamentError> {
        let mut t = self.write();
        match t.matches.get_mut(&game.id) {
            Some(row) => {
                *row = game.clone();
                Ok(())
            }
            None => Err(TournamentError::MatchNotFound(game.id)),
        }
    }

    fn update_match(&self, id: MatchId, mutate: MatchMutation<'_>) -> Result<GameMatch, TournamentError> {
        let mut t = self.write();
        let row = t.matches.get_mut(&id).ok_or(TournamentError::MatchNotFound(id))?;
        // Mutate a copy so a rejected mutation leaves the row untouched.
        let mut draft = row.clone();
        mutate(&mut draft)?;
        *row = draft.clone();
        Ok(draft)
    }

    fn update_match_from(
        &self,
        source: MatchId,
        target: MatchId,
        mutate: LinkedMutation<'_>,
    ) -> Result<GameMatch, TournamentError> {
        let mut t = self.write();
        let source = t
            .matches
            .get(&source)
            .cloned()
            .ok_or(TournamentError::MatchNotFound(source))?;
        let row = t
            .matches
            .get_mut(&target)
            .ok_or(TournamentError::MatchNotFound(target))?;
        let mut draft = row.clone();
        mutate(&source, &mut draft)?;
        *row = draft.clone();
        Ok(draft)
    }
}
