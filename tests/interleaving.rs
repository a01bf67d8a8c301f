//! Results and promotions that interleave with another request part-way through.
//!
//! `Interleaved` wraps the in-memory store and runs a second request directly against the
//! inner store at a chosen point of the first one, the way a concurrent HTTP request would.

mod common;

use common::{add_teams, match_id, play, play_group};
use gsl_tournament_web::store::{LinkedMutation, MatchMutation, TournamentMutation};
use gsl_tournament_web::{
    build_group_bracket, record_result, GameMatch, Group, GroupId, MatchId, MatchLabel,
    MemoryStore, Pool, PropagationWarning, ResultReport, Rules, Store, Team, TeamId, Tournament,
    TournamentError, TournamentId, KNOCKOUT_GROUP_NAME,
};
use std::cell::RefCell;
use std::rc::Rc;

type Hook = Box<dyn FnOnce(&MemoryStore)>;

#[derive(Default)]
struct Interleaved {
    inner: MemoryStore,
    /// Runs before the first linked write into the given match.
    before_write: RefCell<Option<(MatchId, Hook)>>,
    /// Runs before (`true`) or after (`false`) the knockout group is inserted.
    on_knockout_insert: RefCell<Option<(bool, Hook)>>,
}

impl Interleaved {
    fn before_write_to(&self, target: MatchId, hook: impl FnOnce(&MemoryStore) + 'static) {
        *self.before_write.borrow_mut() = Some((target, Box::new(hook)));
    }

    fn on_knockout_insert(&self, before: bool, hook: impl FnOnce(&MemoryStore) + 'static) {
        *self.on_knockout_insert.borrow_mut() = Some((before, Box::new(hook)));
    }
}

impl Store for Interleaved {
    fn insert_tournament(&self, tournament: &Tournament) -> Result<(), TournamentError> {
        self.inner.insert_tournament(tournament)
    }
    fn get_tournament(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.inner.get_tournament(id)
    }
    fn update_tournament(
        &self,
        id: TournamentId,
        mutate: TournamentMutation<'_>,
    ) -> Result<Tournament, TournamentError> {
        self.inner.update_tournament(id, mutate)
    }
    fn get_rules(&self, tournament_id: TournamentId) -> Result<Option<Rules>, TournamentError> {
        self.inner.get_rules(tournament_id)
    }
    fn put_rules(&self, rules: &Rules) -> Result<(), TournamentError> {
        self.inner.put_rules(rules)
    }
    fn insert_team(&self, team: &Team) -> Result<(), TournamentError> {
        self.inner.insert_team(team)
    }
    fn get_team(&self, id: TeamId) -> Result<Team, TournamentError> {
        self.inner.get_team(id)
    }
    fn list_teams(&self, pool: Option<Pool>) -> Result<Vec<Team>, TournamentError> {
        self.inner.list_teams(pool)
    }
    fn count_matches_referencing_teams(&self, ids: &[TeamId]) -> Result<usize, TournamentError> {
        self.inner.count_matches_referencing_teams(ids)
    }
    fn insert_group(&self, group: &Group) -> Result<(), TournamentError> {
        self.inner.insert_group(group)
    }
    fn insert_group_with_matches(&self, group: &Group) -> Result<(), TournamentError> {
        let hook = if group.name == KNOCKOUT_GROUP_NAME {
            self.on_knockout_insert.borrow_mut().take()
        } else {
            None
        };
        match hook {
            Some((true, hook)) => {
                hook(&self.inner);
                self.inner.insert_group_with_matches(group)
            }
            Some((false, hook)) => {
                let result = self.inner.insert_group_with_matches(group);
                hook(&self.inner);
                result
            }
            None => self.inner.insert_group_with_matches(group),
        }
    }
    fn get_group(&self, id: GroupId) -> Result<Group, TournamentError> {
        self.inner.get_group(id)
    }
    fn list_groups_by_tournament(&self, id: TournamentId) -> Result<Vec<Group>, TournamentError> {
        self.inner.list_groups_by_tournament(id)
    }
    fn find_group_by_name(
        &self,
        tournament_id: TournamentId,
        name: &str,
    ) -> Result<Option<Group>, TournamentError> {
        self.inner.find_group_by_name(tournament_id, name)
    }
    fn insert_match(&self, game: &GameMatch) -> Result<(), TournamentError> {
        self.inner.insert_match(game)
    }
    fn get_match(&self, id: MatchId) -> Result<GameMatch, TournamentError> {
        self.inner.get_match(id)
    }
    fn find_match_by_label(
        &self,
        group_id: GroupId,
        label: MatchLabel,
    ) -> Result<Option<GameMatch>, TournamentError> {
        self.inner.find_match_by_label(group_id, label)
    }
    fn save_match(&self, game: &GameMatch) -> Result<(), TournamentError> {
        self.inner.save_match(game)
    }
    fn update_match(&self, id: MatchId, mutate: MatchMutation<'_>) -> Result<GameMatch, TournamentError> {
        self.inner.update_match(id, mutate)
    }
    fn update_match_from(
        &self,
        source: MatchId,
        target: MatchId,
        mutate: LinkedMutation<'_>,
    ) -> Result<GameMatch, TournamentError> {
        let due = matches!(&*self.before_write.borrow(), Some((t, _)) if *t == target);
        if due {
            if let Some((_, hook)) = self.before_write.borrow_mut().take() {
                hook(&self.inner);
            }
        }
        self.inner.update_match_from(source, target, mutate)
    }
}

fn setup() -> (Interleaved, TournamentId) {
    let store = Interleaved::default();
    let tournament = Tournament::new("Interleaved Cup");
    store.insert_tournament(&tournament).unwrap();
    (store, tournament.id)
}

fn group(store: &Interleaved, tid: TournamentId, name: &str, pool: Pool) -> (Group, Vec<TeamId>) {
    let teams = add_teams(&store.inner, pool, 4);
    let group = build_group_bracket(store, tid, name, pool, &teams).unwrap();
    (group, teams)
}

fn get(store: &MemoryStore, group: &Group, label: MatchLabel) -> GameMatch {
    store.get_match(match_id(store, group, label)).unwrap()
}

#[test]
fn correction_during_propagation_wins_downstream() {
    for interrupted in [MatchLabel::Winners, MatchLabel::Losers] {
        let (store, tid) = setup();
        let (g, t) = group(&store, tid, "Group A", Pool::A);
        let m1 = match_id(&store.inner, &g, MatchLabel::M1);

        // The correction (t1 wins M1) is recorded in full just before the original result
        // (t0 wins M1) writes into `interrupted`.
        let target = match_id(&store.inner, &g, interrupted);
        let corrected_winner = t[1];
        store.before_write_to(target, move |inner| {
            let report = record_result(inner, m1, corrected_winner, None, None).unwrap();
            assert!(report.is_clean(), "{:?}", report.warnings);
        });
        let report = record_result(&store, m1, t[0], None, None).unwrap();

        assert!(
            report.warnings.contains(&PropagationWarning::SourceSuperseded {
                match_id: m1,
                label: MatchLabel::M1,
            }),
            "{interrupted}: {:?}",
            report.warnings
        );
        assert!(report.writes.iter().all(|w| w.label != interrupted));

        let m1_row = store.inner.get_match(m1).unwrap();
        assert_eq!(m1_row.winner, Some(t[1]));
        assert_eq!(get(&store.inner, &g, MatchLabel::Winners).team_a, Some(t[1]), "{interrupted}");
        assert_eq!(get(&store.inner, &g, MatchLabel::Losers).team_a, Some(t[0]), "{interrupted}");
    }
}

#[test]
fn stale_qualifier_is_not_promoted() {
    let (store, tid) = setup();
    let (a, ta) = group(&store, tid, "Group A", Pool::A);
    let (b, tb) = group(&store, tid, "Group B", Pool::B);
    play_group(&store.inner, &b, &tb);
    play(&store.inner, &a, MatchLabel::M1, ta[0]);
    play(&store.inner, &a, MatchLabel::M2, ta[3]);
    let winners = match_id(&store.inner, &a, MatchLabel::Winners);
    let ko = store.inner.find_group_by_name(tid, KNOCKOUT_GROUP_NAME).unwrap().unwrap();
    let sf1 = ko.match_by_label(MatchLabel::Sf1).unwrap().id;

    // Before t0's Winners result reaches SF1, a correction makes t3 the group winner.
    let corrected = ta[3];
    store.before_write_to(sf1, move |inner| {
        record_result(inner, winners, corrected, None, None).unwrap();
    });
    let report = record_result(&store, winners, ta[0], None, None).unwrap();
    assert!(report.promotion.is_none());
    assert!(matches!(
        report.warnings.as_slice(),
        [PropagationWarning::SourceSuperseded { .. }]
    ));

    assert_eq!(store.inner.get_match(sf1).unwrap().team_a, Some(ta[3]));
    assert_eq!(get(&store.inner, &a, MatchLabel::Decider).team_a, Some(ta[0]));
}

/// Both pools' Winners played up to the last match, so each Winners result is a first qualifier.
fn two_pools_ready(store: &Interleaved, tid: TournamentId) -> ((Group, Vec<TeamId>), (Group, Vec<TeamId>)) {
    let (a, ta) = group(store, tid, "Group A", Pool::A);
    let (b, tb) = group(store, tid, "Group B", Pool::B);
    for (g, t) in [(&a, &ta), (&b, &tb)] {
        play(&store.inner, g, MatchLabel::M1, t[0]);
        play(&store.inner, g, MatchLabel::M2, t[3]);
    }
    ((a, ta), (b, tb))
}

#[test]
fn qualifier_arriving_right_after_knockout_insert_is_placed() {
    let (store, tid) = setup();
    let ((a, ta), (b, tb)) = two_pools_ready(&store, tid);
    let b_winners = match_id(&store.inner, &b, MatchLabel::Winners);

    let other: Rc<RefCell<Option<ResultReport>>> = Rc::default();
    let sink = Rc::clone(&other);
    let b1 = tb[0];
    store.on_knockout_insert(false, move |inner| {
        *sink.borrow_mut() = Some(record_result(inner, b_winners, b1, None, None).unwrap());
    });
    let report = record_result(&store, match_id(&store.inner, &a, MatchLabel::Winners), ta[0], None, None)
        .unwrap();

    assert!(report.is_clean(), "{:?}", report.warnings);
    assert!(report.promotion.unwrap().knockout_created);
    let other = other.borrow_mut().take().unwrap();
    assert!(other.is_clean(), "{:?}", other.warnings);
    assert!(!other.promotion.unwrap().knockout_created);

    let ko = store.inner.find_group_by_name(tid, KNOCKOUT_GROUP_NAME).unwrap().unwrap();
    assert_eq!(ko.match_by_label(MatchLabel::Sf1).unwrap().team_a, Some(ta[0]));
    assert_eq!(ko.match_by_label(MatchLabel::Sf2).unwrap().team_a, Some(tb[0]));
}

#[test]
fn losing_the_knockout_insert_race_reuses_the_winner() {
    let (store, tid) = setup();
    let ((a, ta), (b, tb)) = two_pools_ready(&store, tid);
    let b_winners = match_id(&store.inner, &b, MatchLabel::Winners);

    let other: Rc<RefCell<Option<ResultReport>>> = Rc::default();
    let sink = Rc::clone(&other);
    let b1 = tb[0];
    store.on_knockout_insert(true, move |inner| {
        *sink.borrow_mut() = Some(record_result(inner, b_winners, b1, None, None).unwrap());
    });
    let report = record_result(&store, match_id(&store.inner, &a, MatchLabel::Winners), ta[0], None, None)
        .unwrap();

    assert!(report.is_clean(), "{:?}", report.warnings);
    let placement = report.promotion.unwrap();
    assert!(!placement.knockout_created);
    let other = other.borrow_mut().take().unwrap();
    let other_placement = other.promotion.unwrap();
    assert!(other_placement.knockout_created);
    assert_eq!(placement.knockout_group_id, other_placement.knockout_group_id);

    let knockouts: Vec<Group> = store
        .inner
        .list_groups_by_tournament(tid)
        .unwrap()
        .into_iter()
        .filter(|g| g.name == KNOCKOUT_GROUP_NAME)
        .collect();
    assert_eq!(knockouts.len(), 1);
    assert_eq!(knockouts[0].matches.len(), 4);
    assert_eq!(knockouts[0].match_by_label(MatchLabel::Sf1).unwrap().team_a, Some(ta[0]));
    assert_eq!(knockouts[0].match_by_label(MatchLabel::Sf2).unwrap().team_a, Some(tb[0]));
}
