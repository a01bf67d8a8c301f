//! Tournament status transitions and the rules document.

mod common;

use common::{group_of, play_group, store_with_tournament};
use gsl_tournament_web::{
    get_rules, record_result, update_rules, ErrorKind, MatchLabel, Pool, PropagationWarning,
    Rules, Store, TournamentStatus, KNOCKOUT_GROUP_NAME,
};

fn status(store: &impl Store, tournament: uuid::Uuid) -> TournamentStatus {
    store.get_tournament(tournament).unwrap().status
}

#[test]
fn status_follows_the_tournament_from_first_group_to_final() {
    let (store, tid) = store_with_tournament();
    assert_eq!(status(&store, tid), TournamentStatus::Draft);

    let (a, ta) = group_of(&store, tid, "Group A", Pool::A);
    assert_eq!(status(&store, tid), TournamentStatus::Active);
    let (b, tb) = group_of(&store, tid, "Group B", Pool::B);
    play_group(&store, &a, &ta);
    play_group(&store, &b, &tb);

    let ko = store.find_group_by_name(tid, KNOCKOUT_GROUP_NAME).unwrap().unwrap();
    let sf1 = ko.match_by_label(MatchLabel::Sf1).unwrap().id;
    let sf2 = ko.match_by_label(MatchLabel::Sf2).unwrap().id;
    let final_id = ko.match_by_label(MatchLabel::Final).unwrap().id;
    record_result(&store, sf1, ta[0], None, None).unwrap();
    record_result(&store, sf2, tb[0], None, None).unwrap();
    assert_eq!(status(&store, tid), TournamentStatus::Active);

    record_result(&store, final_id, tb[0], Some("21-19".into()), None).unwrap();
    assert_eq!(status(&store, tid), TournamentStatus::Completed);

    // Correcting the final keeps it completed.
    record_result(&store, final_id, ta[0], None, None).unwrap();
    assert_eq!(status(&store, tid), TournamentStatus::Completed);

    // Correcting a semifinal replaces the final's winner: the final is open again.
    let report = record_result(&store, sf1, tb[2], None, None).unwrap();
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        PropagationWarning::DownstreamResultCleared { label: MatchLabel::Final, .. }
    )));
    assert_eq!(status(&store, tid), TournamentStatus::Active);
    let final_match = store.get_match(final_id).unwrap();
    assert_eq!(final_match.winner, None);
    assert_eq!(final_match.score, None);
}

#[test]
fn building_a_group_never_moves_status_backwards() {
    let (store, tid) = store_with_tournament();
    store
        .update_tournament(tid, &mut |t| {
            t.status = TournamentStatus::Completed;
            Ok(())
        })
        .unwrap();
    group_of(&store, tid, "Late Group", Pool::A);
    assert_eq!(status(&store, tid), TournamentStatus::Completed);
}

#[test]
fn rules_start_as_placeholder_and_can_be_replaced() {
    let (store, tid) = store_with_tournament();
    let rules = get_rules(&store, tid).unwrap();
    assert_eq!(rules.content, Rules::PLACEHOLDER);
    assert_eq!(rules.updated_at, None);

    let saved = update_rules(&store, tid, "  Best of three games to 21.\n").unwrap();
    assert_eq!(saved.content, "Best of three games to 21.");
    assert!(saved.updated_at.is_some());
    assert_eq!(get_rules(&store, tid).unwrap(), saved);

    update_rules(&store, tid, "Best of one.").unwrap();
    assert_eq!(get_rules(&store, tid).unwrap().content, "Best of one.");
}

#[test]
fn rules_are_per_tournament_and_validated() {
    let (store, tid) = store_with_tournament();
    let err = update_rules(&store, tid, "   ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let unknown = uuid::Uuid::new_v4();
    assert_eq!(get_rules(&store, unknown).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(update_rules(&store, unknown, "x").unwrap_err().kind(), ErrorKind::NotFound);
}
