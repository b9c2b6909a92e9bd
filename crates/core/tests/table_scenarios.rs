use oracle_core::{
    AdviceAction, AdviceRequest, AdviceResult, AdviceSession, AdviceUnavailable, Advisor,
    CardFace, Event, PlayerSlot, SelectionTarget, Table, MAX_PLAYER_CARDS,
};

#[derive(Default)]
struct ScriptedAdvisor {
    requests: Vec<AdviceRequest>,
}

impl Advisor for ScriptedAdvisor {
    fn submit(&mut self, request: AdviceRequest) {
        self.requests.push(request);
    }
}

fn face(text: &str) -> CardFace {
    text.parse().expect("card text")
}

fn pick(table: &mut Table, target: SelectionTarget, text: &str) {
    table.open_picker(target);
    table.choose_face(face(text));
}

fn append(table: &mut Table, text: &str) {
    pick(table, SelectionTarget::Player(PlayerSlot::Append), text);
}

fn player_codes(table: &Table) -> Vec<String> {
    table
        .hand()
        .player()
        .iter()
        .map(|card| card.face().code())
        .collect()
}

fn stand() -> AdviceResult {
    AdviceResult::new(AdviceAction::Stand, 92, "Hard 16 against a king, stand.").expect("advice")
}

fn ready_table() -> Table {
    let mut table = Table::new();
    pick(&mut table, SelectionTarget::Dealer, "KS");
    append(&mut table, "7H");
    append(&mut table, "9D");
    table
}

#[test]
fn ask_and_resolve_stand() {
    let mut table = Table::new();
    let mut advisor = ScriptedAdvisor::default();
    pick(&mut table, SelectionTarget::Dealer, "KS");
    append(&mut table, "7H");
    assert!(!table.can_ask());
    append(&mut table, "9D");
    assert!(table.can_ask());

    let token = table.request_advice(&mut advisor).expect("request issued");
    assert!(table.session().is_loading());
    assert_eq!(advisor.requests.len(), 1);
    let request = &advisor.requests[0];
    assert_eq!(request.dealer.face(), face("KS"));
    assert_eq!(request.player.len(), 2);

    assert!(table.complete_advice(token, Ok(stand())));
    assert_eq!(table.session(), &AdviceSession::Resolved(stand()));
    let resolved = table.drain_events().any(|event| {
        matches!(
            event,
            Event::AdviceResolved {
                action: AdviceAction::Stand,
                confidence: 92,
                ..
            }
        )
    });
    assert!(resolved);
}

#[test]
fn removing_a_card_after_resolution_resets_advice() {
    let mut table = ready_table();
    let mut advisor = ScriptedAdvisor::default();
    let token = table.request_advice(&mut advisor).expect("request issued");
    table.complete_advice(token, Ok(stand()));

    table.remove_player_card(0);
    assert_eq!(table.session(), &AdviceSession::Idle);
    assert_eq!(player_codes(&table), vec!["9D"]);
}

#[test]
fn full_hand_refuses_fourth_card() {
    let mut table = Table::new();
    append(&mut table, "7H");
    append(&mut table, "9D");
    append(&mut table, "2C");
    append(&mut table, "5S");
    assert_eq!(player_codes(&table), vec!["7H", "9D", "2C"]);
}

#[test]
fn reset_while_loading_discards_late_result() {
    let mut table = ready_table();
    let mut advisor = ScriptedAdvisor::default();
    let token = table.request_advice(&mut advisor).expect("request issued");
    table.reset_table();
    assert_eq!(table.session(), &AdviceSession::Idle);

    assert!(!table.complete_advice(token, Ok(stand())));
    assert_eq!(table.session(), &AdviceSession::Idle);
    assert!(table.hand().dealer().is_none());
}

#[test]
fn late_failure_after_hand_change_is_discarded() {
    let mut table = ready_table();
    let mut advisor = ScriptedAdvisor::default();
    let token = table.request_advice(&mut advisor).expect("request issued");
    append(&mut table, "2C");
    assert_eq!(table.session(), &AdviceSession::Idle);
    assert!(!table.complete_advice(token, Err(AdviceUnavailable::new("timeout"))));
    assert_eq!(table.session(), &AdviceSession::Idle);
}

#[test]
fn only_latest_request_outcome_is_applied() {
    let mut table = ready_table();
    let mut advisor = ScriptedAdvisor::default();
    let first = table.request_advice(&mut advisor).expect("first");
    table.reset_session();
    let second = table.request_advice(&mut advisor).expect("second");
    assert_eq!(advisor.requests.len(), 2);

    assert!(!table.complete_advice(first, Ok(stand())));
    assert_eq!(table.session(), &AdviceSession::Loading { token: second });
    assert!(table.complete_advice(second, Err(AdviceUnavailable::new("quota"))));
    assert_eq!(table.session(), &AdviceSession::Failed);
}

#[test]
fn request_while_loading_issues_no_second_call() {
    let mut table = ready_table();
    let mut advisor = ScriptedAdvisor::default();
    assert!(table.request_advice(&mut advisor).is_some());
    assert!(table.request_advice(&mut advisor).is_none());
    assert_eq!(advisor.requests.len(), 1);
}

#[test]
fn request_with_incomplete_hand_is_ignored() {
    let mut advisor = ScriptedAdvisor::default();

    let mut no_dealer = Table::new();
    append(&mut no_dealer, "7H");
    append(&mut no_dealer, "9D");
    assert!(no_dealer.request_advice(&mut advisor).is_none());

    let mut one_card = Table::new();
    pick(&mut one_card, SelectionTarget::Dealer, "KS");
    append(&mut one_card, "7H");
    assert!(one_card.request_advice(&mut advisor).is_none());

    assert!(advisor.requests.is_empty());
    assert!(no_dealer.session().is_idle());
    assert!(one_card.session().is_idle());
}

#[test]
fn retry_after_failure_issues_fresh_request() {
    let mut table = ready_table();
    let mut advisor = ScriptedAdvisor::default();
    let first = table.request_advice(&mut advisor).expect("first");
    table.complete_advice(first, Err(AdviceUnavailable::new("network")));
    assert_eq!(table.session(), &AdviceSession::Failed);

    let retry = table.request_advice(&mut advisor).expect("retry");
    assert_ne!(retry, first);
    assert!(table.session().is_loading());
    assert_eq!(advisor.requests.len(), 2);
}

#[test]
fn every_hand_mutation_invalidates_resolved_advice() {
    let mutations: [(&str, fn(&mut Table)); 6] = [
        ("dealer", |table| pick(table, SelectionTarget::Dealer, "2H")),
        ("append", |table| append(table, "AS")),
        ("replace", |table| {
            pick(table, SelectionTarget::Player(PlayerSlot::Replace(1)), "QC")
        }),
        ("remove", |table| table.remove_player_card(1)),
        ("clear", |table| table.clear_player_hand()),
        ("reset", |table| table.reset_table()),
    ];
    for (name, mutate) in mutations {
        let mut table = ready_table();
        let mut advisor = ScriptedAdvisor::default();
        let token = table.request_advice(&mut advisor).expect("request issued");
        table.complete_advice(token, Ok(stand()));
        mutate(&mut table);
        assert_eq!(table.session(), &AdviceSession::Idle, "mutation {name}");
    }
}

#[test]
fn refused_append_keeps_resolved_advice() {
    let mut table = ready_table();
    append(&mut table, "2C");
    let mut advisor = ScriptedAdvisor::default();
    let token = table.request_advice(&mut advisor).expect("request issued");
    table.complete_advice(token, Ok(stand()));

    append(&mut table, "5S");
    assert_eq!(table.session(), &AdviceSession::Resolved(stand()));
}

#[test]
fn clear_player_hand_invalidates_even_when_empty() {
    let mut table = Table::new();
    pick(&mut table, SelectionTarget::Dealer, "KS");
    table.clear_player_hand();
    assert!(table.session().is_idle());
    assert!(table.hand().player().is_empty());
}

#[test]
fn replace_keeps_identity_of_other_slots() {
    let mut table = ready_table();
    append(&mut table, "2C");
    let before = table.hand().player().to_vec();
    pick(&mut table, SelectionTarget::Player(PlayerSlot::Replace(0)), "7H");
    let after = table.hand().player();
    assert_ne!(after[0].id(), before[0].id());
    assert_eq!(after[0].face(), before[0].face());
    assert_eq!(after[1].id(), before[1].id());
    assert_eq!(after[2].id(), before[2].id());
}

#[test]
fn duplicate_faces_are_distinct_instances() {
    let mut table = Table::new();
    pick(&mut table, SelectionTarget::Dealer, "KS");
    append(&mut table, "KS");
    append(&mut table, "KS");
    let dealer = table.hand().dealer().expect("dealer");
    let player = table.hand().player();
    assert_ne!(dealer.id(), player[0].id());
    assert_ne!(player[0].id(), player[1].id());
}

#[test]
fn dismissed_picker_does_not_touch_the_hand() {
    let mut table = ready_table();
    let revision = table.hand().revision();
    table.open_picker(SelectionTarget::Dealer);
    table.dismiss_picker();
    assert!(table.choose_face(face("2H")).is_none());
    assert_eq!(table.hand().revision(), revision);
    assert_eq!(table.hand().dealer().map(|card| card.face()), Some(face("KS")));
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Pick(PlayerSlot),
    Remove(usize),
    Clear,
}

fn all_ops() -> Vec<Op> {
    let mut ops = vec![Op::Pick(PlayerSlot::Append), Op::Clear];
    for index in 0..=MAX_PLAYER_CARDS {
        ops.push(Op::Pick(PlayerSlot::Replace(index)));
        ops.push(Op::Remove(index));
    }
    ops
}

fn walk(table: &Table, ops: &[Op], depth: usize) {
    assert!(table.hand().player().len() <= MAX_PLAYER_CARDS);
    if depth == 0 {
        return;
    }
    for op in ops {
        let mut next = Table::new();
        for card in table.hand().player() {
            next.place_or_replace_player_card(*card, PlayerSlot::Append);
        }
        match *op {
            Op::Pick(slot) => pick(&mut next, SelectionTarget::Player(slot), "8C"),
            Op::Remove(index) => next.remove_player_card(index),
            Op::Clear => next.clear_player_hand(),
        }
        walk(&next, ops, depth - 1);
    }
}

#[test]
fn player_hand_never_exceeds_capacity() {
    let ops = all_ops();
    walk(&Table::new(), &ops, 5);
}
