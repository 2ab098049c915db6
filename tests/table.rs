use heads_up::game::{ActionAmount, ActionKind, AmountRange, SeatMap, Street, Winner};
use heads_up::web::table::{RoundAdvance, Table, TableConfig, TableError};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn table_with(config: TableConfig) -> Table<ChaCha8Rng> {
    Table::with_rng(config, ChaCha8Rng::seed_from_u64(11))
}

fn table() -> Table<ChaCha8Rng> {
    table_with(TableConfig::default())
}

#[test]
fn opening_deal_lists_fold_call_and_raise_bounds() {
    let mut table = table();
    let snapshot = table.start_game();

    assert_eq!(snapshot.round_count, 1);
    assert_eq!(snapshot.street, Some(Street::Preflop));
    assert_eq!(snapshot.hole_cards.len(), 2);
    assert!(snapshot.ai_cards.is_empty());
    assert!(snapshot.community_cards.is_empty());
    assert!(snapshot.waiting_for_action);
    assert_eq!(
        snapshot.message.as_deref(),
        Some("Game started! Cards dealt. Make your move!")
    );

    let amounts: Vec<_> = snapshot
        .valid_actions
        .iter()
        .map(|valid| (valid.action, valid.amount))
        .collect();
    assert_eq!(
        amounts,
        vec![
            (ActionKind::Fold, Some(ActionAmount::Fixed(0))),
            (ActionKind::Call, Some(ActionAmount::Fixed(10))),
            (
                ActionKind::Raise,
                Some(ActionAmount::Range(AmountRange { min: 40, max: 980 }))
            ),
        ]
    );
}

#[test]
fn folding_hands_the_pot_to_the_bot() {
    let mut table = table();
    table.start_game();

    let snapshot = table.process_action(ActionKind::Fold, None).unwrap();
    assert!(snapshot.round_ended);
    assert!(!snapshot.waiting_for_action);
    assert!(snapshot.valid_actions.is_empty());
    assert_eq!(snapshot.winner, Some(Winner::Ai));
    assert_eq!(snapshot.players, SeatMap::new(990, 1010));
    assert_eq!(snapshot.pot, 0);
    assert_eq!(snapshot.ai_cards.len(), 2);
    assert_eq!(snapshot.message.as_deref(), Some("AI Bot won! You folded."));

    assert_eq!(
        table.process_action(ActionKind::Call, None),
        Err(TableError::NotWaiting)
    );
}

#[test]
fn called_raise_moves_to_the_flop() {
    let mut table = table();
    table.start_game();

    let snapshot = table.process_action(ActionKind::Raise, Some(100)).unwrap();
    assert_eq!(snapshot.street, Some(Street::Flop));
    assert_eq!(snapshot.community_cards.len(), 3);
    assert_eq!(snapshot.players, SeatMap::new(890, 890));
    assert_eq!(snapshot.pot, 220);
    assert_eq!(snapshot.current_bets, SeatMap::new(0, 0));
    assert!(snapshot.waiting_for_action);
    assert_eq!(snapshot.message.as_deref(), Some("You raised"));
}

#[test]
fn bad_raises_leave_the_hand_untouched() {
    let mut table = table();
    let opening = table.start_game();

    assert_eq!(
        table.process_action(ActionKind::Raise, None),
        Err(TableError::RaiseAmountRequired)
    );
    assert_eq!(
        table.process_action(ActionKind::Raise, Some(0)),
        Err(TableError::NonPositiveRaise)
    );
    let err = table
        .process_action(ActionKind::Raise, Some(5000))
        .unwrap_err();
    assert_eq!(err, TableError::RaiseExceedsStack(990));
    assert_eq!(err.to_string(), "Cannot raise more than your stack ($990)");

    let mut now = table.snapshot(false);
    now.message = opening.message.clone();
    assert_eq!(now, opening);
}

#[test]
fn calling_down_reaches_showdown() {
    let mut table = table();
    table.start_game();

    let mut snapshot = table.process_action(ActionKind::Call, None).unwrap();
    let mut calls = 1;
    while snapshot.waiting_for_action {
        snapshot = table.process_action(ActionKind::Call, None).unwrap();
        calls += 1;
    }

    assert_eq!(calls, 4);
    assert_eq!(snapshot.street, Some(Street::Showdown));
    assert_eq!(snapshot.community_cards.len(), 5);
    assert_eq!(snapshot.pot, 0);
    assert!(snapshot.round_ended);
    assert!(snapshot.winner.is_some());
    assert_eq!(snapshot.players.human + snapshot.players.ai, 2000);
    assert!(snapshot.message.is_some_and(|message| !message.is_empty()));
}

#[test]
fn next_round_waits_for_the_hand_to_finish() {
    let mut table = table();
    table.start_game();
    assert_eq!(table.next_round(), Err(TableError::RoundInProgress));
}

#[test]
fn match_ends_after_the_configured_rounds() {
    let mut table = table_with(TableConfig {
        rounds: 2,
        ..TableConfig::default()
    });
    table.start_game();
    table.process_action(ActionKind::Fold, None).unwrap();

    let second = match table.next_round().unwrap() {
        RoundAdvance::Dealt(snapshot) => snapshot,
        RoundAdvance::Finished(summary) => panic!("ended early: {summary:?}"),
    };
    assert_eq!(second.round_count, 2);
    assert_eq!(second.current_bets, SeatMap::new(20, 10));
    assert_eq!(
        second.message.as_deref(),
        Some("Starting round 2. Cards dealt!")
    );

    table.process_action(ActionKind::Fold, None).unwrap();
    let summary = match table.next_round().unwrap() {
        RoundAdvance::Finished(summary) => summary,
        RoundAdvance::Dealt(_) => panic!("match should be over"),
    };
    assert!(summary.game_finished);
    assert_eq!(summary.winner, Winner::Ai);
    assert_eq!(summary.final_stacks, SeatMap::new(970, 1030));
    assert_eq!(summary.message, "Game finished! AI Bot won!");
    assert!(table.is_finished());

    assert!(matches!(
        table.next_round(),
        Ok(RoundAdvance::Finished(again)) if again == summary
    ));
    assert_eq!(
        table.process_action(ActionKind::Call, None),
        Err(TableError::NotWaiting)
    );
}

#[test]
fn running_out_of_chips_ends_the_game() {
    let mut table = table_with(TableConfig {
        starting_stack: 15,
        ..TableConfig::default()
    });
    let opening = table.start_game();
    assert_eq!(opening.players, SeatMap::new(5, 0));
    assert_eq!(opening.pot, 25);

    let mut snapshot = table.process_action(ActionKind::Call, None).unwrap();
    while snapshot.waiting_for_action {
        snapshot = table.process_action(ActionKind::Call, None).unwrap();
    }

    assert_eq!(snapshot.players.human + snapshot.players.ai, 30);
    if snapshot.final_game {
        assert!(snapshot.game_finished);
        assert!(snapshot.players.human == 0 || snapshot.players.ai == 0);
        let expected = if snapshot.players.human == 0 {
            Winner::Ai
        } else {
            Winner::Human
        };
        assert_eq!(snapshot.winner, Some(expected));
        assert!(matches!(
            table.next_round(),
            Ok(RoundAdvance::Finished(_))
        ));
    } else {
        assert_eq!(snapshot.winner, Some(Winner::Tie));
        assert_eq!(snapshot.players, SeatMap::new(15, 15));
    }
}
