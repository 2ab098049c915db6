use heads_up::game::{
    ActionAmount, ActionKind, AmountRange, GameStateSnapshot, Seat, SeatMap, Street, ValidAction,
    Winner,
};
use heads_up::session::{Phase, Session, SessionConfig};
use heads_up::view::{CardFace, RESTART_LABEL, StackChange};

fn valid(action: ActionKind) -> ValidAction {
    ValidAction {
        action,
        amount: None,
    }
}

fn opening_snapshot() -> GameStateSnapshot {
    GameStateSnapshot {
        round_count: 1,
        street: Some(Street::Preflop),
        pot: 30,
        players: SeatMap::new(1000, 1000),
        hole_cards: vec!["HA".parse().unwrap(), "DT".parse().unwrap()],
        waiting_for_action: true,
        valid_actions: vec![
            valid(ActionKind::Fold),
            valid(ActionKind::Call),
            ValidAction {
                action: ActionKind::Raise,
                amount: Some(ActionAmount::Range(AmountRange { min: 20, max: 1000 })),
            },
        ],
        ..GameStateSnapshot::default()
    }
}

fn fresh() -> Session<()> {
    Session::new((), SessionConfig::default())
}

#[test]
fn all_listed_actions_are_enabled_on_our_turn() {
    let mut session = fresh();
    session.reconcile(opening_snapshot());

    let controls = session.controls();
    assert!(controls.fold && controls.call && controls.raise);
    assert!(!controls.next_round);
    assert_eq!(controls.start, None);
    assert_eq!(session.phase(), Phase::AwaitingTurn);
}

#[test]
fn buttons_follow_turn_flag_and_valid_actions() {
    let mut session = fresh();

    let mut snapshot = opening_snapshot();
    snapshot.valid_actions.retain(|valid| valid.action != ActionKind::Raise);
    session.reconcile(snapshot.clone());
    assert!(session.controls().fold);
    assert!(session.controls().call);
    assert!(!session.controls().raise);

    snapshot.waiting_for_action = false;
    session.reconcile(snapshot);
    assert!(!session.controls().any_action());
    assert_eq!(session.phase(), Phase::Idle);
}

#[test]
fn reconciling_twice_is_idempotent() {
    let mut session = fresh();
    let mut snapshot = opening_snapshot();
    snapshot.players = SeatMap::new(1200, 800);
    snapshot.round_ended = true;
    snapshot.waiting_for_action = false;
    snapshot.winner = Some(Winner::Human);
    snapshot.message = Some("You won! AI folded.".to_string());

    session.reconcile(snapshot.clone());
    let board = session.board().clone();
    let controls = session.controls().clone();
    let log_len = session.log().len();
    let overlay = session.effects().overlay().cloned();
    let flashes = (
        session.effects().flash_on(Seat::Human),
        session.effects().flash_on(Seat::Ai),
    );
    assert_eq!(
        flashes,
        (Some(StackChange::Increase), Some(StackChange::Decrease))
    );

    session.reconcile(snapshot);
    assert_eq!(
        (
            session.effects().flash_on(Seat::Human),
            session.effects().flash_on(Seat::Ai),
        ),
        flashes
    );
    assert_eq!(session.board(), &board);
    assert_eq!(session.controls(), &controls);
    assert_eq!(session.log().len(), log_len);
    assert_eq!(session.effects().overlay().cloned(), overlay);
}

#[test]
fn losing_chips_flashes_a_decrease_only() {
    let mut session = fresh();
    session.reconcile(opening_snapshot());
    assert_eq!(session.effects().flash_on(Seat::Human), None);

    let mut after_bet = opening_snapshot();
    after_bet.players = SeatMap::new(980, 1000);
    session.reconcile(after_bet);

    assert_eq!(
        session.effects().flash_on(Seat::Human),
        Some(StackChange::Decrease)
    );
    assert_ne!(
        session.effects().flash_on(Seat::Human),
        Some(StackChange::Increase)
    );
    assert_eq!(session.effects().flash_on(Seat::Ai), None);
    assert_eq!(session.board().stacks.human, 980);
}

#[test]
fn board_renders_hidden_and_empty_cards() {
    let mut session = fresh();
    session.reconcile(opening_snapshot());

    let board = session.board();
    assert_eq!(board.street, "preflop");
    assert_eq!(board.rival_cards, vec![CardFace::Back, CardFace::Back]);
    assert_eq!(board.community.len(), 5);
    assert!(board.community.iter().all(|card| *card == CardFace::Empty));
    let labels: Vec<&str> = board.hole_cards.iter().map(CardFace::text).collect();
    assert_eq!(labels, vec!["A♥", "10♦"]);
    assert_eq!(board.last_actions.human, "-");
}

#[test]
fn round_end_offers_next_round_and_announces_winner() {
    let mut session = fresh();
    let mut snapshot = opening_snapshot();
    snapshot.round_count = 3;
    snapshot.waiting_for_action = false;
    snapshot.valid_actions.clear();
    snapshot.round_ended = true;
    snapshot.winner = Some(Winner::Human);
    snapshot.message = Some("You won with Flush! AI had One Pair".to_string());
    snapshot.ai_cards = vec!["C2".parse().unwrap(), "S7".parse().unwrap()];

    session.reconcile(snapshot);

    assert!(session.controls().next_round);
    assert!(!session.controls().any_action());
    assert_eq!(session.phase(), Phase::RoundEnded);
    let overlay = session.effects().overlay().expect("winner overlay");
    assert_eq!(overlay.headline(), "YOU WIN");
    assert_eq!(
        session.log().last_message(),
        Some("Round 3: You won with Flush! AI had One Pair")
    );
    assert!(matches!(session.board().rival_cards[0], CardFace::Up { .. }));
}

#[test]
fn final_game_freezes_inputs_and_offers_a_new_game() {
    let mut session = fresh();
    let mut snapshot = opening_snapshot();
    snapshot.players = SeatMap::new(0, 2000);
    snapshot.final_game = true;
    snapshot.game_finished = true;
    snapshot.winner = Some(Winner::Ai);
    snapshot.message = Some("You ran out of chips! AI Bot wins the game!".to_string());

    session.reconcile(snapshot);

    let controls = session.controls();
    assert!(!controls.any_action());
    assert!(!controls.next_round);
    assert_eq!(controls.start, Some(RESTART_LABEL));
    assert_eq!(session.phase(), Phase::GameOver);
    assert_eq!(
        session.log().last_message(),
        Some("GAME OVER: You ran out of chips! AI Bot wins the game!")
    );
    assert_eq!(
        session.effects().overlay().map(|o| o.headline()),
        Some("AI WINS")
    );
}

#[test]
fn round_result_is_logged_with_the_winner() {
    use heads_up::game::{RoundResult, RoundWinner};

    let mut session = fresh();
    let mut snapshot = opening_snapshot();
    snapshot.waiting_for_action = false;
    snapshot.round_result = Some(RoundResult {
        winners: vec![RoundWinner {
            name: "AI Bot".to_string(),
            amount: 60,
        }],
    });

    session.reconcile(snapshot);
    assert_eq!(
        session.log().last_message(),
        Some("Round ended! Winner: AI Bot won $60")
    );
    assert!(session.controls().next_round);
    assert_eq!(session.phase(), Phase::RoundEnded);
}

#[test]
fn effects_expire_on_tick() {
    use std::time::{Duration, Instant};

    let mut session = fresh();
    let start = Instant::now();
    session.reconcile_at(opening_snapshot(), start);

    let mut lost = opening_snapshot();
    lost.players = SeatMap::new(0, 2000);
    lost.final_game = true;
    lost.winner = Some(Winner::Ai);
    session.reconcile_at(lost, start);
    assert!(session.effects().flash_on(Seat::Human).is_some());
    assert!(session.effects().overlay().is_some());

    session.tick(start + Duration::from_millis(600));
    assert_eq!(session.effects().flash_on(Seat::Human), None);
    assert!(session.effects().overlay().is_some());

    session.tick(start + Duration::from_secs(5));
    assert!(session.effects().overlay().is_none());
}
