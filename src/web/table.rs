use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cards::{Card, standard_deck};
use crate::game::{
    ActionAmount, ActionKind, AmountRange, GameStateSnapshot, GameSummary, Seat, SeatMap, Street,
    ValidAction, Winner,
};
use crate::hand::best_five_card_hand;

/// Parameters of one match against the bot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableConfig {
    pub rounds: u32,
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
    pub seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            rounds: 10,
            starting_stack: 1000,
            small_blind: 10,
            big_blind: 20,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("Not waiting for action")]
    NotWaiting,
    #[error("Raise amount required")]
    RaiseAmountRequired,
    #[error("Raise amount must be positive")]
    NonPositiveRaise,
    #[error("Cannot raise more than your stack (${0})")]
    RaiseExceedsStack(u32),
    #[error("Round still in progress")]
    RoundInProgress,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoundAdvance {
    Dealt(Box<GameStateSnapshot>),
    Finished(GameSummary),
}

/// Heads-up table: the human against a bot that calls whatever it can afford.
pub struct Table<R = StdRng> {
    rng: R,
    config: TableConfig,
    round: u32,
    finished: bool,
    stacks: SeatMap<u32>,
    deck: Vec<Card>,
    hole: SeatMap<Vec<Card>>,
    board: Vec<Card>,
    pot: u32,
    current_bet: u32,
    bets: SeatMap<u32>,
    street: Street,
    waiting: bool,
    human_on_button: bool,
}

impl Table<StdRng> {
    pub fn new(config: TableConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Table<R> {
    pub fn with_rng(config: TableConfig, rng: R) -> Self {
        let stack = config.starting_stack;
        Self {
            rng,
            config,
            round: 0,
            finished: false,
            stacks: SeatMap::new(stack, stack),
            deck: Vec::new(),
            hole: SeatMap::default(),
            board: Vec::new(),
            pot: 0,
            current_bet: 0,
            bets: SeatMap::default(),
            street: Street::Preflop,
            waiting: false,
            human_on_button: true,
        }
    }

    pub fn stacks(&self) -> SeatMap<u32> {
        self.stacks
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn start_game(&mut self) -> GameStateSnapshot {
        let stack = self.config.starting_stack;
        self.round = 1;
        self.finished = false;
        self.stacks = SeatMap::new(stack, stack);
        self.human_on_button = true;
        self.start_round();

        let mut snapshot = self.snapshot(false);
        snapshot.message = Some("Game started! Cards dealt. Make your move!".to_string());
        snapshot
    }

    fn start_round(&mut self) {
        self.deck = standard_deck();
        self.deck.shuffle(&mut self.rng);

        let (small, big) = if self.human_on_button {
            (Seat::Human, Seat::Ai)
        } else {
            (Seat::Ai, Seat::Human)
        };
        self.bets = SeatMap::default();
        self.post(small, self.config.small_blind);
        self.post(big, self.config.big_blind);
        self.pot = self.bets.human + self.bets.ai;
        self.current_bet = self.config.big_blind;

        let human = vec![self.draw(), self.draw()];
        let ai = vec![self.draw(), self.draw()];
        self.hole = SeatMap::new(human, ai);
        self.board.clear();
        self.street = Street::Preflop;
        self.waiting = true;
        debug!(round = self.round, button = ?small, "round dealt");
    }

    fn post(&mut self, seat: Seat, blind: u32) {
        let paid = blind.min(*self.stacks.get(seat));
        *self.stacks.get_mut(seat) -= paid;
        *self.bets.get_mut(seat) += paid;
    }

    fn draw(&mut self) -> Card {
        self.deck.pop().expect("a fresh deck covers one round")
    }

    pub fn valid_actions(&self) -> Vec<ValidAction> {
        let to_call = self.bets.ai.saturating_sub(self.bets.human);
        let mut actions = vec![
            ValidAction {
                action: ActionKind::Fold,
                amount: Some(ActionAmount::Fixed(0)),
            },
            ValidAction {
                action: ActionKind::Call,
                amount: Some(ActionAmount::Fixed(to_call)),
            },
        ];

        let min = self.config.big_blind.max(self.current_bet * 2);
        let max = self.stacks.human.min(self.stacks.ai);
        if min <= max {
            actions.push(ValidAction {
                action: ActionKind::Raise,
                amount: Some(ActionAmount::Range(AmountRange { min, max })),
            });
        }
        actions
    }

    /// Current state as the human is allowed to see it.
    pub fn snapshot(&self, reveal_ai: bool) -> GameStateSnapshot {
        let bet_label = |bet: u32| {
            if bet > 0 {
                format!("Bet ${bet}")
            } else {
                "-".to_string()
            }
        };

        GameStateSnapshot {
            round_count: self.round,
            street: Some(self.street),
            pot: self.pot,
            players: self.stacks,
            current_bets: self.bets,
            hole_cards: self.hole.human.clone(),
            ai_cards: if reveal_ai {
                self.hole.ai.clone()
            } else {
                Vec::new()
            },
            community_cards: self.board.clone(),
            last_actions: SeatMap::new(bet_label(self.bets.human), bet_label(self.bets.ai)),
            waiting_for_action: self.waiting,
            valid_actions: if self.waiting {
                self.valid_actions()
            } else {
                Vec::new()
            },
            game_finished: self.finished,
            ..GameStateSnapshot::default()
        }
    }

    pub fn process_action(
        &mut self,
        kind: ActionKind,
        amount: Option<i64>,
    ) -> Result<GameStateSnapshot, TableError> {
        if !self.waiting {
            return Err(TableError::NotWaiting);
        }

        let mut snapshot = match kind {
            ActionKind::Fold => {
                self.stacks.ai += self.pot;
                self.pot = 0;
                self.end_round("AI Bot won! You folded.".to_string(), Winner::Ai)
            }
            ActionKind::Call => {
                let to_call = self
                    .bets
                    .ai
                    .saturating_sub(self.bets.human)
                    .min(self.stacks.human);
                self.bets.human += to_call;
                self.stacks.human -= to_call;
                self.pot += to_call;
                self.next_street()
            }
            ActionKind::Raise => {
                let amount = amount.ok_or(TableError::RaiseAmountRequired)?;
                if amount <= 0 {
                    return Err(TableError::NonPositiveRaise);
                }
                if amount > i64::from(self.stacks.human) {
                    return Err(TableError::RaiseExceedsStack(self.stacks.human));
                }
                let amount = amount as u32;
                self.bets.human += amount;
                self.stacks.human -= amount;
                self.pot += amount;
                self.current_bet = self.bets.human;

                let to_call = self.bets.human.saturating_sub(self.bets.ai);
                if to_call <= self.stacks.ai {
                    self.bets.ai += to_call;
                    self.stacks.ai -= to_call;
                    self.pot += to_call;
                    self.next_street()
                } else {
                    self.stacks.human += self.pot;
                    self.pot = 0;
                    self.end_round("You won! AI folded.".to_string(), Winner::Human)
                }
            }
        };

        if snapshot.message.is_none() {
            let verb = match kind {
                ActionKind::Fold => "folded",
                ActionKind::Call => "called",
                ActionKind::Raise => "raised",
            };
            snapshot.message = Some(format!("You {verb}"));
        }
        Ok(snapshot)
    }

    fn next_street(&mut self) -> GameStateSnapshot {
        let (next, deal) = match self.street {
            Street::Preflop => (Street::Flop, 3),
            Street::Flop => (Street::Turn, 1),
            Street::Turn => (Street::River, 1),
            Street::River | Street::Showdown => return self.showdown(),
        };
        for _ in 0..deal {
            let card = self.draw();
            self.board.push(card);
        }
        self.street = next;
        self.bets = SeatMap::default();
        self.waiting = true;
        self.snapshot(false)
    }

    fn showdown(&mut self) -> GameStateSnapshot {
        self.street = Street::Showdown;
        let strength = |hole: &[Card], board: &[Card]| {
            let cards: Vec<Card> = hole.iter().chain(board).copied().collect();
            best_five_card_hand(&cards)
        };
        let human = strength(&self.hole.human, &self.board);
        let ai = strength(&self.hole.ai, &self.board);

        let (human_name, ai_name) = if human.category == ai.category {
            (human.detailed_name(), ai.detailed_name())
        } else {
            (
                human.category.name().to_string(),
                ai.category.name().to_string(),
            )
        };
        debug!(%human_name, %ai_name, "showdown");

        let (winner, message) = match human.cmp(&ai) {
            std::cmp::Ordering::Greater => {
                self.stacks.human += self.pot;
                (
                    Winner::Human,
                    format!("You won with {human_name}! AI had {ai_name}"),
                )
            }
            std::cmp::Ordering::Less => {
                self.stacks.ai += self.pot;
                (
                    Winner::Ai,
                    format!("AI Bot won with {ai_name}! You had {human_name}"),
                )
            }
            std::cmp::Ordering::Equal => {
                let half = self.pot / 2;
                self.stacks.ai += half;
                self.stacks.human += self.pot - half;
                (Winner::Tie, format!("Split pot! Both had {human_name}"))
            }
        };
        self.pot = 0;
        self.end_round(message, winner)
    }

    fn end_round(&mut self, message: String, winner: Winner) -> GameStateSnapshot {
        self.waiting = false;
        if self.stacks.human == 0 {
            return self.end_game(
                Winner::Ai,
                "You ran out of chips! AI Bot wins the game!".to_string(),
            );
        }
        if self.stacks.ai == 0 {
            return self.end_game(
                Winner::Human,
                "AI Bot ran out of chips! You win the game!".to_string(),
            );
        }

        let mut snapshot = self.snapshot(true);
        snapshot.message = Some(message);
        snapshot.round_ended = true;
        snapshot.winner = Some(winner);
        snapshot
    }

    fn end_game(&mut self, winner: Winner, message: String) -> GameStateSnapshot {
        self.finished = true;
        self.waiting = false;

        let mut snapshot = self.snapshot(true);
        snapshot.game_finished = true;
        snapshot.final_game = true;
        snapshot.winner = Some(winner);
        snapshot.message = Some(message);
        snapshot
    }

    pub fn summary(&self) -> GameSummary {
        let winner = match self.stacks.human.cmp(&self.stacks.ai) {
            std::cmp::Ordering::Greater => Winner::Human,
            std::cmp::Ordering::Less => Winner::Ai,
            std::cmp::Ordering::Equal => Winner::Tie,
        };
        let message = match winner {
            Winner::Human => "Game finished! You won!",
            Winner::Ai => "Game finished! AI Bot won!",
            Winner::Tie => "Game finished! It's a tie!",
        };
        GameSummary {
            game_finished: true,
            winner,
            final_stacks: self.stacks,
            message: message.to_string(),
        }
    }

    /// Deals the next round, or reports the result once the match is over.
    pub fn next_round(&mut self) -> Result<RoundAdvance, TableError> {
        if self.finished {
            return Ok(RoundAdvance::Finished(self.summary()));
        }
        if self.waiting {
            return Err(TableError::RoundInProgress);
        }

        self.round += 1;
        if self.round > self.config.rounds {
            self.finished = true;
            return Ok(RoundAdvance::Finished(self.summary()));
        }

        self.human_on_button = !self.human_on_button;
        self.start_round();
        let mut snapshot = self.snapshot(false);
        snapshot.message = Some(format!("Starting round {}. Cards dealt!", self.round));
        Ok(RoundAdvance::Dealt(Box::new(snapshot)))
    }
}
