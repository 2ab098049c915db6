//! JSON shapes exchanged between the table server and its client.

use serde::{Deserialize, Serialize};

use crate::cards::Card;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    pub fn label(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Showdown => "showdown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Seat {
    Human,
    Ai,
}

impl Seat {
    pub const BOTH: [Seat; 2] = [Seat::Human, Seat::Ai];
}

/// One value per seat, serialized as `{"human": .., "ai": ..}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SeatMap<T> {
    pub human: T,
    pub ai: T,
}

impl<T> SeatMap<T> {
    pub fn new(human: T, ai: T) -> Self {
        Self { human, ai }
    }

    pub fn get(&self, seat: Seat) -> &T {
        match seat {
            Seat::Human => &self.human,
            Seat::Ai => &self.ai,
        }
    }

    pub fn get_mut(&mut self, seat: Seat) -> &mut T {
        match seat {
            Seat::Human => &mut self.human,
            Seat::Ai => &mut self.ai,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Fold,
    Call,
    Raise,
}

impl ActionKind {
    pub const ALL: [ActionKind; 3] = [ActionKind::Fold, ActionKind::Call, ActionKind::Raise];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AmountRange {
    pub min: u32,
    pub max: u32,
}

/// Fold and call carry the chips involved, raise carries the permitted range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ActionAmount {
    Fixed(u32),
    Range(AmountRange),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidAction {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<ActionAmount>,
}

impl ValidAction {
    pub fn range(&self) -> Option<AmountRange> {
        match self.amount {
            Some(ActionAmount::Range(range)) => Some(range),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    Human,
    Ai,
    Tie,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundWinner {
    pub name: String,
    pub amount: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RoundResult {
    #[serde(default)]
    pub winners: Vec<RoundWinner>,
}

/// Complete server-authoritative table state, sent after every transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GameStateSnapshot {
    #[serde(default)]
    pub round_count: u32,
    #[serde(default)]
    pub street: Option<Street>,
    #[serde(default)]
    pub pot: u32,
    pub players: SeatMap<u32>,
    #[serde(default)]
    pub current_bets: SeatMap<u32>,
    #[serde(default)]
    pub hole_cards: Vec<Card>,
    #[serde(default)]
    pub ai_cards: Vec<Card>,
    #[serde(default)]
    pub community_cards: Vec<Card>,
    #[serde(default)]
    pub last_actions: SeatMap<String>,
    #[serde(default)]
    pub waiting_for_action: bool,
    #[serde(default)]
    pub valid_actions: Vec<ValidAction>,
    #[serde(default)]
    pub round_result: Option<RoundResult>,
    #[serde(default)]
    pub round_ended: bool,
    #[serde(default)]
    pub final_game: bool,
    #[serde(default)]
    pub game_finished: bool,
    #[serde(default)]
    pub winner: Option<Winner>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GameStateSnapshot {
    pub fn is_game_over(&self) -> bool {
        self.final_game || self.game_finished
    }

    /// True when the server is waiting on us and lists `kind` among its valid actions.
    pub fn permits(&self, kind: ActionKind) -> bool {
        self.waiting_for_action && self.valid_actions.iter().any(|valid| valid.action == kind)
    }

    pub fn valid_action(&self, kind: ActionKind) -> Option<&ValidAction> {
        self.valid_actions.iter().find(|valid| valid.action == kind)
    }
}

/// Reply of `/next_round` once the match is decided.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSummary {
    pub game_finished: bool,
    pub winner: Winner,
    pub final_stacks: SeatMap<u32>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
}

impl ActionRequest {
    pub fn new(action: ActionKind, amount: Option<i64>) -> Self {
        Self { action, amount }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}
