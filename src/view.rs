//! What the player sees: the board, the input controls, short-lived effects and the log.
//!
//! [`Board`] is a pure function of one snapshot. Everything time-based takes `now`
//! explicitly so callers decide when effects revert.

use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

use tracing::info;

use crate::cards::{Card, CardColor};
use crate::game::{ActionKind, GameStateSnapshot, Seat, SeatMap, Winner};

/// Stack shown before the first snapshot arrives.
pub const STARTING_STACK: u32 = 1000;
pub const FLASH_DURATION: Duration = Duration::from_millis(500);
pub const OVERLAY_DURATION: Duration = Duration::from_secs(5);

pub const START_LABEL: &str = "Start Game";
pub const RESTART_LABEL: &str = "Start New Game";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardFace {
    Up { label: String, color: CardColor },
    Back,
    Empty,
}

impl CardFace {
    pub fn up(card: &Card) -> Self {
        CardFace::Up {
            label: card.label(),
            color: card.color(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            CardFace::Up { label, .. } => label,
            CardFace::Back => "?",
            CardFace::Empty => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub round: u32,
    pub street: String,
    pub pot: u32,
    pub stacks: SeatMap<u32>,
    pub bets: SeatMap<u32>,
    pub hole_cards: Vec<CardFace>,
    pub rival_cards: Vec<CardFace>,
    pub community: Vec<CardFace>,
    pub last_actions: SeatMap<String>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            round: 0,
            street: "-".to_string(),
            pot: 0,
            stacks: SeatMap::new(STARTING_STACK, STARTING_STACK),
            bets: SeatMap::default(),
            hole_cards: Vec::new(),
            rival_cards: vec![CardFace::Back, CardFace::Back],
            community: vec![CardFace::Empty; 5],
            last_actions: SeatMap::new("-".to_string(), "-".to_string()),
        }
    }
}

impl Board {
    pub fn render(snapshot: &GameStateSnapshot) -> Self {
        let rival_cards = if snapshot.ai_cards.is_empty() {
            vec![CardFace::Back, CardFace::Back]
        } else {
            snapshot.ai_cards.iter().map(CardFace::up).collect()
        };
        let community = (0..5)
            .map(|slot| {
                snapshot
                    .community_cards
                    .get(slot)
                    .map_or(CardFace::Empty, CardFace::up)
            })
            .collect();

        Self {
            round: snapshot.round_count,
            street: snapshot
                .street
                .map_or_else(|| "-".to_string(), |street| street.label().to_string()),
            pot: snapshot.pot,
            stacks: snapshot.players,
            bets: snapshot.current_bets,
            hole_cards: snapshot.hole_cards.iter().map(CardFace::up).collect(),
            rival_cards,
            community,
            last_actions: SeatMap::new(
                action_label(&snapshot.last_actions.human),
                action_label(&snapshot.last_actions.ai),
            ),
        }
    }
}

fn action_label(label: &str) -> String {
    if label.is_empty() {
        "-".to_string()
    } else {
        label.to_string()
    }
}

/// Raise amount entry, seeded from the server's advisory bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaisePrompt {
    pub min: u32,
    pub max: u32,
    pub value: u32,
}

impl RaisePrompt {
    pub fn for_snapshot(snapshot: Option<&GameStateSnapshot>) -> Self {
        let stack = snapshot
            .map(|s| s.players.human)
            .filter(|stack| *stack > 0)
            .unwrap_or(STARTING_STACK);
        let range = snapshot
            .and_then(|s| s.valid_action(ActionKind::Raise))
            .and_then(|valid| valid.range());
        match range {
            Some(range) => {
                let max = if range.max > 0 { range.max } else { stack };
                Self {
                    min: range.min,
                    max,
                    value: range.min,
                }
            }
            None => Self {
                min: 0,
                max: stack,
                value: 0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub fold: bool,
    pub call: bool,
    pub raise: bool,
    pub next_round: bool,
    /// Label of the start trigger when it is shown.
    pub start: Option<&'static str>,
}

impl Controls {
    pub fn initial() -> Self {
        Self {
            fold: false,
            call: false,
            raise: false,
            next_round: false,
            start: Some(START_LABEL),
        }
    }

    fn game_over() -> Self {
        Self {
            start: Some(RESTART_LABEL),
            ..Self::locked()
        }
    }

    fn locked() -> Self {
        Self {
            fold: false,
            call: false,
            raise: false,
            next_round: false,
            start: None,
        }
    }

    /// Inputs implied by the last known snapshot, or by a finished match.
    pub fn derive(snapshot: Option<&GameStateSnapshot>, finished: bool) -> Self {
        if finished {
            return Self::game_over();
        }
        let Some(snapshot) = snapshot else {
            return Self::initial();
        };
        if snapshot.is_game_over() {
            return Self::game_over();
        }
        Self {
            fold: snapshot.permits(ActionKind::Fold),
            call: snapshot.permits(ActionKind::Call),
            raise: snapshot.permits(ActionKind::Raise),
            next_round: snapshot.round_ended || snapshot.round_result.is_some(),
            start: None,
        }
    }

    /// Disables every input while a request is in flight.
    pub fn lock(&mut self) {
        *self = Self::locked();
    }

    pub fn enabled(&self, kind: ActionKind) -> bool {
        match kind {
            ActionKind::Fold => self.fold,
            ActionKind::Call => self.call,
            ActionKind::Raise => self.raise,
        }
    }

    pub fn any_action(&self) -> bool {
        ActionKind::ALL.iter().any(|kind| self.enabled(*kind))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackChange {
    Decrease,
    Increase,
}

/// Remembers the last rendered stacks to pick the flash direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackTracker {
    previous: SeatMap<u32>,
}

impl Default for StackTracker {
    fn default() -> Self {
        Self {
            previous: SeatMap::new(STARTING_STACK, STARTING_STACK),
        }
    }
}

impl StackTracker {
    pub fn observe(&mut self, stacks: SeatMap<u32>) -> SeatMap<Option<StackChange>> {
        let change = |before: u32, after: u32| match after.cmp(&before) {
            std::cmp::Ordering::Less => Some(StackChange::Decrease),
            std::cmp::Ordering::Greater => Some(StackChange::Increase),
            std::cmp::Ordering::Equal => None,
        };
        let changes = SeatMap::new(
            change(self.previous.human, stacks.human),
            change(self.previous.ai, stacks.ai),
        );
        self.previous = stacks;
        changes
    }

    pub fn previous(&self) -> SeatMap<u32> {
        self.previous
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flash {
    pub change: StackChange,
    pub until: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub winner: Winner,
    pub details: String,
    pub until: Instant,
}

impl Overlay {
    pub fn headline(&self) -> &'static str {
        match self.winner {
            Winner::Human => "YOU WIN",
            Winner::Ai => "AI WINS",
            Winner::Tie => "TIE",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Effects {
    flashes: SeatMap<Option<Flash>>,
    overlay: Option<Overlay>,
}

impl Effects {
    /// Starts a flash on `seat`, replacing any flash still running there.
    pub fn flash(&mut self, seat: Seat, change: StackChange, now: Instant, duration: Duration) {
        *self.flashes.get_mut(seat) = Some(Flash {
            change,
            until: now + duration,
        });
    }

    pub fn flash_on(&self, seat: Seat) -> Option<StackChange> {
        self.flashes.get(seat).as_ref().map(|flash| flash.change)
    }

    pub fn show_overlay(&mut self, winner: Winner, details: String, now: Instant, duration: Duration) {
        self.overlay = Some(Overlay {
            winner,
            details,
            until: now + duration,
        });
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    /// Reverts every effect whose time is up.
    pub fn tick(&mut self, now: Instant) {
        for seat in Seat::BOTH {
            let slot = self.flashes.get_mut(seat);
            if slot.is_some_and(|flash| flash.until <= now) {
                *slot = None;
            }
        }
        if self.overlay.as_ref().is_some_and(|overlay| overlay.until <= now) {
            self.overlay = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub elapsed: Duration,
    pub message: String,
}

impl Display for LogEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let secs = self.elapsed.as_secs();
        write!(f, "[{:02}:{:02}] {}", secs / 60, secs % 60, self.message)
    }
}

/// Append-only record of what happened, stamped relative to the session start.
#[derive(Debug, Clone)]
pub struct GameLog {
    started: Instant,
    entries: Vec<LogEntry>,
}

impl GameLog {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, now: Instant, message: impl Into<String>) {
        let message = message.into();
        info!(target: "heads_up::log", "{message}");
        self.entries.push(LogEntry {
            elapsed: now.saturating_duration_since(self.started),
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn since(&self, index: usize) -> &[LogEntry] {
        self.entries.get(index..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.message.as_str())
    }
}
