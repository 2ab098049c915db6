use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{ClientError, Endpoint, GameServer, Reply};
use crate::game::{ActionKind, ActionRequest, GameStateSnapshot, GameSummary, Seat, Winner};
use crate::view::{
    Board, Controls, Effects, FLASH_DURATION, GameLog, OVERLAY_DURATION, RaisePrompt,
    StackTracker,
};

/// Timing of the client-side effects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(with = "millis")]
    pub flash: Duration,
    #[serde(with = "millis")]
    pub overlay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flash: FLASH_DURATION,
            overlay: OVERLAY_DURATION,
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, ser};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).map_err(ser::Error::custom)?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    AwaitingTurn,
    Acting,
    RoundEnded,
    GameOver,
}

/// What became of a user event.
#[derive(Debug)]
pub enum Outcome {
    /// Inputs were not available; nothing happened.
    Ignored,
    /// Input failed local validation; nothing was sent.
    Rejected,
    /// The raise prompt is open.
    Prompted(RaisePrompt),
    /// The server answered and the view was reconciled.
    Synced(Phase),
    /// The request failed and inputs were restored.
    Failed(ClientError),
}

/// A request whose inputs are already locked, waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingRequest {
    pub endpoint: Endpoint,
    pub body: Option<ActionRequest>,
}

/// One game session as seen by the client.
///
/// The server owns the game. The session keeps the last snapshot it rendered, the
/// previous stacks (for the flash direction) and whether a request is in flight.
/// Requests go through [`Session::begin_action`] and friends, which lock the inputs and
/// hand back a [`PendingRequest`], and [`Session::complete`], which reconciles the reply
/// or restores the inputs. The async helpers chain the two around the transport.
pub struct Session<S> {
    server: S,
    config: SessionConfig,
    last: Option<GameStateSnapshot>,
    summary: Option<GameSummary>,
    stacks: StackTracker,
    board: Board,
    controls: Controls,
    raise_prompt: Option<RaisePrompt>,
    effects: Effects,
    log: GameLog,
    in_flight: Option<Endpoint>,
}

impl<S> Session<S> {
    pub fn new(server: S, config: SessionConfig) -> Self {
        let started = Instant::now();
        let mut log = GameLog::new(started);
        log.push(started, "Welcome to Poker vs AI Bot!");
        log.push(started, "Start a new game to begin.");

        Self {
            server,
            config,
            last: None,
            summary: None,
            stacks: StackTracker::default(),
            board: Board::default(),
            controls: Controls::initial(),
            raise_prompt: None,
            effects: Effects::default(),
            log,
            in_flight: None,
        }
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn effects(&self) -> &Effects {
        &self.effects
    }

    pub fn log(&self) -> &GameLog {
        &self.log
    }

    pub fn raise_prompt(&self) -> Option<&RaisePrompt> {
        self.raise_prompt.as_ref()
    }

    pub fn last_snapshot(&self) -> Option<&GameStateSnapshot> {
        self.last.as_ref()
    }

    pub fn summary(&self) -> Option<&GameSummary> {
        self.summary.as_ref()
    }

    pub fn awaiting_server(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.in_flight.is_some() {
            return Phase::Acting;
        }
        if self.summary.is_some() {
            return Phase::GameOver;
        }
        match &self.last {
            Some(s) if s.is_game_over() => Phase::GameOver,
            Some(s) if s.round_ended || s.round_result.is_some() => Phase::RoundEnded,
            Some(s) if s.waiting_for_action => Phase::AwaitingTurn,
            _ => Phase::Idle,
        }
    }

    pub fn tick(&mut self, now: Instant) {
        self.effects.tick(now);
    }

    pub fn reconcile(&mut self, snapshot: GameStateSnapshot) {
        self.reconcile_at(snapshot, Instant::now());
    }

    /// Re-derives the whole view from `snapshot`.
    ///
    /// A snapshot equal to the previous one renders the same view and triggers no
    /// effects or log lines.
    pub fn reconcile_at(&mut self, snapshot: GameStateSnapshot, now: Instant) {
        let repeat = self.last.as_ref() == Some(&snapshot);

        self.board = Board::render(&snapshot);
        self.controls = Controls::derive(Some(&snapshot), false);
        if !self.controls.raise {
            self.raise_prompt = None;
        }
        self.summary = None;

        let changes = self.stacks.observe(snapshot.players);
        for seat in Seat::BOTH {
            if let Some(change) = *changes.get(seat) {
                self.effects.flash(seat, change, now, self.config.flash);
            }
        }

        if !repeat {
            self.announce(&snapshot, now);
        }
        self.last = Some(snapshot);
    }

    fn announce(&mut self, snapshot: &GameStateSnapshot, now: Instant) {
        if let Some(result) = &snapshot.round_result {
            let line = match result.winners.first() {
                Some(winner) => {
                    format!("Round ended! Winner: {} won ${}", winner.name, winner.amount)
                }
                None => "Round ended!".to_string(),
            };
            self.log.push(now, line);
        }

        let message = snapshot.message.clone().unwrap_or_default();
        if snapshot.round_ended && !snapshot.final_game {
            if let Some(winner) = snapshot.winner {
                self.effects
                    .show_overlay(winner, message.clone(), now, self.config.overlay);
            }
            if snapshot.message.is_some() {
                self.log
                    .push(now, format!("Round {}: {message}", snapshot.round_count));
            }
        }

        if snapshot.is_game_over() {
            info!(round = snapshot.round_count, "game over");
            if let Some(winner) = snapshot.winner {
                self.effects
                    .show_overlay(winner, message.clone(), now, self.config.overlay);
            }
            if snapshot.message.is_some() {
                self.log.push(now, format!("GAME OVER: {message}"));
            }
        }
    }

    fn turn_open(&self) -> bool {
        self.in_flight.is_none() && self.last.as_ref().is_some_and(|s| s.waiting_for_action)
    }

    fn lock(&mut self, endpoint: Endpoint, body: Option<ActionRequest>) -> PendingRequest {
        self.controls.lock();
        self.raise_prompt = None;
        self.in_flight = Some(endpoint);
        debug!(endpoint = endpoint.path(), "inputs locked");
        PendingRequest { endpoint, body }
    }

    fn restore_controls(&mut self) {
        self.controls = Controls::derive(self.last.as_ref(), self.summary.is_some());
    }

    /// Opens the raise prompt, pre-filled from the server's advisory bounds.
    pub fn open_raise_prompt(&mut self) -> Outcome {
        if !self.turn_open() || !self.controls.raise {
            return Outcome::Ignored;
        }
        let prompt = RaisePrompt::for_snapshot(self.last.as_ref());
        self.raise_prompt = Some(prompt);
        Outcome::Prompted(prompt)
    }

    pub fn cancel_raise(&mut self) {
        self.raise_prompt = None;
    }

    /// Validates an action and locks the inputs for it.
    pub fn begin_action(
        &mut self,
        kind: ActionKind,
        amount: Option<i64>,
    ) -> Result<PendingRequest, Outcome> {
        let now = Instant::now();
        // raise amounts are validated even while inputs are unavailable
        let (amount, line) = match kind {
            ActionKind::Fold => (None, "You folded".to_string()),
            ActionKind::Call => (None, "You called".to_string()),
            ActionKind::Raise => match amount {
                Some(amount) if amount > 0 => (Some(amount), format!("You raised to ${amount}")),
                _ => {
                    self.log.push(now, "Invalid raise amount");
                    return Err(Outcome::Rejected);
                }
            },
        };

        if !self.turn_open() || !self.controls.enabled(kind) {
            debug!(?kind, "action ignored, inputs unavailable");
            return Err(Outcome::Ignored);
        }

        self.log.push(now, line);
        Ok(self.lock(Endpoint::Action, Some(ActionRequest::new(kind, amount))))
    }

    pub fn begin_start(&mut self) -> Result<PendingRequest, Outcome> {
        if self.in_flight.is_some() || self.controls.start.is_none() {
            return Err(Outcome::Ignored);
        }
        let now = Instant::now();
        self.log.push(now, "========================================");
        self.log.push(now, "NEW GAME STARTED");
        self.log.push(now, "========================================");
        Ok(self.lock(Endpoint::StartGame, None))
    }

    pub fn begin_next_round(&mut self) -> Result<PendingRequest, Outcome> {
        if self.in_flight.is_some() || !self.controls.next_round {
            return Err(Outcome::Ignored);
        }
        Ok(self.lock(Endpoint::NextRound, None))
    }

    pub fn complete(
        &mut self,
        pending: PendingRequest,
        result: Result<Reply, ClientError>,
    ) -> Outcome {
        self.complete_at(pending, result, Instant::now())
    }

    /// Applies the reply to `pending`: reconcile on success, restore inputs on failure.
    pub fn complete_at(
        &mut self,
        pending: PendingRequest,
        result: Result<Reply, ClientError>,
        now: Instant,
    ) -> Outcome {
        self.in_flight = None;

        match result {
            Err(err) => {
                warn!(endpoint = pending.endpoint.path(), error = %err, "request failed");
                let line = match pending.endpoint {
                    Endpoint::StartGame => format!("Error starting game: {err}"),
                    Endpoint::Action | Endpoint::NextRound => format!("Error: {err}"),
                };
                self.log.push(now, line);
                self.restore_controls();
                Outcome::Failed(err)
            }
            Ok(Reply::State(snapshot)) => {
                match pending.endpoint {
                    Endpoint::StartGame => self.log.push(
                        now,
                        format!("Round {}: Cards dealt. Good luck!", snapshot.round_count),
                    ),
                    Endpoint::NextRound => self
                        .log
                        .push(now, format!("Round {}: Cards dealt.", snapshot.round_count)),
                    Endpoint::Action => {}
                }
                self.reconcile_at(*snapshot, now);
                Outcome::Synced(self.phase())
            }
            Ok(Reply::Finished(summary)) => {
                self.finish(summary, now);
                Outcome::Synced(self.phase())
            }
        }
    }

    fn finish(&mut self, summary: GameSummary, now: Instant) {
        info!(winner = ?summary.winner, "match finished");
        self.log.push(now, summary.message.clone());
        let line = match summary.winner {
            Winner::Human => format!("Game Over! You won with ${}!", summary.final_stacks.human),
            Winner::Ai => format!("Game Over! AI Bot won with ${}!", summary.final_stacks.ai),
            Winner::Tie => format!(
                "Game Over! Tie with ${} each!",
                summary.final_stacks.human
            ),
        };
        self.log.push(now, line);
        self.summary = Some(summary);
        self.restore_controls();
    }
}

impl<S: GameServer> Session<S> {
    async fn send(&mut self, pending: PendingRequest) -> Outcome {
        let result = self
            .server
            .exchange(pending.endpoint, pending.body.as_ref())
            .await;
        self.complete(pending, result)
    }

    pub async fn start_game(&mut self) -> Outcome {
        match self.begin_start() {
            Ok(pending) => self.send(pending).await,
            Err(outcome) => outcome,
        }
    }

    pub async fn dispatch_action(&mut self, kind: ActionKind, amount: Option<i64>) -> Outcome {
        match self.begin_action(kind, amount) {
            Ok(pending) => self.send(pending).await,
            Err(outcome) => outcome,
        }
    }

    /// Button press: fold and call go straight out, raise opens the prompt.
    pub async fn press(&mut self, kind: ActionKind) -> Outcome {
        match kind {
            ActionKind::Raise => self.open_raise_prompt(),
            ActionKind::Fold | ActionKind::Call => self.dispatch_action(kind, None).await,
        }
    }

    /// Submits the raise prompt's text. Unparseable or non-positive input is rejected locally.
    pub async fn confirm_raise(&mut self, input: &str) -> Outcome {
        let amount = input.trim().parse::<i64>().ok();
        self.dispatch_action(ActionKind::Raise, amount).await
    }

    pub async fn next_round(&mut self) -> Outcome {
        match self.begin_next_round() {
            Ok(pending) => self.send(pending).await,
            Err(outcome) => outcome,
        }
    }
}
