use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cards::CardColor;
use crate::client::GameServer;
use crate::game::{ActionKind, Seat, SeatMap, Winner};
use crate::session::{Outcome, Phase, Session, SessionConfig};
use crate::view::{Board, CardFace, Controls, Effects, StackChange};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub server_url: String,
    pub no_color: bool,
    pub session: SessionConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            no_color: false,
            session: SessionConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Reads a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config file '{}'", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Fold,
    Call,
    Raise(Option<String>),
    CancelRaise,
    NextRound,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim().to_lowercase();
    let mut parts = trimmed.split_whitespace();
    let head = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::to_string);
    match head {
        "s" | "start" => Command::Start,
        "f" | "fold" => Command::Fold,
        "c" | "call" | "check" => Command::Call,
        "r" | "raise" => Command::Raise(arg),
        "x" | "cancel" => Command::CancelRaise,
        "n" | "next" => Command::NextRound,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(line.trim().to_string()),
    }
}

/// How a finished (or abandoned) match ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayReport {
    pub rounds: u32,
    pub final_stacks: SeatMap<u32>,
    pub winner: Option<Winner>,
    pub message: String,
}

pub struct Console<S> {
    config: ConsoleConfig,
    session: Session<S>,
    printed: usize,
}

impl<S: GameServer> Console<S> {
    pub fn new(server: S, config: ConsoleConfig) -> Self {
        let session = Session::new(server, config.session);
        Self {
            config,
            session,
            printed: 0,
        }
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        self.print_update();

        loop {
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            let outcome = match parse_command(&line) {
                Command::Quit => break,
                Command::Help => {
                    print_help();
                    continue;
                }
                Command::Unknown(text) => {
                    println!("Unknown command '{text}'. Press 'h' for help.");
                    continue;
                }
                Command::Start => self.session.start_game().await,
                Command::Fold => self.session.press(ActionKind::Fold).await,
                Command::Call => self.session.press(ActionKind::Call).await,
                Command::Raise(None) => self.session.press(ActionKind::Raise).await,
                Command::Raise(Some(amount)) => self.session.confirm_raise(&amount).await,
                Command::CancelRaise => {
                    self.session.cancel_raise();
                    println!("Raise cancelled.");
                    continue;
                }
                Command::NextRound => self.session.next_round().await,
            };

            match outcome {
                Outcome::Ignored => println!("That is not available right now."),
                Outcome::Prompted(prompt) => println!(
                    "Raise between ${} and ${} with 'r <amount>' (suggested ${}), 'x' to cancel.",
                    prompt.min, prompt.max, prompt.value
                ),
                Outcome::Rejected | Outcome::Synced(_) | Outcome::Failed(_) => {}
            }
            self.session.tick(Instant::now());
            self.print_update();
        }

        let report = self.report();
        self.print_summary(&report);
        Ok(())
    }

    /// Plays a whole match by calling every street, for smoke tests.
    pub async fn autoplay(&mut self) -> Result<PlayReport> {
        if let Outcome::Failed(err) = self.session.start_game().await {
            return Err(err.into());
        }
        self.print_update();

        loop {
            let outcome = match self.session.phase() {
                Phase::GameOver => break,
                Phase::AwaitingTurn => self.session.dispatch_action(ActionKind::Call, None).await,
                Phase::RoundEnded => self.session.next_round().await,
                phase @ (Phase::Idle | Phase::Acting) => bail!("table stalled in {phase:?}"),
            };
            match outcome {
                Outcome::Synced(_) => {}
                Outcome::Failed(err) => return Err(err.into()),
                other => bail!("autoplay could not act: {other:?}"),
            }
            self.print_update();
        }

        Ok(self.report())
    }

    pub fn report(&self) -> PlayReport {
        if let Some(summary) = self.session.summary() {
            return PlayReport {
                rounds: self.session.board().round,
                final_stacks: summary.final_stacks,
                winner: Some(summary.winner),
                message: summary.message.clone(),
            };
        }
        let board = self.session.board();
        let last = self.session.last_snapshot();
        PlayReport {
            rounds: board.round,
            final_stacks: board.stacks,
            winner: last.and_then(|s| s.winner),
            message: last.and_then(|s| s.message.clone()).unwrap_or_default(),
        }
    }

    fn print_update(&mut self) {
        let paint = !self.config.no_color;
        for line in board_lines(self.session.board(), self.session.effects(), paint) {
            println!("{line}");
        }
        println!("{}", controls_line(self.session.controls(), paint));
        for entry in self.session.log().since(self.printed) {
            println!("  {entry}");
        }
        self.printed = self.session.log().len();
    }

    pub fn print_summary(&self, report: &PlayReport) {
        let winner = match report.winner {
            Some(Winner::Human) => "you",
            Some(Winner::Ai) => "bot",
            Some(Winner::Tie) => "tie",
            None => "undecided",
        };
        if self.config.no_color {
            println!(
                "Summary: rounds={}, you=${}, bot=${}, winner={}",
                report.rounds, report.final_stacks.human, report.final_stacks.ai, winner
            );
        } else {
            println!(
                "{} {} {} ${} {} ${} {} {}",
                "Summary".bold().magenta(),
                report.rounds,
                "You".bold().white(),
                report.final_stacks.human,
                "Bot".bold().white(),
                report.final_stacks.ai,
                "Winner".bold().white(),
                winner.bold().yellow()
            );
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  s          start a game");
    println!("  f          fold");
    println!("  c          call (or check)");
    println!("  r          open the raise prompt");
    println!("  r <amount> raise by <amount>");
    println!("  x          cancel the raise prompt");
    println!("  n          deal the next round");
    println!("  h          this help");
    println!("  q          quit");
}

fn face(card: &CardFace, paint: bool) -> String {
    match card {
        CardFace::Up {
            label,
            color: CardColor::Red,
        } if paint => label.red().bold().to_string(),
        CardFace::Up { label, .. } if paint => label.bold().to_string(),
        other => other.text().to_string(),
    }
}

fn faces(cards: &[CardFace], paint: bool) -> String {
    if cards.is_empty() {
        return "--".to_string();
    }
    cards
        .iter()
        .map(|card| face(card, paint))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text rendering of the board, one line per area.
pub fn board_lines(board: &Board, effects: &Effects, paint: bool) -> Vec<String> {
    let marker = |seat: Seat| match effects.flash_on(seat) {
        Some(StackChange::Decrease) => " ▼",
        Some(StackChange::Increase) => " ▲",
        None => "",
    };
    let seat_line = |name: &str, seat: Seat, cards: &[CardFace]| {
        let stack = format!("${}{}", board.stacks.get(seat), marker(seat));
        let stack = match effects.flash_on(seat) {
            Some(StackChange::Decrease) if paint => stack.red().to_string(),
            Some(StackChange::Increase) if paint => stack.green().to_string(),
            _ => stack,
        };
        format!(
            "{name:<4}{stack} (bet ${}) [{}] last: {}",
            board.bets.get(seat),
            faces(cards, paint),
            board.last_actions.get(seat)
        )
    };

    let header = format!("Round {} | {} | Pot ${}", board.round, board.street, board.pot);
    let mut lines = vec![
        if paint {
            header.bold().cyan().to_string()
        } else {
            header
        },
        seat_line("You", Seat::Human, board.hole_cards.as_slice()),
        seat_line("Bot", Seat::Ai, board.rival_cards.as_slice()),
        format!("Board [{}]", faces(&board.community, paint)),
    ];
    if let Some(overlay) = effects.overlay() {
        let banner = format!("*** {} *** {}", overlay.headline(), overlay.details);
        lines.push(if paint {
            banner.bold().yellow().to_string()
        } else {
            banner
        });
    }
    lines
}

pub fn controls_line(controls: &Controls, paint: bool) -> String {
    let mut options: Vec<String> = Vec::new();
    for (kind, label) in [
        (ActionKind::Fold, "[f]old"),
        (ActionKind::Call, "[c]all"),
        (ActionKind::Raise, "[r]aise"),
    ] {
        if controls.enabled(kind) {
            options.push(label.to_string());
        }
    }
    if controls.next_round {
        options.push("[n]ext round".to_string());
    }
    if let Some(label) = controls.start {
        options.push(format!("[s] {label}"));
    }

    let listed = if options.is_empty() {
        "waiting...".to_string()
    } else {
        options.join(" ")
    };
    if paint {
        format!("{} {}", "Options".bold().yellow(), listed.green())
    } else {
        format!("Options {listed}")
    }
}
