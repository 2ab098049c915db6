pub mod cards;
pub mod client;
pub mod console;
pub mod game;
pub mod hand;
pub mod session;
pub mod view;
pub mod web;

pub use client::{ClientError, GameServer, HttpGameServer};
pub use console::{Console, ConsoleConfig};
pub use session::{Outcome, Phase, Session, SessionConfig};
