//! Game rules for Scribble.
//!
//! One game runs per server process, inside a single Tokio task (actor
//! model) that owns every piece of mutable state.
//!
//! # Key types
//!
//! - [`RoundEngine`] — the round state machine; synchronous and testable
//!   without a runtime
//! - [`Roster`] / [`TurnOrder`] — participants, scores, whose turn it is
//! - [`GameHandle`] — sends commands to the running game actor
//! - [`Phase`] — where the game is
//! - [`GameConfig`] — points, length caps, round delay, word policy

mod actor;
pub mod config;
mod engine;
mod error;
mod roster;

pub use actor::{GameHandle, GameSnapshot, ParticipantSender, spawn_game};
pub use config::{GameConfig, GuessMatching, Phase, Round, Scoreboard};
pub use engine::{DeferredStart, Dispatch, InboundEvent, RoundEngine, StrokeEvent};
pub use error::GameError;
pub use roster::{Departure, Participant, Roster, TurnOrder, sanitize_name};
