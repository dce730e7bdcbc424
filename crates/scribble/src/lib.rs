//! # Scribble
//!
//! Server for a turn-based drawing-and-guessing party game. One participant
//! paints a secret word, everyone else guesses in chat, and a correct guess
//! scores points and hands the brush to the next in line.
//!
//! The workspace is layered:
//!
//! - `scribble-transport` — WebSocket connections as byte pipes
//! - `scribble-protocol` — the JSON messages on those pipes
//! - `scribble-words` — vocabulary, draw pool, remote refresh
//! - `scribble-game` — roster, round state machine, game actor
//! - this crate — the server that wires them together
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scribble::prelude::*;
//!
//! # async fn start() -> Result<(), ScribbleError> {
//! let server = ScribbleServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ScribbleError;
pub use server::{JOIN_TIMEOUT, ScribbleServer, ScribbleServerBuilder};

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{JOIN_TIMEOUT, ScribbleError, ScribbleServer, ScribbleServerBuilder};
    pub use scribble_game::{GameConfig, GameHandle, GuessMatching};
    pub use scribble_protocol::{
        ClientMessage, ParticipantId, ServerMessage, StrokePoint, StrokeStyle,
    };
    pub use scribble_words::{
        DEFAULT_REFRESH_INTERVAL, ExhaustionPolicy, HttpWordSource,
        RefreshConfig, StaticWordSource, WordBank, WordSource,
    };
}
