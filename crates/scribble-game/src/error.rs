//! Error types for the game layer.

use scribble_protocol::ParticipantId;

/// Errors from talking to the game actor.
///
/// Game rules never produce errors: unknown participants and out-of-turn
/// actions are ignored. These only cover the actor boundary.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The participant id is already in the roster.
    #[error("participant {0} already joined")]
    AlreadyJoined(ParticipantId),

    /// The actor's command channel is closed.
    #[error("game is unavailable")]
    Unavailable,
}
