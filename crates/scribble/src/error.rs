//! Unified error type for the Scribble server.

use scribble_game::GameError;
use scribble_protocol::ProtocolError;
use scribble_transport::TransportError;
use scribble_words::WordsError;

/// Top-level error that wraps every crate-specific error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors.
#[derive(Debug, thiserror::Error)]
pub enum ScribbleError {
    /// Binding, accepting, sending or receiving failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame could not be encoded or decoded, or arrived out of place.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The game actor refused or is gone.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The word source could not be set up.
    #[error(transparent)]
    Words(#[from] WordsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("first message must be join".into());
        let scribble_err: ScribbleError = err.into();
        assert!(matches!(scribble_err, ScribbleError::Protocol(_)));
        assert!(scribble_err.to_string().contains("must be join"));
    }

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::AcceptFailed(std::io::Error::other("gone"));
        let scribble_err: ScribbleError = err.into();
        assert!(matches!(scribble_err, ScribbleError::Transport(_)));
    }

    #[test]
    fn test_from_game_error() {
        let scribble_err: ScribbleError = GameError::Unavailable.into();
        assert!(matches!(scribble_err, ScribbleError::Game(_)));
        assert_eq!(scribble_err.to_string(), "game is unavailable");
    }

    #[test]
    fn test_from_words_error() {
        let scribble_err: ScribbleError = WordsError::Status(404).into();
        assert!(matches!(scribble_err, ScribbleError::Words(_)));
    }
}
