//! Message types for Scribble's wire format.
//!
//! Every type here is serialized to JSON and read by a browser client, so
//! the serde attributes are part of the contract: messages are internally
//! tagged (`{"type": "chat", "text": "..."}`) with snake_case tags.

use std::fmt;

use scribble_transport::ConnectionId;
use serde::{Deserialize, Serialize};

/// Display name used for messages the server itself authors, such as the
/// reveal after a correct guess.
pub const SYSTEM_USER: &str = "System";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identity of a connected participant.
///
/// Derived from the connection id, so it is stable for the lifetime of the
/// connection and meaningless afterwards. `#[serde(transparent)]` puts it on
/// the wire as a plain number.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(pub u64);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

impl From<ConnectionId> for ParticipantId {
    fn from(id: ConnectionId) -> Self {
        Self(id.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who should receive a server message.
///
/// The round engine returns `(Recipient, ServerMessage)` pairs and the game
/// actor fans them out to the per-participant channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every connected participant.
    All,

    /// Exactly one participant. Used for the secret word.
    Participant(ParticipantId),

    /// Everyone except the given participant. Used for stroke relay so the
    /// painter doesn't get their own strokes echoed back.
    AllExcept(ParticipantId),
}

impl Recipient {
    /// Returns `true` if `id` is covered by this recipient.
    pub fn includes(&self, id: ParticipantId) -> bool {
        match self {
            Self::All => true,
            Self::Participant(target) => *target == id,
            Self::AllExcept(excluded) => *excluded != id,
        }
    }
}

// ---------------------------------------------------------------------------
// Stroke payloads
// ---------------------------------------------------------------------------

/// A point on the canvas in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

/// Pen settings for a stroke. Both fields are optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    #[serde(default = "StrokeStyle::default_color")]
    pub color: String,
    #[serde(default = "StrokeStyle::default_width")]
    pub width: f32,
}

impl StrokeStyle {
    fn default_color() -> String {
        "#000000".to_string()
    }

    fn default_width() -> f32 {
        4.0
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Self::default_color(),
            width: Self::default_width(),
        }
    }
}

// ---------------------------------------------------------------------------
// Participant → server
// ---------------------------------------------------------------------------

/// Messages a participant sends to the server.
///
/// `join` must be the first frame on a connection. Everything else is only
/// meaningful afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "I'm here, call me `name`." The server sanitizes the name.
    Join {
        #[serde(default)]
        name: String,
    },

    /// Pen down at `point`.
    StrokeStart {
        point: StrokePoint,
        #[serde(default)]
        style: StrokeStyle,
    },

    /// Pen moved through `points` since the last frame.
    StrokeContinue { points: Vec<StrokePoint> },

    /// Pen up.
    StrokeEnd,

    /// Wipe the canvas.
    ClearCanvas,

    /// A chat line. It is also a guess when it matches the secret word.
    Chat { text: String },
}

// ---------------------------------------------------------------------------
// Server → participant
// ---------------------------------------------------------------------------

/// One row of the roster snapshot, in turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub participant_id: ParticipantId,
    pub name: String,
    pub score: u32,
}

/// One row of the final scoreboard. `rank` starts at 1; tied scores keep
/// join order and still get distinct ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub participant_id: ParticipantId,
    pub name: String,
    pub score: u32,
}

/// Messages the server sends to participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Reply to `join`: your id and the name you actually got.
    Welcome {
        participant_id: ParticipantId,
        name: String,
    },

    /// A round began (or is in progress, when sent to a late joiner).
    /// Never carries the word.
    RoundStarted { painter: ParticipantId },

    /// The secret word. Only ever sent to the painter.
    SecretWord { word: String },

    /// Everyone currently connected, in turn order.
    Roster { participants: Vec<RosterEntry> },

    /// A chat line, either from a participant or from [`SYSTEM_USER`].
    Chat { user: String, text: String },

    /// Relayed stroke events from the painter.
    StrokeStart {
        point: StrokePoint,
        style: StrokeStyle,
    },
    StrokeContinue { points: Vec<StrokePoint> },
    StrokeEnd,

    /// The painter wiped the canvas.
    CanvasCleared,

    /// The word supply ran out. Frozen until everyone leaves.
    GameOver {
        winner: Option<RankedEntry>,
        ranking: Vec<RankedEntry>,
    },

    /// The connection sent something the server could not accept.
    /// `code` follows HTTP conventions (400 = bad request).
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================
