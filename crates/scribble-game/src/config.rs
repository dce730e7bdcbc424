//! Game policy and the round state machine.

use std::time::Duration;

use scribble_protocol::{ParticipantId, RankedEntry};
use scribble_words::ExhaustionPolicy;
use tracing::warn;

// ---------------------------------------------------------------------------
// Policy constants
// ---------------------------------------------------------------------------

/// Points awarded to whoever guesses the word.
pub const POINTS_PER_CORRECT_GUESS: u32 = 10;

/// Display names are cut to this many characters.
pub const MAX_NAME_LENGTH: usize = 10;

/// Chat lines and guesses are cut to this many characters.
pub const MAX_CHAT_LENGTH: usize = 50;

/// Pause between a correct guess and the next round, so players can read
/// the reveal.
pub const NEXT_ROUND_DELAY: Duration = Duration::from_millis(1500);

/// Name given to participants who join with a blank one.
pub const DEFAULT_NAME: &str = "Player";

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// How a guess is compared against the secret word. Both sides are trimmed
/// and truncated first either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuessMatching {
    #[default]
    Exact,
    /// Unicode lowercase on both sides before comparing.
    CaseInsensitive,
}

impl GuessMatching {
    pub(crate) fn normalize(self, text: &str) -> String {
        match self {
            Self::Exact => text.to_string(),
            Self::CaseInsensitive => text.to_lowercase(),
        }
    }
}

/// Settings for one game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub points_per_correct_guess: u32,
    pub max_name_length: usize,
    pub max_chat_length: usize,
    /// Zero starts the next round synchronously, inside the guess.
    pub next_round_delay: Duration,
    pub exhaustion_policy: ExhaustionPolicy,
    pub guess_matching: GuessMatching,
    pub default_name: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            points_per_correct_guess: POINTS_PER_CORRECT_GUESS,
            max_name_length: MAX_NAME_LENGTH,
            max_chat_length: MAX_CHAT_LENGTH,
            next_round_delay: NEXT_ROUND_DELAY,
            exhaustion_policy: ExhaustionPolicy::default(),
            guess_matching: GuessMatching::default(),
            default_name: DEFAULT_NAME.to_string(),
        }
    }
}

impl GameConfig {
    /// Replaces values that would make the game unplayable.
    ///
    /// - zero `max_name_length` or `max_chat_length` fall back to the
    ///   defaults, since every name and guess would be empty
    /// - a blank `default_name` becomes [`DEFAULT_NAME`]
    /// - `default_name` is cut to `max_name_length`
    pub fn validated(mut self) -> Self {
        if self.max_name_length == 0 {
            warn!("max_name_length is 0, using default");
            self.max_name_length = MAX_NAME_LENGTH;
        }
        if self.max_chat_length == 0 {
            warn!("max_chat_length is 0, using default");
            self.max_chat_length = MAX_CHAT_LENGTH;
        }
        let trimmed = self.default_name.trim();
        self.default_name = if trimmed.is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            trimmed.chars().take(self.max_name_length).collect()
        };
        self
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The round in progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub painter: ParticipantId,
    pub word: String,
}

/// The frozen result of a finished game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scoreboard {
    /// Top of the ranking. `None` only if nobody was connected.
    pub winner: Option<RankedEntry>,
    pub ranking: Vec<RankedEntry>,
}

/// Where the game is.
///
/// ```text
/// Idle ──first join──▶ Drawing ──correct guess──▶ Intermission
///  ▲                    │   ▲                          │
///  │                    │   └──────deferred start──────┘
///  └────last leave──────┤
///                       └──words exhausted──▶ GameOver ──last leave──▶ Idle
/// ```
///
/// A painter leaving `Drawing` goes straight to a new `Drawing`. With a
/// zero [`GameConfig::next_round_delay`] a correct guess skips
/// `Intermission`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nobody is connected.
    Idle,
    Drawing(Round),
    /// A word was just guessed; the next round is scheduled.
    Intermission,
    GameOver(Scoreboard),
}

impl Phase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, Self::Drawing(_))
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, Self::GameOver(_))
    }

    /// The active round, if there is one.
    pub fn round(&self) -> Option<&Round> {
        match self {
            Self::Drawing(round) => Some(round),
            _ => None,
        }
    }

    /// The current painter, if a round is active.
    pub fn painter(&self) -> Option<ParticipantId> {
        self.round().map(|r| r.painter)
    }

    /// Short name for logs and snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Drawing(_) => "Drawing",
            Self::Intermission => "Intermission",
            Self::GameOver(_) => "GameOver",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
