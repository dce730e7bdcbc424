//! The word bank and its draw pool.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::WordsError;

/// Vocabulary used until a source delivers a list, so the game is playable
/// offline.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "강아지",
    "축구",
    "노트북",
    "아이스크림",
    "치킨",
    "우주인",
    "고구마",
    "자동차",
    "피자",
    "카메라",
];

/// What [`WordBank::draw`] does when the current cycle has no words left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExhaustionPolicy {
    /// Start a new cycle: refill the pool from the full list and reshuffle.
    /// The game never ends on its own.
    #[default]
    Refill,
    /// Report exhaustion. The round engine ends the game.
    EndGame,
}

impl fmt::Display for ExhaustionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refill => write!(f, "refill"),
            Self::EndGame => write!(f, "end-game"),
        }
    }
}

impl FromStr for ExhaustionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refill" => Ok(Self::Refill),
            "end-game" | "endgame" | "end_game" => Ok(Self::EndGame),
            other => Err(format!(
                "unknown exhaustion policy `{other}` (expected `refill` or `end-game`)"
            )),
        }
    }
}

/// Result of a successful [`WordBank::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The list differed; the pool was rebuilt from the new words.
    Replaced { words: usize },
    /// Same list as before; the in-progress cycle was left alone.
    Unchanged,
}

/// Splits a word list on newlines and commas, trims every entry, drops
/// empty ones and removes duplicates (first occurrence wins).
///
/// ```rust
/// use scribble_words::parse_word_list;
///
/// let words = parse_word_list(" apple,banana\r\n\ncherry , apple ");
/// assert_eq!(words, vec!["apple", "banana", "cherry"]);
/// ```
pub fn parse_word_list(raw: &str) -> Vec<String> {
    collect_words(raw.split(['\n', '\r', ',']))
}

fn collect_words<'a>(entries: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .filter(|w| seen.insert(*w))
        .map(str::to_string)
        .collect()
}

/// Owns the vocabulary and hands out words without repeats.
///
/// `all_words` is the full list; `pool` is what is left of the current
/// cycle, already shuffled. Every drawn word comes out of `pool`, so no word
/// repeats until the pool has been refilled.
pub struct WordBank {
    all_words: Vec<String>,
    pool: Vec<String>,
    policy: ExhaustionPolicy,
    /// Number of times the pool has been (re)built. Starts at 1.
    cycle: u64,
    /// `false` while still running on [`DEFAULT_VOCABULARY`].
    from_source: bool,
    rng: StdRng,
}

impl WordBank {
    /// Creates a bank on the built-in vocabulary.
    pub fn new(policy: ExhaustionPolicy) -> Self {
        let words = DEFAULT_VOCABULARY.iter().map(|w| w.to_string()).collect();
        Self::build(words, policy, StdRng::from_rng(&mut rand::rng()))
    }

    /// Creates a bank on an explicit list.
    ///
    /// # Errors
    /// Returns [`WordsError::EmptyList`] if `words` contains no usable
    /// entry after trimming.
    pub fn with_words<I, S>(
        words: I,
        policy: ExhaustionPolicy,
    ) -> Result<Self, WordsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: Vec<S> = words.into_iter().collect();
        let words = collect_words(entries.iter().map(|w| w.as_ref()));
        if words.is_empty() {
            return Err(WordsError::EmptyList);
        }
        let mut bank =
            Self::build(words, policy, StdRng::from_rng(&mut rand::rng()));
        bank.from_source = true;
        Ok(bank)
    }

    /// Replaces the random source and reshuffles a full pool from it.
    /// Lets tests get a reproducible draw order.
    pub fn seeded(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.pool = self.all_words.clone();
        self.pool.shuffle(&mut self.rng);
        self
    }

    fn build(
        all_words: Vec<String>,
        policy: ExhaustionPolicy,
        mut rng: StdRng,
    ) -> Self {
        let mut pool = all_words.clone();
        pool.shuffle(&mut rng);
        Self {
            all_words,
            pool,
            policy,
            cycle: 1,
            from_source: false,
            rng,
        }
    }

    /// Takes the next word out of the pool.
    ///
    /// When the pool is empty the [`ExhaustionPolicy`] decides:
    /// `Refill` starts a new shuffled cycle and returns its first word,
    /// `EndGame` returns `None`.
    pub fn draw(&mut self) -> Option<String> {
        if self.pool.is_empty() {
            match self.policy {
                ExhaustionPolicy::EndGame => {
                    debug!(cycle = self.cycle, "draw pool exhausted");
                    return None;
                }
                ExhaustionPolicy::Refill => {
                    self.reset_cycle();
                    debug!(cycle = self.cycle, "draw pool refilled");
                }
            }
        }
        self.pool.pop()
    }

    /// Applies a freshly fetched word list.
    ///
    /// Only an actually different list touches the pool, so an unchanged
    /// source doesn't restart the cycle every interval. A word already handed
    /// to a round is unaffected either way; only later draws see the change.
    ///
    /// # Errors
    /// Returns [`WordsError::EmptyList`] if `raw` yields no words. The
    /// previous list stays in place.
    pub fn refresh(&mut self, raw: &str) -> Result<RefreshOutcome, WordsError> {
        let words = parse_word_list(raw);
        if words.is_empty() {
            return Err(WordsError::EmptyList);
        }
        self.from_source = true;
        if words == self.all_words {
            debug!(words = words.len(), "word list unchanged");
            return Ok(RefreshOutcome::Unchanged);
        }

        let count = words.len();
        self.all_words = words;
        self.reset_cycle();
        info!(words = count, "word list replaced");
        Ok(RefreshOutcome::Replaced { words: count })
    }

    /// Rebuilds the pool from the full list and reshuffles it.
    pub fn reset_cycle(&mut self) {
        self.pool = self.all_words.clone();
        self.pool.shuffle(&mut self.rng);
        self.cycle += 1;
    }

    /// The full vocabulary, in source order.
    pub fn words(&self) -> &[String] {
        &self.all_words
    }

    /// Words left in the current cycle.
    pub fn remaining(&self) -> usize {
        self.pool.len()
    }

    pub fn policy(&self) -> ExhaustionPolicy {
        self.policy
    }

    /// Changes what happens at the end of the current cycle. The pool is
    /// left alone.
    pub fn set_policy(&mut self, policy: ExhaustionPolicy) {
        self.policy = policy;
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// `true` once any source list has been applied.
    pub fn is_from_source(&self) -> bool {
        self.from_source
    }
}

// =========================================================================
// Tests
// =========================================================================
