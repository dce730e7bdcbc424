//! Word supply for Scribble.
//!
//! - [`WordBank`] — owns the vocabulary and the draw pool, and applies the
//!   [`ExhaustionPolicy`] when a cycle runs out.
//! - [`parse_word_list`] — turns a newline/comma separated blob into words.
//! - [`WordSource`] / [`HttpWordSource`] — where fresh vocabularies come from.
//! - [`WordRefresher`] — polls a source on a fixed interval and forwards
//!   the raw text to whoever owns the bank.
//!
//! The bank is plain data with no locking. It is meant to live inside the
//! game actor; the refresher only ever hands text over a channel.

mod bank;
mod error;
mod refresh;
mod source;

pub use bank::{
    DEFAULT_VOCABULARY, ExhaustionPolicy, RefreshOutcome, WordBank,
    parse_word_list,
};
pub use error::WordsError;
pub use refresh::{DEFAULT_REFRESH_INTERVAL, RefreshConfig, WordRefresher};
pub use source::{HttpWordSource, StaticWordSource, WordSource};
