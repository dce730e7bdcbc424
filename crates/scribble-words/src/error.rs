//! Error types for the word supply.

/// Errors from fetching or applying a word list.
///
/// None of these are fatal: the bank keeps its previous list and the
/// refresher tries again on the next interval.
#[derive(Debug, thiserror::Error)]
pub enum WordsError {
    /// The HTTP request itself failed (DNS, connect, timeout, body read).
    #[error("word list fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The source answered, but not with a success status.
    #[error("word list source returned status {0}")]
    Status(u16),

    /// The text parsed to zero words.
    #[error("word list is empty")]
    EmptyList,
}
