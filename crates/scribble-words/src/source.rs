//! Where word lists come from.
//!
//! The bank doesn't fetch anything itself. A [`WordSource`] produces the raw
//! text and the [`WordRefresher`](crate::WordRefresher) decides when to ask.

use std::time::Duration;

use crate::WordsError;

/// Produces the raw text of a word list.
///
/// Implementations return the body untouched; parsing happens in the bank
/// so every source gets the same delimiter and trimming rules.
///
/// # Example
///
/// ```rust
/// use scribble_words::{WordSource, WordsError};
///
/// struct Fruit;
///
/// impl WordSource for Fruit {
///     async fn fetch(&self) -> Result<String, WordsError> {
///         Ok("apple, pear, plum".to_string())
///     }
/// }
/// ```
pub trait WordSource: Send + Sync + 'static {
    fn fetch(
        &self,
    ) -> impl std::future::Future<Output = Result<String, WordsError>> + Send;
}

/// Fetches a word list with an HTTP GET.
///
/// Any non-2xx status is an error, so an error page never replaces a good
/// vocabulary.
#[derive(Debug, Clone)]
pub struct HttpWordSource {
    client: reqwest::Client,
    url: String,
}

impl HttpWordSource {
    /// Per-request timeout. A hung source must not pile up fetches.
    pub const TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a source for `url`.
    ///
    /// # Errors
    /// Returns [`WordsError::Fetch`] if the HTTP client cannot be built
    /// (TLS backend initialisation).
    pub fn new(url: impl Into<String>) -> Result<Self, WordsError> {
        let client = reqwest::Client::builder().timeout(Self::TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl WordSource for HttpWordSource {
    async fn fetch(&self) -> Result<String, WordsError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WordsError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// A source that always returns the same text. Handy for local play and
/// tests.
#[derive(Debug, Clone)]
pub struct StaticWordSource {
    text: String,
}

impl StaticWordSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl WordSource for StaticWordSource {
    async fn fetch(&self) -> Result<String, WordsError> {
        Ok(self.text.clone())
    }
}
