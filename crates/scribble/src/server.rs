//! `ScribbleServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → game actor, plus the
//! word refresher feeding the actor in the background.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use scribble_game::{GameConfig, GameHandle, spawn_game};
use scribble_protocol::{Codec, JsonCodec};
use scribble_transport::{Handshake, Transport, WebSocketTransport};
use scribble_words::{RefreshConfig, WordBank, WordRefresher, WordSource};
use tokio::sync::mpsc;

use crate::ScribbleError;
use crate::handler::handle_connection;

/// How long a new connection has to send `join`.
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state handed to every connection task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) game: GameHandle,
    pub(crate) codec: C,
    pub(crate) join_timeout: Duration,
}

/// Starts the refresher for a source once the game handle exists.
type RefresherStart = Box<dyn FnOnce(GameHandle, RefreshConfig) + Send>;

/// Builder for configuring and starting a Scribble server.
///
/// # Example
///
/// ```rust,no_run
/// use scribble::prelude::*;
///
/// # async fn start() -> Result<(), ScribbleError> {
/// let server = ScribbleServer::builder()
///     .bind("0.0.0.0:3000")
///     .word_source(HttpWordSource::new("https://example.com/words.txt")?)
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ScribbleServerBuilder {
    bind_addr: String,
    game_config: GameConfig,
    word_bank: Option<WordBank>,
    refresher: Option<RefresherStart>,
    refresh_config: RefreshConfig,
    join_timeout: Duration,
}

impl ScribbleServerBuilder {
    /// Creates a builder with default settings: localhost, built-in
    /// vocabulary, no word source.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            game_config: GameConfig::default(),
            word_bank: None,
            refresher: None,
            refresh_config: RefreshConfig::default(),
            join_timeout: JOIN_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    pub fn game_config(mut self, config: GameConfig) -> Self {
        self.game_config = config;
        self
    }

    /// Starts the game on this bank instead of the built-in vocabulary.
    /// Its exhaustion policy is overridden by the game config.
    pub fn word_bank(mut self, bank: WordBank) -> Self {
        self.word_bank = Some(bank);
        self
    }

    /// Polls `source` for fresh word lists while the server runs.
    pub fn word_source<S: WordSource>(mut self, source: S) -> Self {
        self.refresher = Some(Box::new(move |game, config| {
            spawn_refresher(source, config, game)
        }));
        self
    }

    pub fn refresh_config(mut self, config: RefreshConfig) -> Self {
        self.refresh_config = config;
        self
    }

    /// Overrides [`JOIN_TIMEOUT`].
    pub fn join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Binds the listener and starts the game actor (and the refresher, if
    /// a source was given).
    ///
    /// # Errors
    /// [`ScribbleError::Transport`] if the address cannot be bound.
    pub async fn build(self) -> Result<ScribbleServer<JsonCodec>, ScribbleError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let bank = self
            .word_bank
            .unwrap_or_else(|| WordBank::new(self.game_config.exhaustion_policy));
        let game = spawn_game(self.game_config, bank);

        if let Some(start) = self.refresher {
            start(game.clone(), self.refresh_config);
        }

        let state = Arc::new(ServerState {
            game,
            codec: JsonCodec,
            join_timeout: self.join_timeout,
        });

        Ok(ScribbleServer { transport, state })
    }
}

impl Default for ScribbleServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs the refresher and forwards every fetched list into the game actor.
fn spawn_refresher<S: WordSource>(
    source: S,
    config: RefreshConfig,
    game: GameHandle,
) {
    let (tx, mut rx) = mpsc::channel(1);
    tokio::spawn(WordRefresher::new(source, config).run(tx));
    tokio::spawn(async move {
        while let Some(raw) = rx.recv().await {
            if game.refresh_words(raw).await.is_err() {
                break;
            }
        }
    });
}

/// A bound Scribble server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ScribbleServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ScribbleServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ScribbleServerBuilder {
        ScribbleServerBuilder::new()
    }
}

impl<C: Codec> ScribbleServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ScribbleError> {
        Ok(self.transport.local_addr()?)
    }

    /// Handle to the game actor.
    pub fn game(&self) -> GameHandle {
        self.state.game.clone()
    }

    /// Runs the accept loop, spawning a handler task per connection. Runs
    /// until the process is terminated.
    pub async fn run(mut self) -> Result<(), ScribbleError> {
        tracing::info!("Scribble server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match pending.complete().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "upgrade failed");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
