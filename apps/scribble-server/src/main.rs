use std::time::Duration;

use clap::Parser;
use scribble::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Drawing-and-guessing party game server")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Interface to bind.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// URL of a newline/comma separated word list. Without it the built-in
    /// vocabulary is used.
    #[arg(long, env = "WORDS_URL")]
    words_url: Option<String>,

    /// Seconds between word list fetches.
    #[arg(long, default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
    refresh_secs: u64,

    /// What to do when every word has been used: `refill` or `end-game`.
    #[arg(long, default_value_t = ExhaustionPolicy::Refill)]
    exhaustion: ExhaustionPolicy,

    /// Accept guesses regardless of letter case.
    #[arg(long)]
    case_insensitive: bool,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            exhaustion_policy: self.exhaustion,
            guess_matching: if self.case_insensitive {
                GuessMatching::CaseInsensitive
            } else {
                GuessMatching::Exact
            },
            ..GameConfig::default()
        }
    }
}

/// A client that cannot be built leaves the server on the built-in words
/// instead of stopping it.
fn http_source(url: &str) -> Option<HttpWordSource> {
    match HttpWordSource::new(url) {
        Ok(source) => Some(source),
        Err(e) => {
            tracing::warn!(%url, error = %e, "cannot create word list client");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ScribbleError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    let mut builder = ScribbleServer::builder()
        .bind(&addr)
        .game_config(args.game_config())
        .refresh_config(RefreshConfig::with_interval(Duration::from_secs(
            args.refresh_secs,
        )));
    match args.words_url.as_deref().and_then(http_source) {
        Some(source) => {
            tracing::info!(url = source.url(), "word list source configured");
            builder = builder.word_source(source);
        }
        None => tracing::info!("no word list source, using built-in words"),
    }

    let server = builder.build().await?;
    tracing::info!(
        %addr,
        exhaustion = %args.exhaustion,
        "starting Scribble server"
    );
    server.run().await
}
