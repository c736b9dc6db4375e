//! Headless host for the Coinfield game.
//!
//! Reads one JSON event per stdin line, applies it to the game session, and
//! writes one JSON reply per line to stdout. Logs go to stderr so the reply
//! stream stays machine-readable.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing, to stderr)
//! 2. Load configuration from `coinfield-config.yaml` (or `COINFIELD_CONFIG`)
//! 3. Open the file-backed store at the configured directory
//! 4. Restore the saved session, or start fresh
//! 5. Serve events until stdin closes or Ctrl-C arrives
//! 6. Flush the session one last time

mod error;
mod protocol;

use std::path::PathBuf;

use coinfield_core::{FileStore, GameConfig, GameSession, KeyValueStore};
use coinfield_world::{Luck, Sha256Luck};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::protocol::HostReply;

/// Environment variable naming an alternative config file.
const CONFIG_PATH_ENV: &str = "COINFIELD_CONFIG";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
const DEFAULT_CONFIG_PATH: &str = "coinfield-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or stdout breaks.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), EngineError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!("coinfield-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        tile_width = config.world.tile_width,
        visibility_radius = config.world.visibility_radius,
        spawn_probability = config.world.spawn_probability,
        directory = %config.storage.directory.display(),
        slot = config.storage.slot,
        "Configuration loaded"
    );

    // 3-4. Open storage and restore the session.
    let store = FileStore::new(config.storage.directory.clone());
    let mut game = GameSession::start(&config, Sha256Luck, store);

    // 5. Serve events.
    let served = serve(
        &mut game,
        BufReader::new(tokio::io::stdin()),
        &mut tokio::io::stdout(),
        tokio::signal::ctrl_c(),
    )
    .await;

    // 6. Final flush, whatever ended the loop.
    match game.flush() {
        Ok(()) => info!("Session saved"),
        Err(e) => warn!(error = %e, "Final save failed"),
    }

    served
}

/// Pump input events into the game until EOF or `shutdown` resolves.
async fn serve<L, S, R, W, F>(
    game: &mut GameSession<L, S>,
    input: R,
    out: &mut W,
    shutdown: F,
) -> Result<(), EngineError>
where
    L: Luck,
    S: KeyValueStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    let mut lines = input.lines();

    // Announce the initial view so the UI can render before any input.
    let initial = protocol::handle_event(game, protocol::HostEvent::Look);
    write_reply(out, &initial).await?;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed, shutting down");
                    return Ok(());
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let reply = protocol::handle_line(game, line);
                write_reply(out, &reply).await?;
            }
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    warn!(error = %e, "Failed to listen for Ctrl-C");
                }
                info!("Interrupted, shutting down");
                return Ok(());
            }
        }
    }
}

/// Write one reply as a JSON line.
async fn write_reply<W: AsyncWrite + Unpin>(
    out: &mut W,
    reply: &HostReply,
) -> Result<(), EngineError> {
    let mut json = serde_json::to_vec(reply)?;
    json.push(b'\n');
    out.write_all(&json).await?;
    out.flush().await?;
    debug!(bytes = json.len(), "Reply written");
    Ok(())
}

/// Load game configuration.
///
/// Uses the file named by `COINFIELD_CONFIG`, or `coinfield-config.yaml` in
/// the working directory. A missing file means defaults.
fn load_config() -> Result<GameConfig, EngineError> {
    let config_path = std::env::var_os(CONFIG_PATH_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        let config = GameConfig::from_file(&config_path)?;
        Ok(config)
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        let mut config = GameConfig::default();
        config.storage.apply_env_overrides();
        Ok(config)
    }
}
