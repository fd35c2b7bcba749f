// parlor - multi-window terminal chat client
//
// Architecture:
// - Core state: window registry, focus routing, key classification
// - TUI (ratatui): tabbed chat panes with a settings overlay
// - Connection layer: a ChatEvent mpsc channel feeds the shell;
//   the built-in demo feed stands in for a real backend
// - Logging: tracing captured into an in-memory buffer for the status bar

mod bootstrap;
mod cli;
mod config;
mod demo;
mod events;
mod keys;
mod linkify;
mod logging;
mod registry;
mod router;
mod tui;
mod window;

use anyhow::Result;
use clap::Parser;
use config::{Config, LogRotation};
use logging::{LogBuffer, TuiLogLayer};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // Subcommands (config --show/--reset/--path) handle themselves and exit
    if cli::handle_command(&args) {
        return Ok(());
    }

    // Write the config template on first run so options are discoverable
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if args.demo {
        config.demo_mode = true;
    }

    let log_buffer = LogBuffer::new();

    // Logs go to the in-memory buffer, never stdout: the alternate screen
    // owns the terminal. Optionally also to rotating files.
    //
    // Filter precedence: RUST_LOG env var > config file level > "info"
    let default_filter = format!("parlor={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());

    // The guard must stay alive for the whole run so file logs flush
    let _file_guard: Option<tracing_appender::non_blocking::WorkerGuard> = if config
        .logging
        .file_enabled
    {
        match std::fs::create_dir_all(&config.logging.file_dir) {
            Ok(()) => {
                let file_appender = match config.logging.file_rotation {
                    LogRotation::Hourly => tracing_appender::rolling::hourly(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Daily => tracing_appender::rolling::daily(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                    LogRotation::Never => tracing_appender::rolling::never(
                        &config.logging.file_dir,
                        &config.logging.file_prefix,
                    ),
                };
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

                tracing_subscriber::registry()
                    .with(filter)
                    .with(TuiLogLayer::new(log_buffer.clone()))
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(non_blocking)
                            .with_ansi(false),
                    )
                    .init();
                Some(guard)
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not create log directory {:?}: {}",
                    config.logging.file_dir, e
                );
                tracing_subscriber::registry()
                    .with(filter)
                    .with(TuiLogLayer::new(log_buffer.clone()))
                    .init();
                None
            }
        }
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(TuiLogLayer::new(log_buffer.clone()))
            .init();
        None
    };

    // The connection layer feeds the shell over this channel.
    // Bounded so a runaway feed backpressures instead of ballooning memory.
    let (chat_tx, chat_rx) = mpsc::channel(100);

    if config.demo_mode {
        tracing::info!("running in demo mode, feeding mock conversations");
        tokio::spawn(demo::run_demo(chat_tx.clone()));
    } else {
        // No real backend is wired up yet; the shell starts empty and waits
        tracing::info!("no connection layer configured, starting with empty window list");
    }

    // chat_tx stays in scope so recv() pends rather than seeing channel-closed
    tui::run_tui(config, log_buffer, chat_rx).await?;
    drop(chat_tx);

    tracing::info!("shutdown complete");
    Ok(())
}
