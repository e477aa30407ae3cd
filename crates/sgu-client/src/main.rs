//! SGU client binary entrypoint.
//!
//! Reads commands from stdin line by line and drives them through the
//! command router over a single managed connection.

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use sgu_client::{
    Cli, CommandLine, CommandRouter, ConfigStore, ConnectionManager, DisplaySink, FileConfigStore,
    PlayerHandle, StaticPlayer, StdoutDisplay, WsTransport,
};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), sgu_client::ClientError> {
    let config: Arc<dyn ConfigStore> = Arc::new(FileConfigStore::new(&cli.config));
    let display: Arc<dyn DisplaySink> = Arc::new(StdoutDisplay);
    let player: Arc<dyn PlayerHandle> = Arc::new(StaticPlayer::new(&cli.username));

    let connect_timeout = match cli.connect_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let connection = ConnectionManager::new(
        WsTransport,
        Arc::clone(&config),
        Arc::clone(&display),
        Arc::clone(&player),
    )
    .with_connect_timeout(connect_timeout);
    let mut router = CommandRouter::new(connection, player);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(sgu_client::ClientError::Io)?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" || line == "exit" {
            break;
        }

        let tokens = sgu_client::split_command_line(line);
        let parsed = match CommandLine::try_parse_from(tokens) {
            Ok(parsed) => parsed,
            Err(e) => {
                // Clap renders its own usage/help text.
                display.show(&e.to_string());
                continue;
            }
        };
        debug!(command = ?parsed.command, "Dispatching command");
        if let Err(e) = router.dispatch(&parsed.command).await {
            display.show(&format!("Command failed: {e}"));
        }
    }

    router.connection_mut().close().await
}
