//! Sigle CLI - sign in to Sigle with a wallet from the terminal.
//!
//! Drives the session coordinator: connects a wallet address, reuses or
//! authorizes a DID session, and signs out of the backend.

mod app;
mod signer;
mod wallet;

use std::io;

use anyhow::{anyhow, Result};
use sigle_core::wallet::Network;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Directory for rolling log files; file logging is off when unset
const LOG_DIR_ENV: &str = "SIGLE_LOG_DIR";

const LOG_FILE_PREFIX: &str = "sigle.log";

const USAGE: &str = "\
Usage: sigle <command>

Commands:
  status                                  Show the DID session stored on this device
  login [--address <addr>] [--network <ethereum|stacks>]
                                          Sign in with a wallet address
  logout                                  Sign out and disconnect the wallet";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Status,
    Login {
        address: Option<String>,
        network: Option<Network>,
    },
    Logout,
    Help,
}

/// Initialize the tracing subscriber for logging.
/// The returned guard flushes the log file on drop.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var(LOG_DIR_ENV) {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };

    match command.as_str() {
        "status" => Ok(Command::Status),
        "logout" => Ok(Command::Logout),
        "help" | "--help" | "-h" => Ok(Command::Help),
        "login" => {
            let mut address = None;
            let mut network = None;
            let mut rest = args[1..].iter();
            while let Some(flag) = rest.next() {
                let value = rest
                    .next()
                    .ok_or_else(|| anyhow!("Missing value for {}", flag))?;
                match flag.as_str() {
                    "--address" => address = Some(value.clone()),
                    "--network" => {
                        network = Some(
                            Network::from_str(value)
                                .ok_or_else(|| anyhow!("Unknown network: {}", value))?,
                        )
                    }
                    other => return Err(anyhow!("Unknown option: {}", other)),
                }
            }
            Ok(Command::Login { address, network })
        }
        other => Err(anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    info!(?command, "Sigle CLI starting");
    let mut app = App::new()?;

    match command {
        Command::Status => app.status(),
        Command::Login { address, network } => app.login(address, network).await,
        Command::Logout => app.logout().await,
        Command::Help => Ok(()),
    }
}
