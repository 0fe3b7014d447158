//! Command handling for the `sigle` CLI.
//!
//! `App` wires the terminal wallet, the prompt authorizer, the HTTP backend
//! and the configured storage into a `SessionCoordinator`, and runs one
//! command against it.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use sigle_core::auth::PersistedSession;
use sigle_core::storage::SessionStorage;
use sigle_core::wallet::Network;
use sigle_core::{ApiClient, Config, SessionCoordinator, SessionState};
use tracing::{debug, info, warn};

use crate::signer::PromptAuthorizer;
use crate::wallet::TerminalWallet;

/// Environment variable holding the wallet address to sign in with
const ADDRESS_ENV: &str = "SIGLE_ADDRESS";

pub struct App {
    config: Config,
    storage: Arc<dyn SessionStorage>,
    wallet: Arc<TerminalWallet>,
    coordinator: Arc<SessionCoordinator>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = match Config::load() {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };
        debug!(api_url = config.api_url(), storage = ?config.storage, "Config loaded");

        let storage = config.open_storage()?;
        let wallet = Arc::new(TerminalWallet::new());
        let api = ApiClient::new(config.api_url())?;

        let coordinator = Arc::new(SessionCoordinator::new(
            wallet.clone(),
            Arc::new(PromptAuthorizer),
            Arc::new(api),
            storage.clone(),
            config.coordinator_options()?,
        ));

        Ok(Self {
            config,
            storage,
            wallet,
            coordinator,
        })
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Print the persisted DID session, if any
    pub fn status(&self) -> Result<()> {
        let persisted = PersistedSession::new(self.storage.clone());
        match persisted.load()? {
            None => println!("No DID session on this device"),
            Some(session) => {
                println!("{}", describe_session(&session));
            }
        }
        Ok(())
    }

    /// Connect the wallet and let the coordinator sign in
    pub async fn login(&mut self, address: Option<String>, network: Option<Network>) -> Result<()> {
        let address = address
            .or_else(|| std::env::var(ADDRESS_ENV).ok())
            .or_else(|| self.config.last_address.clone())
            .filter(|a| !a.trim().is_empty())
            .ok_or_else(|| anyhow!("No wallet address. Pass --address or set {}", ADDRESS_ENV))?;
        let network = network
            .or(self.config.last_network)
            .unwrap_or(Network::Ethereum);

        let mut states = self.coordinator.subscribe();
        let watcher = self.coordinator.clone().watch_wallet(self.wallet.subscribe());

        self.wallet.connect(&address, network);

        let state = states
            .wait_for(|s| !s.is_loading && !s.is_authenticating)
            .await?
            .clone();
        watcher.abort();

        if let Some(error) = state.error {
            return Err(anyhow!("Login failed: {}", error));
        }
        if !state.is_authenticated {
            return Err(anyhow!("Login did not complete"));
        }

        self.config.last_address = Some(address);
        self.config.last_network = Some(network);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        info!("Login successful");
        println!("{}", describe_state(&state));
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        let result = self.coordinator.logout().await;
        println!("{}", describe_state(&self.coordinator.state()));
        if let Err(e) = result {
            // The local session is gone either way
            eprintln!("Warning: {}", e);
        }
        Ok(())
    }
}

// ============================================================================
// Formatting
// ============================================================================

fn describe_session(session: &sigle_core::DidSession) -> String {
    let Some(cap) = session.capability() else {
        return format!("Unauthorized session key {}", session.session_key());
    };

    let expiry = if session.is_expired() {
        "expired".to_string()
    } else {
        format_remaining(session.minutes_until_expiry().unwrap_or(0))
    };

    format!(
        "DID:      {}\nIssued:   {}\nExpires:  {} ({})\nResources: {}",
        cap.issuer,
        cap.issued_at.format("%b %d, %Y %H:%M UTC"),
        cap.expires_at.format("%b %d, %Y %H:%M UTC"),
        expiry,
        cap.resources.join(", "),
    )
}

fn describe_state(state: &SessionState) -> String {
    match (&state.user, &state.did_session) {
        (Some(user), Some(session)) if state.is_authenticated => {
            format!("Signed in as {}\n{}", user.address, describe_session(session))
        }
        _ => "Signed out".to_string(),
    }
}

/// Format minutes remaining as a short duration
fn format_remaining(minutes: i64) -> String {
    if minutes < 1 {
        "less than a minute left".to_string()
    } else if minutes < 60 {
        format!("{}m left", minutes)
    } else if minutes < 1440 {
        format!("{}h left", minutes / 60)
    } else {
        format!("{}d left", minutes / 1440)
    }
}
