//! Wallet connector backed by an address typed on the command line.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use sigle_core::wallet::{Network, WalletConnector, WalletProvider, WalletStatus};
use tokio::sync::watch;
use tracing::debug;

/// Chain id used for both networks (mainnet)
const MAINNET_CHAIN_ID: u64 = 1;

#[derive(Debug, Clone)]
struct Account {
    address: String,
    network: Network,
}

pub struct TerminalWallet {
    account: Mutex<Option<Account>>,
    status: watch::Sender<WalletStatus>,
}

impl TerminalWallet {
    pub fn new() -> Self {
        let (status, _) = watch::channel(WalletStatus::Disconnected);
        Self {
            account: Mutex::new(None),
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WalletStatus> {
        self.status.subscribe()
    }

    pub fn connect(&self, address: &str, network: Network) {
        self.status.send_replace(WalletStatus::Connecting);
        if let Ok(mut account) = self.account.lock() {
            *account = Some(Account {
                address: address.to_string(),
                network,
            });
        }
        debug!(address, ?network, "Wallet connected");
        self.status.send_replace(WalletStatus::Connected);
    }

    fn account(&self) -> Option<Account> {
        self.account.lock().ok().and_then(|a| a.clone())
    }
}

impl Default for TerminalWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletConnector for TerminalWallet {
    fn address(&self) -> Option<String> {
        self.account().map(|a| a.address)
    }

    fn status(&self) -> WalletStatus {
        *self.status.borrow()
    }

    fn provider(&self) -> Option<WalletProvider> {
        self.account()
            .map(|a| WalletProvider::new(a.network, MAINNET_CHAIN_ID))
    }

    async fn disconnect(&self) -> Result<()> {
        if let Ok(mut account) = self.account.lock() {
            *account = None;
        }
        self.status.send_replace(WalletStatus::Disconnected);
        Ok(())
    }
}
