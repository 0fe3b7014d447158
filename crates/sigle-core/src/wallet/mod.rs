//! Wallet connector contract.
//!
//! The wallet itself (browser extension, hardware device, terminal prompt)
//! lives outside this crate. The coordinator only needs to know whether an
//! account is connected, which address it uses, and how to disconnect it.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[cfg(feature = "ts")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub enum WalletStatus {
    Connecting,
    Connected,
    #[default]
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub enum Network {
    Ethereum,
    Stacks,
}

impl Network {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ethereum" | "eth" => Some(Network::Ethereum),
            "stacks" | "stx" => Some(Network::Stacks),
            _ => None,
        }
    }
}

/// Handle to the signing provider exposed by a connected wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletProvider {
    pub network: Network,
    pub chain_id: u64,
}

impl WalletProvider {
    pub fn new(network: Network, chain_id: u64) -> Self {
        Self { network, chain_id }
    }
}

#[async_trait]
pub trait WalletConnector: Send + Sync {
    /// Address of the connected account, if any
    fn address(&self) -> Option<String>;

    fn status(&self) -> WalletStatus;

    /// Provider handle; `None` while no wallet is connected
    fn provider(&self) -> Option<WalletProvider>;

    async fn disconnect(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_from_str() {
        assert_eq!(Network::from_str("ethereum"), Some(Network::Ethereum));
        assert_eq!(Network::from_str(" ETH "), Some(Network::Ethereum));
        assert_eq!(Network::from_str("Stacks"), Some(Network::Stacks));
        assert_eq!(Network::from_str("solana"), None);
    }

    #[test]
    fn test_wallet_status_serde() {
        let json = serde_json::to_string(&WalletStatus::Connected).unwrap();
        assert_eq!(json, "\"connected\"");
        assert_eq!(WalletStatus::default(), WalletStatus::Disconnected);
    }
}
