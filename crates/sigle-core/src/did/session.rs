use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wallet::{Network, WalletProvider};

/// Default lifetime of a freshly authorized session: one week.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Error, Debug)]
pub enum DidSessionError {
    #[error("Malformed session record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid account address: {0:?}")]
    InvalidAddress(String),
}

/// Identity-linking adapter between a wallet account and a DID.
///
/// The account id follows CAIP-10 (`<namespace>:<chain id>:<address>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLink {
    pub account_id: String,
    pub provider: WalletProvider,
}

impl AccountLink {
    pub fn new(provider: &WalletProvider, address: &str) -> Result<Self, DidSessionError> {
        if address.is_empty()
            || address.contains(':')
            || address.chars().any(char::is_whitespace)
        {
            return Err(DidSessionError::InvalidAddress(address.to_string()));
        }

        let namespace = match provider.network {
            Network::Ethereum => "eip155",
            Network::Stacks => "stacks",
        };

        Ok(Self {
            account_id: format!("{}:{}:{}", namespace, provider.chain_id, address),
            provider: provider.clone(),
        })
    }

    /// The `did:pkh` identifier controlled by this account
    pub fn did(&self) -> String {
        format!("did:pkh:{}", self.account_id)
    }

    /// Whether `did` names this account. Ethereum addresses compare without
    /// regard to EIP-55 checksum casing.
    pub fn controls(&self, did: &str) -> bool {
        let own = self.did();
        match self.provider.network {
            Network::Ethereum => own.eq_ignore_ascii_case(did),
            Network::Stacks => own == did,
        }
    }

    /// The bare address part of the account id
    pub fn address(&self) -> &str {
        self.account_id.rsplit(':').next().unwrap_or_default()
    }
}

/// Signed grant allowing a session key to act for an account on a set of resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    pub issuer: String,
    pub audience: String,
    pub domain: String,
    pub nonce: String,
    pub statement: String,
    pub resources: Vec<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub signature: String,
}

/// A decentralized-identity session: an ephemeral session key plus the
/// capability that authorizes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DidSession {
    session_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cacao: Option<Capability>,
}

impl DidSession {
    pub fn new(session_key: String, cacao: Capability) -> Self {
        Self {
            session_key,
            cacao: Some(cacao),
        }
    }

    /// A session key that has not been authorized yet
    pub fn unauthorized(session_key: String) -> Self {
        Self {
            session_key,
            cacao: None,
        }
    }

    /// Parse a record previously produced by [`DidSession::serialize`]
    pub fn from_session(serialized: &str) -> Result<Self, DidSessionError> {
        Ok(serde_json::from_str(serialized)?)
    }

    pub fn serialize(&self) -> String {
        // Plain struct of strings and timestamps, serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn session_key(&self) -> &str {
        &self.session_key
    }

    pub fn capability(&self) -> Option<&Capability> {
        self.cacao.as_ref()
    }

    /// DID of the account that issued the capability
    pub fn id(&self) -> Option<&str> {
        self.cacao.as_ref().map(|c| c.issuer.as_str())
    }

    pub fn has_session(&self) -> bool {
        self.cacao.is_some()
    }

    pub fn is_expired(&self) -> bool {
        self.cacao
            .as_ref()
            .map(|c| Utc::now() >= c.expires_at)
            .unwrap_or(false)
    }

    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.cacao.as_ref().map(|c| c.expires_at - Utc::now())
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> Option<i64> {
        self.time_until_expiry().map(|d| d.num_minutes().max(0))
    }
}
