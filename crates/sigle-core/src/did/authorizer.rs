use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;

use crate::wallet::WalletProvider;

use super::{AccountLink, DidSession};

/// Resource scope requested for every new session.
pub const CERAMIC_RESOURCE: &str = "ceramic://*";

/// Challenge parameters for a new session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub resources: Vec<String>,
    pub nonce: String,
    /// Origin (scheme + host) of the application asking for the session
    pub domain: String,
    /// Lifetime of the granted session
    pub expires_in: Duration,
}

impl AuthorizeRequest {
    pub fn ceramic(nonce: String, domain: String, expires_in: Duration) -> Self {
        Self {
            resources: vec![CERAMIC_RESOURCE.to_string()],
            nonce,
            domain,
            expires_in,
        }
    }
}

/// Issues decentralized-identity sessions for a linked wallet account.
#[async_trait]
pub trait SessionAuthorizer: Send + Sync {
    /// Build the identity-linking adapter for an account
    async fn link_account(&self, provider: &WalletProvider, address: &str) -> Result<AccountLink> {
        Ok(AccountLink::new(provider, address)?)
    }

    /// Ask the account to authorize a fresh session key
    async fn authorize(&self, link: &AccountLink, request: &AuthorizeRequest) -> Result<DidSession>;
}
