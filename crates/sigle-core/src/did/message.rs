//! Sign-in message rendering for capability requests.
//!
//! Wallets sign a human-readable EIP-4361 style message. The message fields
//! are taken from the [`Capability`] being requested, so the signature covers
//! exactly what ends up in the persisted session.

use chrono::{SecondsFormat, Utc};
use rand::RngCore;

use crate::wallet::Network;

use super::{AccountLink, AuthorizeRequest, Capability};

/// Statement shown to the user when granting a session
pub const SESSION_STATEMENT: &str = "Give this application access to some of your data on Ceramic";

/// Number of random bytes in a session key identifier
const SESSION_KEY_BYTES: usize = 16;

/// Generate a fresh identifier for an ephemeral session key
pub fn new_session_key() -> String {
    let mut bytes = [0u8; SESSION_KEY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("urn:sigle:session:{}", hex)
}

impl Capability {
    /// Build the capability a wallet is asked to sign. The signature is empty
    /// until [`Capability::signed`] is called.
    pub fn request(
        link: &AccountLink,
        request: &AuthorizeRequest,
        session_key: &str,
    ) -> Self {
        let issued_at = Utc::now();
        Self {
            issuer: link.did(),
            audience: session_key.to_string(),
            domain: request.domain.clone(),
            nonce: request.nonce.clone(),
            statement: SESSION_STATEMENT.to_string(),
            resources: request.resources.clone(),
            issued_at,
            expires_at: issued_at + request.expires_in,
            signature: String::new(),
        }
    }

    pub fn signed(mut self, signature: String) -> Self {
        self.signature = signature;
        self
    }

    /// Render the message the wallet signs
    pub fn sign_in_message(&self, link: &AccountLink) -> String {
        let account_kind = match link.provider.network {
            Network::Ethereum => "Ethereum",
            Network::Stacks => "Stacks",
        };
        let host = self
            .domain
            .split_once("://")
            .map(|(_, host)| host)
            .unwrap_or(&self.domain);

        let mut message = format!(
            "{} wants you to sign in with your {} account:\n{}\n\n{}\n\nURI: {}\nVersion: 1\nChain ID: {}\nNonce: {}\nIssued At: {}\nExpiration Time: {}",
            host,
            account_kind,
            link.address(),
            self.statement,
            self.audience,
            link.provider.chain_id,
            self.nonce,
            self.issued_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        if !self.resources.is_empty() {
            message.push_str("\nResources:");
            for resource in &self.resources {
                message.push_str("\n- ");
                message.push_str(resource);
            }
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::WalletProvider;
    use chrono::Duration;

    #[test]
    fn test_new_session_key_is_unique() {
        let a = new_session_key();
        let b = new_session_key();
        assert!(a.starts_with("urn:sigle:session:"));
        assert_eq!(a.len(), "urn:sigle:session:".len() + SESSION_KEY_BYTES * 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_sign_in_message_fields() {
        let link = AccountLink::new(&WalletProvider::new(Network::Ethereum, 1), "0xABC").unwrap();
        let request = AuthorizeRequest::ceramic(
            "abc123".to_string(),
            "https://app.sigle.io".to_string(),
            Duration::days(7),
        );
        let cap = Capability::request(&link, &request, "urn:sigle:session:ff");

        assert_eq!(cap.issuer, "did:pkh:eip155:1:0xABC");
        assert_eq!(cap.expires_at - cap.issued_at, Duration::days(7));
        assert!(cap.signature.is_empty());

        let message = cap.sign_in_message(&link);
        assert!(message.starts_with(
            "app.sigle.io wants you to sign in with your Ethereum account:\n0xABC\n"
        ));
        assert!(message.contains("\nNonce: abc123\n"));
        assert!(message.contains("\nURI: urn:sigle:session:ff\n"));
        assert!(message.ends_with("Resources:\n- ceramic://*"));

        let signed = cap.signed("0xdeadbeef".to_string());
        assert_eq!(signed.signature, "0xdeadbeef");
    }
}
