//! Session authorizer that asks the user to sign the sign-in message with
//! their own wallet and paste the signature back.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use sigle_core::did::{new_session_key, AccountLink, AuthorizeRequest, Capability, DidSession, SessionAuthorizer};
use tracing::debug;

pub struct PromptAuthorizer;

impl PromptAuthorizer {
    fn prompt_signature(message: String) -> Result<String> {
        let mut stderr = io::stderr();
        writeln!(stderr, "\nSign this message with your wallet:\n")?;
        writeln!(stderr, "{}\n", message)?;
        write!(stderr, "Signature: ")?;
        stderr.flush()?;

        let mut signature = String::new();
        io::stdin().lock().read_line(&mut signature)?;
        Self::validate_signature(&signature)
    }

    fn validate_signature(input: &str) -> Result<String> {
        let signature = input.trim();
        if signature.is_empty() {
            return Err(anyhow!("Signature required"));
        }
        if signature.chars().any(char::is_whitespace) {
            return Err(anyhow!("Signature must be a single token"));
        }
        Ok(signature.to_string())
    }
}

#[async_trait]
impl SessionAuthorizer for PromptAuthorizer {
    async fn authorize(&self, link: &AccountLink, request: &AuthorizeRequest) -> Result<DidSession> {
        let session_key = new_session_key();
        let capability = Capability::request(link, request, &session_key);
        let message = capability.sign_in_message(link);

        let signature = tokio::task::spawn_blocking(move || Self::prompt_signature(message))
            .await
            .context("Signature prompt panicked")??;

        debug!(account = %link.account_id, "Session capability signed");
        Ok(DidSession::new(session_key, capability.signed(signature)))
    }
}
