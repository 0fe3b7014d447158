use thiserror::Error;

/// Failure of a single login or logout attempt.
///
/// Collaborator errors are flattened to their message chain so the error can
/// be cloned into [`SessionState`](super::SessionState) and shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Could not link wallet account: {0}")]
    WalletLink(String),

    #[error("Could not fetch sign-in nonce: {0}")]
    Nonce(String),

    #[error("Session authorization failed: {0}")]
    Authorize(String),

    #[error("Session storage failed: {0}")]
    Storage(String),

    #[error("Sign-out failed: {0}")]
    SignOut(String),
}

impl AuthError {
    /// Short stable identifier, suitable for logs and UI branching
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::WalletLink(_) => "wallet_link",
            AuthError::Nonce(_) => "nonce",
            AuthError::Authorize(_) => "authorize",
            AuthError::Storage(_) => "storage",
            AuthError::SignOut(_) => "sign_out",
        }
    }
}

/// Render an `anyhow` error with its full context chain.
pub(crate) fn chain(err: &anyhow::Error) -> String {
    format!("{:#}", err)
}
