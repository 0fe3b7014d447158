//! Backend session exchange with the Sigle API.
//!
//! This module provides the `BackendSession` contract and `ApiClient`, its
//! HTTP implementation. The API uses next-auth: a CSRF token doubles as the
//! single-use nonce for sign-in, and sign-out revokes the session cookie.

pub mod client;
pub mod error;

use anyhow::Result;
use async_trait::async_trait;

pub use client::ApiClient;
pub use error::ApiError;

#[async_trait]
pub trait BackendSession: Send + Sync {
    /// Fetch a single-use anti-replay nonce
    async fn get_nonce(&self) -> Result<String>;

    /// Revoke the server-side session
    async fn sign_out(&self) -> Result<()>;
}
