//! Sigle core - wallet sign-in and decentralized-identity sessions.
//!
//! The [`SessionCoordinator`] walks a user through wallet connection, DID
//! session acquisition and the backend session exchange, and publishes the
//! resulting [`SessionState`] to any number of subscribers. Its collaborators
//! are injected as trait objects:
//!
//! - [`WalletConnector`](wallet::WalletConnector)
//! - [`SessionAuthorizer`](did::SessionAuthorizer)
//! - [`BackendSession`](api::BackendSession), implemented over HTTP by [`ApiClient`]
//! - [`SessionStorage`](storage::SessionStorage)

pub mod api;
pub mod auth;
pub mod config;
pub mod did;
pub mod storage;
pub mod wallet;

pub use api::{ApiClient, ApiError};
pub use auth::{
    AuthError, AuthPhase, CoordinatorOptions, LoginOutcome, SessionCoordinator, SessionState, User,
};
pub use config::Config;
pub use did::DidSession;
