//! Authentication module for wallet sign-in.
//!
//! This module provides:
//! - `SessionCoordinator`: the login/logout state machine
//! - `SessionState`: the snapshot consumers observe
//! - `PersistedSession`: the DID session record in device-local storage
//!
//! A DID session is reused across runs until it expires.

pub mod coordinator;
pub mod error;
pub mod persisted;
pub mod state;

pub use coordinator::{CoordinatorOptions, LoginOutcome, SessionCoordinator, DEFAULT_DOMAIN};
pub use error::AuthError;
pub use persisted::{PersistedSession, DID_SESSION_KEY};
pub use state::{AuthPhase, SessionState, User};
