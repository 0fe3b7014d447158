//! Decentralized-identity sessions.
//!
//! This module provides:
//! - `DidSession`: the serializable session handle with expiry
//! - `AccountLink`: CAIP-10 link between a wallet account and a DID
//! - `SessionAuthorizer`: contract for issuing new sessions
//!
//! Sessions are valid for one week unless configured otherwise.

pub mod authorizer;
pub mod message;
pub mod session;

pub use authorizer::{AuthorizeRequest, SessionAuthorizer, CERAMIC_RESOURCE};
pub use message::new_session_key;
pub use session::{AccountLink, Capability, DidSession, DidSessionError, DEFAULT_SESSION_TTL_SECS};
