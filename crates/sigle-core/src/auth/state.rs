use serde::Serialize;

#[cfg(feature = "ts")]
use ts_rs::TS;

use crate::did::DidSession;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct User {
    pub address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub enum AuthPhase {
    Loading,
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Snapshot of the authentication state shared with consumers.
///
/// Snapshots are replaced wholesale on every transition. The DID session is
/// kept out of the serialized form; front-ends only need the flags and user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(TS), ts(export))]
pub struct SessionState {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub is_authenticating: bool,
    pub user: Option<User>,
    #[serde(skip)]
    pub did_session: Option<DidSession>,
    /// Message of the last failed login attempt
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::loading()
    }
}

impl SessionState {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            is_authenticated: false,
            is_authenticating: false,
            user: None,
            did_session: None,
            error: None,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            is_loading: false,
            ..Self::loading()
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::unauthenticated()
        }
    }

    pub fn authenticated(user: User, did_session: DidSession) -> Self {
        Self {
            is_loading: false,
            is_authenticated: true,
            is_authenticating: false,
            user: Some(user),
            did_session: Some(did_session),
            error: None,
        }
    }

    /// Same snapshot with an attempt marked in flight; a previous failure is dropped
    pub fn authenticating(&self) -> Self {
        Self {
            is_authenticating: true,
            error: None,
            ..self.clone()
        }
    }

    pub fn phase(&self) -> AuthPhase {
        if self.is_authenticating {
            AuthPhase::Authenticating
        } else if self.is_loading {
            AuthPhase::Loading
        } else if self.is_authenticated {
            AuthPhase::Authenticated
        } else {
            AuthPhase::Unauthenticated
        }
    }
}
