use std::sync::Arc;

use tracing::{debug, warn};

use crate::did::DidSession;
use crate::storage::SessionStorage;

use super::error::{chain, AuthError};

/// Storage key of the serialized DID session
pub const DID_SESSION_KEY: &str = "didsession";

/// The DID session record kept in device-local storage.
#[derive(Clone)]
pub struct PersistedSession {
    storage: Arc<dyn SessionStorage>,
}

impl PersistedSession {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Load the stored session.
    ///
    /// A record that does not parse is reported and treated as absent, so the
    /// next login authorizes a new session and overwrites it.
    pub fn load(&self) -> Result<Option<DidSession>, AuthError> {
        let raw = self
            .storage
            .get(DID_SESSION_KEY)
            .map_err(|e| AuthError::Storage(chain(&e)))?;

        let Some(raw) = raw else {
            debug!("No persisted DID session");
            return Ok(None);
        };

        match DidSession::from_session(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(error = %e, "Discarding unreadable persisted DID session");
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &DidSession) -> Result<(), AuthError> {
        self.storage
            .set(DID_SESSION_KEY, &session.serialize())
            .map_err(|e| AuthError::Storage(chain(&e)))
    }

    pub fn clear(&self) -> Result<(), AuthError> {
        self.storage
            .remove(DID_SESSION_KEY)
            .map_err(|e| AuthError::Storage(chain(&e)))
    }
}
