//! Session coordinator: wallet connection, DID session and backend session
//! combined into a single authentication state.
//!
//! ```text
//!            login (no wallet)
//! [Loading] ─────────────────────────────→ [Unauthenticated] ←──┐
//!     │                                          │              │ logout / failure
//!     │ login                                    │ login        │
//!     ▼                                          ▼              │
//! [Authenticating] ───────────────────────→ [Authenticated] ────┘
//! ```
//!
//! Every login attempt and every logout takes a ticket from a monotonically
//! increasing counter. A login only commits while its ticket is the latest,
//! so a slow attempt can never overwrite a newer login or a logout.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::BackendSession;
use crate::did::{AuthorizeRequest, DidSession, SessionAuthorizer, DEFAULT_SESSION_TTL_SECS};
use crate::storage::SessionStorage;
use crate::wallet::{WalletConnector, WalletProvider, WalletStatus};

use super::error::{chain, AuthError};
use super::persisted::PersistedSession;
use super::state::{AuthPhase, SessionState, User};

/// Default application origin used as the sign-in domain
pub const DEFAULT_DOMAIN: &str = "https://app.sigle.io";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Origin (scheme + host) presented to the wallet when authorizing
    pub domain: String,
    pub session_ttl: Duration,
    /// Remove the persisted DID session on logout. When off, a non-expired
    /// session is reused by the next login on this device.
    pub clear_persisted_session_on_logout: bool,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            clear_persisted_session_on_logout: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(User),
    /// No connected wallet; state was reset to unauthenticated
    Unauthenticated,
    /// A newer login or a logout started while this attempt was running;
    /// nothing was committed
    Superseded,
}

pub struct SessionCoordinator {
    wallet: Arc<dyn WalletConnector>,
    authorizer: Arc<dyn SessionAuthorizer>,
    backend: Arc<dyn BackendSession>,
    persisted: PersistedSession,
    options: CoordinatorOptions,
    state: watch::Sender<SessionState>,
    tickets: AtomicU64,
}

impl SessionCoordinator {
    pub fn new(
        wallet: Arc<dyn WalletConnector>,
        authorizer: Arc<dyn SessionAuthorizer>,
        backend: Arc<dyn BackendSession>,
        storage: Arc<dyn SessionStorage>,
        options: CoordinatorOptions,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::loading());
        Self {
            wallet,
            authorizer,
            backend,
            persisted: PersistedSession::new(storage),
            options,
            state,
            tickets: AtomicU64::new(0),
        }
    }

    // =========================================================================
    // State surface
    // =========================================================================

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every committed snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn phase(&self) -> AuthPhase {
        self.state.borrow().phase()
    }

    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    fn next_ticket(&self) -> u64 {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the state if `ticket` is still the latest one issued.
    /// The check and the write happen under the channel's write lock.
    fn commit_with<F>(&self, ticket: u64, next: F) -> bool
    where
        F: FnOnce(&SessionState) -> SessionState,
    {
        self.state.send_if_modified(|state| {
            if self.tickets.load(Ordering::SeqCst) != ticket {
                return false;
            }
            *state = next(state);
            true
        })
    }

    fn commit(&self, ticket: u64, next: SessionState) -> bool {
        self.commit_with(ticket, |_| next)
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// React to a wallet status change. Only a connected wallet starts a login.
    pub async fn handle_wallet_status(
        &self,
        status: WalletStatus,
    ) -> Result<Option<LoginOutcome>, AuthError> {
        debug!(?status, "Wallet status changed");
        match status {
            WalletStatus::Connected => self.login_with_ceramic().await.map(Some),
            WalletStatus::Connecting | WalletStatus::Disconnected => Ok(None),
        }
    }

    /// Feed wallet status changes into the coordinator until the sender is dropped.
    ///
    /// The current status is handled immediately. Login failures are already
    /// committed to the state; the task only logs them.
    pub fn watch_wallet(self: Arc<Self>, mut status: watch::Receiver<WalletStatus>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let current = *status.borrow_and_update();
                if let Err(e) = self.handle_wallet_status(current).await {
                    warn!(error = %e, code = e.error_code(), "Login after wallet connection failed");
                }
                if status.changed().await.is_err() {
                    debug!("Wallet status channel closed");
                    break;
                }
            }
        })
    }

    /// Authenticate the connected wallet account.
    ///
    /// Reuses the persisted DID session when it is still valid for this
    /// account, otherwise authorizes a new one and persists it.
    pub async fn login_with_ceramic(&self) -> Result<LoginOutcome, AuthError> {
        let ticket = self.next_ticket();

        let (provider, address) = match (self.wallet.provider(), self.wallet.address()) {
            (Some(provider), Some(address)) if !address.is_empty() => (provider, address),
            _ => {
                debug!(ticket, "No connected wallet");
                let committed = self.commit(ticket, SessionState::unauthenticated());
                return Ok(if committed {
                    LoginOutcome::Unauthenticated
                } else {
                    LoginOutcome::Superseded
                });
            }
        };

        self.commit_with(ticket, SessionState::authenticating);
        debug!(ticket, address = %address, "Login started");

        match self.resolve_session(&provider, &address).await {
            Ok(did_session) => {
                let user = User { address };
                if self.commit(ticket, SessionState::authenticated(user.clone(), did_session)) {
                    info!(address = %user.address, "Logged in");
                    Ok(LoginOutcome::Authenticated(user))
                } else {
                    debug!(ticket, "Login superseded, result dropped");
                    Ok(LoginOutcome::Superseded)
                }
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), ticket, "Login failed");
                self.commit(ticket, SessionState::failed(e.to_string()));
                Err(e)
            }
        }
    }

    async fn resolve_session(
        &self,
        provider: &WalletProvider,
        address: &str,
    ) -> Result<DidSession, AuthError> {
        let link = self
            .authorizer
            .link_account(provider, address)
            .await
            .map_err(|e| AuthError::WalletLink(chain(&e)))?;

        if let Some(stored) = self.persisted.load()? {
            let expired = stored.has_session() && stored.is_expired();
            let other_account = stored.id().is_some_and(|id| !link.controls(id));
            if !expired && !other_account {
                debug!(minutes_left = ?stored.minutes_until_expiry(), "Reusing persisted DID session");
                return Ok(stored);
            }
            debug!(expired, other_account, "Persisted DID session not reusable");
        }

        let nonce = self
            .backend
            .get_nonce()
            .await
            .map_err(|e| AuthError::Nonce(chain(&e)))?;

        let request = AuthorizeRequest::ceramic(
            nonce,
            self.options.domain.clone(),
            self.options.session_ttl,
        );
        let did_session = self
            .authorizer
            .authorize(&link, &request)
            .await
            .map_err(|e| AuthError::Authorize(chain(&e)))?;

        self.persisted.save(&did_session)?;
        debug!("Authorized and persisted new DID session");
        Ok(did_session)
    }

    /// Sign out everywhere. Always ends unauthenticated.
    ///
    /// The state is reset before the backend sign-out completes; a failed
    /// sign-out is returned but does not change the committed state.
    pub async fn logout(&self) -> Result<(), AuthError> {
        // Invalidate in-flight login attempts
        self.next_ticket();

        if let Err(e) = self.wallet.disconnect().await {
            warn!(error = %chain(&e), "Wallet disconnect failed");
        }

        self.state.send_replace(SessionState::unauthenticated());

        if self.options.clear_persisted_session_on_logout {
            if let Err(e) = self.persisted.clear() {
                warn!(error = %e, "Failed to clear persisted DID session");
            }
        }
        info!("Logged out");

        self.backend.sign_out().await.map_err(|e| {
            let err = AuthError::SignOut(chain(&e));
            warn!(error = %err, "Backend sign-out failed");
            err
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
