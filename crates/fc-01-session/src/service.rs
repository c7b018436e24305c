//! # Session Service
//!
//! `CredentialStore` owns the persisted token; `SessionEvaluator` interprets it.
//!
//! Claims are recomputed on every call because the credential can be rotated
//! or removed externally (another tab, another process).

use crate::domain::{evaluate, Credential, TokenStatus};
use crate::error::SessionError;
use crate::ports::{ClientStorage, Clock, Navigator};
use crate::{ADMIN_ROLE, CREDENTIAL_KEY};
use shared_types::Route;
use std::sync::Arc;
use tracing::{debug, info};

/// Sole owner of the persisted credential.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn ClientStorage>,
}

impl CredentialStore {
    /// Wrap a client storage backend.
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }

    /// Current credential, if any.
    #[must_use]
    pub fn get(&self) -> Option<Credential> {
        self.storage
            .get_item(CREDENTIAL_KEY)
            .filter(|token| !token.is_empty())
            .map(Credential::from)
    }

    /// Store a credential, replacing the previous one.
    pub fn set(&self, credential: impl Into<Credential>) {
        let credential = credential.into();
        self.storage.set_item(CREDENTIAL_KEY, credential.as_str());
    }

    /// Remove the credential and every other value persisted for the session.
    pub fn clear(&self) {
        self.storage.remove_item(CREDENTIAL_KEY);
        self.storage.clear();
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("has_credential", &self.get().is_some())
            .finish()
    }
}

/// Decodes and interprets the stored credential.
///
/// Checks here drive UI decisions only; they never replace server-side
/// authorization.
#[derive(Clone)]
pub struct SessionEvaluator {
    store: CredentialStore,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
}

impl SessionEvaluator {
    /// Create an evaluator over `storage`.
    pub fn new(
        storage: Arc<dyn ClientStorage>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store: CredentialStore::new(storage),
            clock,
            navigator,
        }
    }

    /// The credential store this evaluator reads.
    #[must_use]
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Evaluate the stored credential without side effects.
    ///
    /// Returns `None` when no credential is stored.
    #[must_use]
    pub fn status(&self) -> Option<TokenStatus> {
        let credential = self.store.get()?;
        Some(evaluate(credential.as_str(), self.clock.now_unix()))
    }

    /// Clear the store if the stored credential is expired or undecodable.
    ///
    /// # Returns
    ///
    /// `true` if a stale credential was swept.
    pub fn sweep_if_expired(&self) -> bool {
        match self.status() {
            Some(status) if status.is_stale() => {
                debug!(status = ?status, "Sweeping stale credential");
                self.store.clear();
                true
            }
            _ => false,
        }
    }

    /// Whether a credential exists and decodes with unexpired claims.
    ///
    /// Runs [`Self::sweep_if_expired`] first, so an expired or malformed
    /// credential is removed as a consequence of this check.
    pub fn is_authenticated(&self) -> bool {
        self.sweep_if_expired();
        matches!(self.status(), Some(TokenStatus::Valid(_)))
    }

    /// The credential, if it currently authenticates the session.
    pub fn credential(&self) -> Option<Credential> {
        if self.is_authenticated() {
            self.store.get()
        } else {
            None
        }
    }

    /// Whether the session's claims grant `role`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Decode`] when a credential is stored but cannot
    /// be decoded. Unlike [`Self::is_authenticated`], the failure is surfaced so
    /// the caller can redirect instead of silently denying.
    pub fn is_privileged(&self, role: &str) -> Result<bool, SessionError> {
        match self.status() {
            None => Ok(false),
            Some(TokenStatus::Malformed(e)) => Err(SessionError::Decode(e)),
            Some(TokenStatus::Expired) => {
                self.sweep_if_expired();
                Ok(false)
            }
            Some(TokenStatus::Valid(claims)) => Ok(claims.has_role(role)),
        }
    }

    /// Whether the session holds the administrator role.
    ///
    /// # Errors
    ///
    /// See [`Self::is_privileged`].
    pub fn is_admin(&self) -> Result<bool, SessionError> {
        self.is_privileged(ADMIN_ROLE)
    }

    /// Clear all session state and send the user to the login page.
    ///
    /// Runs whether or not a credential was present.
    pub fn logout(&self) {
        let had_credential = self.store.get().is_some();
        self.store.clear();
        info!(had_credential = had_credential, "Session logged out");
        self.navigator.navigate(Route::Login);
    }

    /// Issue a navigation through the session's navigator.
    pub fn redirect(&self, route: Route) {
        debug!(route = %route, "Redirecting");
        self.navigator.navigate(route);
    }
}

impl std::fmt::Debug for SessionEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvaluator")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
