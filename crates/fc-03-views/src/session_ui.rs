//! # Session Controller
//!
//! Sequencing of login completion and logout across the credential store, the
//! realtime channel, toasts and navigation.

use crate::ports::{AuthApi, FetchError};
use crate::toast::ToastService;
use fc_01_session::{Credential, SessionEvaluator};
use fc_02_realtime::ConnectionManager;
use shared_types::Route;
use std::sync::Arc;
use tracing::{info, warn};

pub const LOGIN_SUCCESS_TEXT: &str = "Logged in!";
pub const LOGIN_FAILURE_TEXT: &str = "Error logging in";
pub const LOGOUT_SUCCESS_TEXT: &str = "Logged out";
pub const LOGOUT_FAILURE_TEXT: &str = "Error during logout";

/// Login and logout flows of the client.
#[derive(Clone)]
pub struct SessionController {
    session: SessionEvaluator,
    connection: ConnectionManager,
    auth: Arc<dyn AuthApi>,
    toasts: Arc<ToastService>,
}

impl SessionController {
    pub fn new(
        session: SessionEvaluator,
        connection: ConnectionManager,
        auth: Arc<dyn AuthApi>,
        toasts: Arc<ToastService>,
    ) -> Self {
        Self {
            session,
            connection,
            auth,
            toasts,
        }
    }

    /// Store the credential issued by a successful login and open the channel.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn complete_login(&self, token: impl Into<Credential>) {
        self.session.store().set(token);
        let connecting = self.connection.connect();
        info!(connecting = connecting, "Login completed");
        self.toasts.success(LOGIN_SUCCESS_TEXT);
        self.session.redirect(Route::Events);
    }

    /// Report a rejected login attempt.
    pub fn login_failed(&self) {
        self.toasts.error(LOGIN_FAILURE_TEXT);
    }

    /// End the session.
    ///
    /// The server is told first when a credential exists. Local state is
    /// cleared, the channel closed and the user sent to the login page
    /// whatever the server answered.
    ///
    /// # Errors
    ///
    /// Returns the server-side failure after the local logout has completed.
    pub async fn logout(&self) -> Result<(), FetchError> {
        let outcome = match self.session.store().get() {
            Some(credential) => self.auth.logout(&credential).await,
            None => Ok(()),
        };

        self.connection.disconnect();
        self.session.logout();

        match &outcome {
            Ok(()) => self.toasts.success(LOGOUT_SUCCESS_TEXT),
            Err(e) => {
                warn!(error = %e, "Server logout failed, local session cleared anyway");
                self.toasts.error(LOGOUT_FAILURE_TEXT);
            }
        }
        outcome
    }

    /// Whether the session is authenticated.
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Whether administrative UI should be shown.
    ///
    /// An undecodable credential counts as not admin.
    pub fn is_admin(&self) -> bool {
        match self.session.is_admin() {
            Ok(admin) => admin,
            Err(e) => {
                warn!(error = %e, "Role check failed");
                false
            }
        }
    }

    #[must_use]
    pub fn session(&self) -> &SessionEvaluator {
        &self.session
    }

    #[must_use]
    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }
}
