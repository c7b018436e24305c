//! Route guards.
//!
//! Page-level access decisions derived from the session. These only decide
//! where the user is sent; the server still authorizes every request.

use crate::service::SessionEvaluator;
use shared_types::Route;
use tracing::{debug, warn};

/// Result of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Navigation may proceed.
    Allow,
    /// Navigation is refused; go here instead.
    Redirect(Route),
}

impl GuardOutcome {
    /// Whether navigation may proceed.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Access rule attached to a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteGuard {
    /// Page requires a valid session.
    RequireAuthenticated,
    /// Page is only for visitors without a session (login, register).
    RequireAnonymous,
    /// Page requires the administrator role.
    RequireAdmin,
}

impl RouteGuard {
    /// Decide whether the current session may enter a guarded page.
    pub fn check(&self, session: &SessionEvaluator) -> GuardOutcome {
        match self {
            Self::RequireAuthenticated => {
                if session.is_authenticated() {
                    GuardOutcome::Allow
                } else {
                    GuardOutcome::Redirect(Route::Login)
                }
            }
            Self::RequireAnonymous => {
                if session.is_authenticated() {
                    GuardOutcome::Redirect(Route::Events)
                } else {
                    GuardOutcome::Allow
                }
            }
            Self::RequireAdmin => {
                if !session.is_authenticated() {
                    return GuardOutcome::Redirect(Route::Login);
                }
                match session.is_admin() {
                    Ok(true) => GuardOutcome::Allow,
                    Ok(false) => GuardOutcome::Redirect(Route::Login),
                    Err(e) => {
                        warn!(error = %e, "Admin check failed");
                        GuardOutcome::Redirect(Route::Login)
                    }
                }
            }
        }
    }

    /// Check and, on refusal, issue the redirect through the session navigator.
    ///
    /// # Returns
    ///
    /// `true` if navigation may proceed.
    pub fn enforce(&self, session: &SessionEvaluator) -> bool {
        match self.check(session) {
            GuardOutcome::Allow => true,
            GuardOutcome::Redirect(route) => {
                debug!(guard = ?self, route = %route, "Guard refused navigation");
                session.redirect(route);
                false
            }
        }
    }
}
