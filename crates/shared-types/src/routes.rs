//! # Navigation Targets
//!
//! Pages the session layer can redirect to.

use crate::entities::EventId;
use std::fmt;

/// A navigation target of the client application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Unauthenticated entry point.
    Login,
    /// Account creation page.
    Register,
    /// Paginated event list (authenticated landing page).
    Events,
    /// Details and live feedback of one event.
    EventDetails(EventId),
    /// Event creation form (administrators only).
    CreateEvent,
}

impl Route {
    /// Path of this route in the client application.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Events => "/events".to_string(),
            Self::EventDetails(id) => format!("/events/{id}"),
            Self::CreateEvent => "/events/create".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
