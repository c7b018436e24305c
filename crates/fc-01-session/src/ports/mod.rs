//! Ports Layer (Driven Ports)
//!
//! Dependencies the session subsystem needs from its host.

use shared_types::Route;

/// Local key/value persistence, shaped like browser local storage.
///
/// Implementations never fail loudly: an unavailable store behaves as an
/// empty one, which degrades the client to "logged out".
pub trait ClientStorage: Send + Sync {
    /// Read a value.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    fn set_item(&self, key: &str, value: &str);

    /// Remove one value.
    fn remove_item(&self, key: &str);

    /// Remove every value held for this client.
    fn clear(&self);
}

/// Wall-clock source used for expiry comparisons.
pub trait Clock: Send + Sync {
    /// Current time in seconds since the Unix epoch.
    fn now_unix(&self) -> i64;
}

/// Navigation side effect issued on logout and by route guards.
pub trait Navigator: Send + Sync {
    /// Move the application to `route`.
    fn navigate(&self, route: Route);
}
