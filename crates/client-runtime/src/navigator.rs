//! Navigation adapter for a headless client.

use fc_01_session::Navigator;
use parking_lot::Mutex;
use shared_types::Route;
use tracing::info;

/// Records the current route and logs every transition.
#[derive(Debug, Default)]
pub struct LoggingNavigator {
    current: Mutex<Option<Route>>,
}

impl LoggingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route of the last navigation.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        *self.current.lock()
    }
}

impl Navigator for LoggingNavigator {
    fn navigate(&self, route: Route) {
        let previous = self.current.lock().replace(route);
        let from = previous.map_or_else(|| "-".to_string(), |r| r.path());
        info!(from = %from, to = %route, "Navigate");
    }
}
