//! Navigation side effect fired when a session ends.

use std::sync::{Mutex, PoisonError};

use tracing::info;

/// Moves the front-end to another location (a route, a screen, a prompt).
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Logs the redirect; for front-ends without a router, such as the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, path: &str) {
        info!(%path, "redirect");
    }
}

/// Remembers every redirect in order. Front-ends can drain it on their own
/// schedule instead of reacting inline.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Take all recorded redirects, leaving the log empty.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.visits.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
    }
}
