// ABOUTME: Navigation seam used to force the user back to the login entry point
// ABOUTME: Provides a logging navigator and a recording navigator for tests

use std::sync::atomic::{AtomicUsize, Ordering};

/// Where the session layer sends the user when a session cannot be recovered.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Navigator that only records the redirect in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self) {
        tracing::warn!("session expired, login required");
    }
}

/// Counts redirects.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}
