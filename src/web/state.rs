// src/web/state.rs
// Web server state management

use std::sync::Arc;

use crate::frontend::SavedQuerySource;
use crate::notify::Dispatcher;
use crate::saved_query::SavedQueryCache;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// All saved queries on the instance
    pub cache: Arc<SavedQueryCache>,

    /// Frontend store, used to release query metadata on delete
    pub source: Arc<dyn SavedQuerySource>,

    /// Subscription notifier
    pub dispatcher: Arc<Dispatcher>,

    /// Global kill switch for notifications
    pub notifications_disabled: bool,
}

impl AppState {
    /// Create new application state
    pub fn new(
        cache: Arc<SavedQueryCache>,
        source: Arc<dyn SavedQuerySource>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            cache,
            source,
            dispatcher,
            notifications_disabled: false,
        }
    }

    pub fn with_notifications_disabled(mut self, disabled: bool) -> Self {
        self.notifications_disabled = disabled;
        self
    }

    /// Whether a callback should dispatch notifications
    pub fn should_notify(&self, suppressed_by_caller: bool) -> bool {
        !self.notifications_disabled && !suppressed_by_caller
    }
}
