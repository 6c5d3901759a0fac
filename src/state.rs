use std::sync::Arc;

use crate::config::Config;
use crate::services::{EventService, IdentityService};
use crate::store::{EventStore, IdentityStore, InMemoryStore};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub identity: IdentityService,
    /// Mark session cookies `Secure`.
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        event_store: Arc<dyn EventStore>,
        identity_store: Arc<dyn IdentityStore>,
        config: &Config,
    ) -> Self {
        Self {
            events: EventService::new(event_store),
            identity: IdentityService::new(identity_store, config.session_ttl_hours),
            secure_cookies: config.production,
        }
    }

    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(store.clone(), store, config)
    }
}
