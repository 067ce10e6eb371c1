use std::sync::Arc;

use crate::{
    db::{InMemoryStore, WardrobeStore},
    services::{Authenticator, SuggestionPlanner},
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn WardrobeStore>,
    pub planner: SuggestionPlanner,
    pub auth: Authenticator,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// In-memory store with rule-based suggestions only and a random token secret
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(store: Arc<dyn WardrobeStore>) -> Self {
        Self {
            store,
            planner: SuggestionPlanner::rule_based(),
            auth: Authenticator::default(),
        }
    }

    pub fn with_planner(mut self, planner: SuggestionPlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_auth(mut self, auth: Authenticator) -> Self {
        self.auth = auth;
        self
    }
}
