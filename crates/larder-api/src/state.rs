//! Shared application state.

use std::sync::Arc;

use larder_core::{AccessPolicy, EntryRepository};

/// State handed to every handler: the entry repository behind a trait object
/// (PostgreSQL in production, in-memory in tests) and the authorization
/// policy.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn EntryRepository>,
    pub policy: AccessPolicy,
}

impl AppState {
    pub fn new(repo: Arc<dyn EntryRepository>, policy: AccessPolicy) -> Self {
        Self { repo, policy }
    }
}
