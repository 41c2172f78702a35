//! Shared types for the HTTP API layer.

use std::sync::Arc;

use crate::chat::ChatProvider;
use crate::db::Repository;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub repo: Arc<Repository>,
    pub chat: Arc<dyn ChatProvider>,
}

impl ApiContext {
    pub fn new(repo: Arc<Repository>, chat: Arc<dyn ChatProvider>) -> Self {
        Self { repo, chat }
    }
}
