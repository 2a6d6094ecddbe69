/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 *   - auth: HS256 verifier, files: ownership lookup + URL signing
 * - Cloned per request (everything inside is Arc)
 */
use std::sync::Arc;

use crate::services::{auth::AuthService, files::FileBackend};

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub files: Arc<dyn FileBackend>,
}

impl AppState {
    pub fn new(auth: Arc<AuthService>, files: Arc<dyn FileBackend>) -> Self {
        Self { auth, files }
    }
}
