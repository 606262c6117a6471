// ============================
// bittrust-backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the `BitTrust` HTTP server.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod metrics;
pub mod middleware;
pub mod repo;
pub mod router;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

use crate::auth::SessionManager;
use crate::config::Settings;
use crate::mailer::Mailer;
use crate::middleware::rate_limit::RateLimitEntry;
use crate::repo::AccountRepository;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<R> {
    /// Session manager
    pub sessions: Arc<SessionManager>,
    /// Settings
    pub settings: Arc<Settings>,
    /// Account repository
    pub accounts: R,
    /// Transactional mail backend
    pub mailer: Arc<dyn Mailer>,
    /// Per-client rate limit windows
    pub rate_limits: Arc<DashMap<String, RateLimitEntry>>,
}

impl<R: AccountRepository> AppState<R> {
    /// Create a new application state
    pub fn new(accounts: R, mailer: Arc<dyn Mailer>, settings: Settings) -> Self {
        let sessions = Arc::new(SessionManager::new(Duration::from_secs(
            settings.session_ttl_secs,
        )));

        Self {
            sessions,
            settings: Arc::new(settings),
            accounts,
            mailer,
            rate_limits: Arc::new(DashMap::new()),
        }
    }
}
