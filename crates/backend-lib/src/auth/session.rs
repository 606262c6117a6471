// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};

use bittrust_common::Account;
use metrics::{counter, gauge};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "bittrust_session";

/// Snapshot of the authenticated account held per session.
///
/// Holds identity only; handlers re-read the repository for balances and
/// KYC state so the snapshot can never go stale against the stored record.
#[derive(Clone)]
pub struct Session {
    pub email: String,
    pub name: String,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

/// Session manager for handling authentication tokens
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager and spawn its expiry sweeper
    pub fn new(ttl: Duration) -> Self {
        let manager = SessionManager {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        };

        let manager_clone = manager.clone();
        tokio::spawn(async move {
            manager_clone.cleanup_task().await;
        });

        manager
    }

    /// Establish a session for an account, returning the cookie token
    pub async fn new_session(&self, account: &Account) -> String {
        let token = Uuid::new_v4().to_string();
        let now = SystemTime::now();
        let session = Session {
            email: account.email.clone(),
            name: account.name.clone(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);

        counter!("session.created").increment(1);
        gauge!("session.active").set(sessions.len() as f64);

        token
    }

    /// Get a live session by token; expired sessions read as absent
    pub async fn get(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| SystemTime::now() < s.expires_at)
            .cloned()
    }

    /// Validate a session token
    pub async fn validate_session(&self, token: &str) -> bool {
        self.get(token).await.is_some()
    }

    /// Destroy a session unconditionally (logout)
    pub async fn revoke(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        if sessions.remove(token).is_some() {
            counter!("session.revoked").increment(1);
            gauge!("session.active").set(sessions.len() as f64);
        }
    }

    /// Refresh the snapshot in every live session belonging to an account.
    ///
    /// Called after any account mutation so no session keeps serving a
    /// pre-mutation snapshot.
    pub async fn refresh_snapshot(&self, account: &Account) {
        let mut sessions = self.sessions.write().await;
        for session in sessions.values_mut() {
            if session.email == account.email {
                session.name = account.name.clone();
            }
        }
    }

    /// Cleanup task that runs periodically to remove expired sessions
    async fn cleanup_task(&self) {
        let cleanup_interval = Duration::from_secs(60 * 60); // 1 hour

        loop {
            tokio::time::sleep(cleanup_interval).await;

            let mut sessions = self.sessions.write().await;
            let now = SystemTime::now();
            let before_count = sessions.len();

            sessions.retain(|_, session| now < session.expires_at);

            let removed = before_count - sessions.len();
            if removed > 0 {
                counter!("session.expired").increment(removed as u64);
                gauge!("session.active").set(sessions.len() as f64);
            }
        }
    }
}
