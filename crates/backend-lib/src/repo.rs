// ============================
// crates/backend-lib/src/repo.rs
// ============================
//! Account persistence with a JSON flat-file implementation.
//!
//! One repository interface, one adapter: the whole collection lives in a
//! single `{ "users": [...] }` document on disk. Reads are served from
//! memory; mutations rewrite the document under a write lock so concurrent
//! writers cannot lose updates.
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use bittrust_common::Account;
use serde::{Deserialize, Serialize};
use tokio::{fs as tokio_fs, sync::RwLock};

use crate::error::AppError;

/// Trait for account storage backends
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Look up an account by exact email match
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;

    /// Insert a new account; fails if the email is already registered
    async fn create(&self, account: Account) -> Result<(), AppError>;

    /// Replace the stored account matching `account.email`
    async fn update(&self, account: Account) -> Result<(), AppError>;
}

/// On-disk document shape, kept compatible with the original `data.json`
#[derive(Serialize, Deserialize, Default)]
struct UserFile {
    users: Vec<Account>,
}

/// Flat-file implementation of the `AccountRepository` trait
#[derive(Clone)]
pub struct JsonFileRepo {
    path: PathBuf,
    users: Arc<RwLock<Vec<Account>>>,
}

impl JsonFileRepo {
    /// Open (or create) the account database at `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();

        let users = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let file: UserFile = serde_json::from_str(&raw)?;
            file.users
        } else {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let empty = UserFile::default();
            fs::write(&path, serde_json::to_string_pretty(&empty)?)?;
            Vec::new()
        };

        Ok(Self {
            path,
            users: Arc::new(RwLock::new(users)),
        })
    }

    /// Rewrite the whole document. Callers hold the write lock and commit
    /// to memory only after the write lands, so a failed write cannot
    /// leave the in-memory collection ahead of the file.
    async fn persist(&self, users: &[Account]) -> Result<(), AppError> {
        let file = UserFile {
            users: users.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        tokio_fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountRepository for JsonFileRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, account: Account) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == account.email) {
            return Err(AppError::DuplicateAccount);
        }
        let mut staged = users.clone();
        staged.push(account);
        self.persist(&staged).await?;
        *users = staged;
        Ok(())
    }

    async fn update(&self, account: Account) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let idx = users
            .iter()
            .position(|u| u.email == account.email)
            .ok_or(AppError::AccountNotFound)?;
        let mut staged = users.clone();
        staged[idx] = account;
        self.persist(&staged).await?;
        *users = staged;
        Ok(())
    }
}
