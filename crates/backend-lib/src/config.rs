// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Path of the JSON account database
    pub data_file: PathBuf,
    /// Directory for uploaded KYC documents
    pub upload_dir: PathBuf,
    /// Log level filter (`tracing_subscriber` env-filter syntax)
    pub log_level: String,
    /// Session TTL in seconds
    pub session_ttl_secs: u64,
    /// Rate limiting window
    pub rate_limit: RateLimitSettings,
    /// Transactional mail settings
    pub mail: MailSettings,
    /// Fixed wallet addresses shown on the payment pages
    pub wallets: WalletSettings,
}

/// Fixed-window rate limit parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub max_requests: u32,
    pub window_secs: u64,
}

/// Brevo transactional email API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailSettings {
    /// API base URL, e.g. `https://api.brevo.com`
    pub api_url: String,
    /// API key; when absent the mailer runs in log-only mode
    pub api_key: Option<String>,
    /// Sender address on outbound mail
    pub from_email: String,
    /// Sender display name
    pub from_name: String,
    /// Inbox that receives contact-form submissions
    pub contact_inbox: String,
    /// Request timeout for the mail API
    pub timeout_secs: u64,
}

/// Deposit wallet addresses displayed on the payment pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletSettings {
    pub btc: String,
    pub eth: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            data_file: PathBuf::from("data.json"),
            upload_dir: PathBuf::from("uploads"),
            log_level: "info".to_string(),
            session_ttl_secs: 60 * 60 * 24 * 7, // 7 days
            rate_limit: RateLimitSettings {
                max_requests: 100,
                window_secs: 60,
            },
            mail: MailSettings {
                api_url: "https://api.brevo.com".to_string(),
                api_key: None,
                from_email: "no-reply@bittrust.example".to_string(),
                from_name: "BitTrust".to_string(),
                contact_inbox: "support@bittrust.example".to_string(),
                timeout_secs: 10,
            },
            wallets: WalletSettings {
                btc: "bc1qexamplebtcwalletaddress".to_string(),
                eth: "0xExampleEthWalletAddress123".to_string(),
            },
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` and `BITTRUST_`-prefixed environment
    /// variables, layered over the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings with an explicit config file path.
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("BITTRUST_").split("__"))
            .extract()?;
        Ok(settings)
    }
}
