// ================
// common/src/lib.rs
// ================
//! Common types shared between the `BitTrust` backend and its clients.
//! This module defines the stored account record and the JSON bodies
//! returned by the form-style endpoints.

use serde::{Deserialize, Serialize};

/// Investment tier attached to an account.
///
/// Tiers carry no pricing or return logic server-side; they drive which
/// payment instructions are shown.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Package {
    #[default]
    None,
    Starter,
    Bronze,
    Silver,
    Gold,
}

impl Package {
    /// Display name as used on the payment pages.
    pub fn as_str(self) -> &'static str {
        match self {
            Package::None => "None",
            Package::Starter => "Starter",
            Package::Bronze => "Bronze",
            Package::Silver => "Silver",
            Package::Gold => "Gold",
        }
    }
}

/// KYC review state for an account.
///
/// Only `None` and `Pending` are ever set by the backend itself;
/// `Approved`/`Rejected` exist for records edited out of band.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    #[default]
    None,
    Pending,
    Approved,
    Rejected,
}

impl<'de> Deserialize<'de> for KycStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Hand-edited data files may carry statuses the backend never
        // writes; anything unrecognized loads as `None` so a stray value
        // cannot keep the whole document from parsing.
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "pending" => KycStatus::Pending,
            "approved" => KycStatus::Approved,
            "rejected" => KycStatus::Rejected,
            _ => KycStatus::None,
        })
    }
}

/// A registered user's stored profile and investment ledger.
///
/// `email` is the unique key (case-sensitive equality). Balances default to
/// zero at registration and are display-only: no request path mutates them.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Account {
    pub name: String,
    pub email: String,
    /// Scrypt PHC-format hash of the account password.
    pub password_hash: String,
    #[serde(default)]
    pub package: Package,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub profit: f64,
    /// Defaults to `none` for records that predate the KYC flow.
    #[serde(default, rename = "kycStatus")]
    pub kyc_status: KycStatus,
    /// Stored filename of the uploaded ID front, if any.
    #[serde(default, rename = "frontId")]
    pub front_id: Option<String>,
    /// Stored filename of the uploaded ID back, if any.
    #[serde(default, rename = "backId")]
    pub back_id: Option<String>,
}

impl Account {
    /// Create a fresh account with zero balances and no package.
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            email,
            password_hash,
            package: Package::None,
            amount: 0.0,
            profit: 0.0,
            kyc_status: KycStatus::None,
            front_id: None,
            back_id: None,
        }
    }
}

/// Generic `{success, message}` body used by the form-style endpoints
/// (contact relay, password reset, withdrawal).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
}

impl ApiMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}
