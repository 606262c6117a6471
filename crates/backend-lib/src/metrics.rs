// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const ACCOUNT_REGISTERED: &str = "account.registered";
pub const LOGIN_SUCCESS: &str = "login.success";
pub const LOGIN_FAILURE: &str = "login.failure";
pub const KYC_SUBMITTED: &str = "kyc.submitted";
pub const PASSWORD_RESET: &str = "password.reset";
pub const CONTACT_RELAYED: &str = "contact.relayed";
pub const WITHDRAW_REJECTED: &str = "withdraw.rejected";
