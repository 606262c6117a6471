// ============================
// crates/backend-lib/src/handlers/account.rs
// ============================
//! Dashboard, KYC submission, payment pages and the withdrawal stub.
use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use bittrust_common::{ApiMessage, KycStatus, Package};
use metrics::counter;
use serde::{Deserialize, Serialize};
use tokio::{fs as tokio_fs, io::AsyncWriteExt};
use uuid::Uuid;

use crate::error::AppError;
use crate::handlers::require_account;
use crate::metrics::{KYC_SUBMITTED, WITHDRAW_REJECTED};
use crate::repo::AccountRepository;
use crate::AppState;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub name: String,
    pub package: &'static str,
    pub investment: f64,
    pub profit: f64,
    pub kyc_status: KycStatus,
}

#[derive(Deserialize)]
pub struct KycQuery {
    pub submitted: Option<String>,
}

#[derive(Serialize)]
pub struct KycResponse {
    pub kyc_status: KycStatus,
    pub submitted: bool,
}

#[derive(Serialize)]
pub struct Wallets {
    pub btc: String,
    pub eth: String,
}

#[derive(Serialize)]
pub struct PaymentsResponse {
    pub package: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub wallets: Wallets,
}

/// Account summary; always re-reads the stored record
pub async fn dashboard<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Response {
    let (_session, account) = match require_account(&state, &headers).await {
        Ok(pair) => pair,
        Err(redirect) => return redirect,
    };

    Json(DashboardResponse {
        name: account.name,
        package: account.package.as_str(),
        investment: account.amount,
        profit: account.profit,
        kyc_status: account.kyc_status,
    })
    .into_response()
}

/// KYC form state; `submitted` mirrors the post-submit query flag
pub async fn kyc_form<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    Query(query): Query<KycQuery>,
) -> Response {
    let (_session, account) = match require_account(&state, &headers).await {
        Ok(pair) => pair,
        Err(redirect) => return redirect,
    };

    Json(KycResponse {
        kyc_status: account.kyc_status,
        submitted: query.submitted.as_deref() == Some("true"),
    })
    .into_response()
}

/// Accept ID uploads and mark the account as pending review.
///
/// Re-submission keeps the status at `pending` and replaces the stored
/// file references.
pub async fn kyc_submit<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let (_session, mut account) = match require_account(&state, &headers).await {
        Ok(pair) => pair,
        Err(redirect) => return Ok(redirect),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(e.to_string()))?
    {
        let slot = match field.name() {
            Some("frontId") => true,
            Some("backId") => false,
            _ => continue,
        };

        let original_name = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
        if data.is_empty() {
            continue;
        }

        let stored_name = store_upload(&state, &original_name, &data).await?;
        if slot {
            account.front_id = Some(stored_name);
        } else {
            account.back_id = Some(stored_name);
        }
    }

    account.kyc_status = KycStatus::Pending;
    state.accounts.update(account.clone()).await?;
    state.sessions.refresh_snapshot(&account).await;

    counter!(KYC_SUBMITTED).increment(1);
    tracing::info!(email = %account.email, "KYC documents submitted");

    // The query flag drives the confirmation popup client-side.
    Ok(Redirect::to("/kyc?submitted=true").into_response())
}

/// Write an upload under a generated filename, keeping only the extension
/// from the client-supplied name.
async fn store_upload<R: AccountRepository>(
    state: &AppState<R>,
    original_name: &str,
    data: &[u8],
) -> Result<String, AppError> {
    let upload_dir = &state.settings.upload_dir;
    tokio_fs::create_dir_all(upload_dir).await?;

    let stored_name = match Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
    {
        Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
        None => Uuid::new_v4().to_string(),
    };

    let mut file = tokio_fs::File::create(upload_dir.join(&stored_name)).await?;
    file.write_all(data).await?;
    Ok(stored_name)
}

/// Payment instructions for the caller's own package
pub async fn payments<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Response {
    let (_session, account) = match require_account(&state, &headers).await {
        Ok(pair) => pair,
        Err(redirect) => return redirect,
    };

    payment_instructions(&state, account.package, Some(account.amount)).into_response()
}

/// Fixed-tier payment pages (public)
pub async fn starter_payments<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Response {
    payment_instructions(&state, Package::Starter, None).into_response()
}

pub async fn bronze_payments<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Response {
    payment_instructions(&state, Package::Bronze, None).into_response()
}

pub async fn silver_payments<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Response {
    payment_instructions(&state, Package::Silver, None).into_response()
}

pub async fn gold_payments<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> Response {
    payment_instructions(&state, Package::Gold, None).into_response()
}

fn payment_instructions<R: AccountRepository>(
    state: &AppState<R>,
    package: Package,
    amount: Option<f64>,
) -> Json<PaymentsResponse> {
    Json(PaymentsResponse {
        package: package.as_str(),
        amount,
        wallets: Wallets {
            btc: state.settings.wallets.btc.clone(),
            eth: state.settings.wallets.eth.clone(),
        },
    })
}

/// Withdrawal stub; never touches the stored balances
pub async fn withdraw<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Response {
    let (_session, _account) = match require_account(&state, &headers).await {
        Ok(pair) => pair,
        Err(redirect) => return redirect,
    };

    counter!(WITHDRAW_REJECTED).increment(1);
    Json(ApiMessage::failure(
        "Profit can only be withdrawn after the investment period is complete.",
    ))
    .into_response()
}
