// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Registration, login, logout and password reset.
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use bittrust_common::{Account, ApiMessage};
use metrics::counter;
use serde::Deserialize;

use crate::auth::{generate_reset_password, hash_password, hash_password_secure, verify_password};
use crate::error::AppError;
use crate::handlers::{clear_session_cookie, session_cookie, session_token};
use crate::mailer::OutboundEmail;
use crate::metrics::{ACCOUNT_REGISTERED, LOGIN_FAILURE, LOGIN_SUCCESS, PASSWORD_RESET};
use crate::repo::AccountRepository;
use crate::validation;
use crate::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Create an account with zero balances and start a session
pub async fn register<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(mut body): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    validation::validate_name(&body.name)
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    validation::validate_email(&body.email)
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    validation::validate_password(&body.password)
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let password_hash = hash_password_secure(&mut body.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let account = Account::new(body.name, body.email, password_hash);
    state.accounts.create(account.clone()).await?;

    counter!(ACCOUNT_REGISTERED).increment(1);
    tracing::info!(email = %account.email, "account registered");

    let token = state.sessions.new_session(&account).await;
    Ok((
        [(header::SET_COOKIE, session_cookie(&token))],
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// Authenticate and start a session.
///
/// Unknown email and wrong password collapse into one generic rejection.
pub async fn login<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let account = state
        .accounts
        .find_by_email(&body.email)
        .await?
        .filter(|account| verify_password(&account.password_hash, &body.password))
        .ok_or_else(|| {
            counter!(LOGIN_FAILURE).increment(1);
            AppError::InvalidCredentials
        })?;

    counter!(LOGIN_SUCCESS).increment(1);
    let token = state.sessions.new_session(&account).await;
    Ok((
        [(header::SET_COOKIE, session_cookie(&token))],
        Redirect::to("/dashboard"),
    )
        .into_response())
}

/// Destroy the session unconditionally and return to the homepage
pub async fn logout<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    headers: HeaderMap,
) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token).await;
    }
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

/// Shell for the forgot-password form
pub async fn forgot_password_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": null }))
}

/// Generate a replacement password, store its hash and mail the plaintext.
///
/// There is no separate reset token: the generated 8-hex value *is* the new
/// password, effective immediately.
pub async fn forgot_password<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiMessage>, AppError> {
    validation::validate_email(&body.email)
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let mut account = state
        .accounts
        .find_by_email(&body.email)
        .await?
        .ok_or(AppError::AccountNotFound)?;

    let new_password = generate_reset_password();
    account.password_hash =
        hash_password(&new_password).map_err(|e| AppError::Internal(e.to_string()))?;
    state.accounts.update(account.clone()).await?;
    state.sessions.refresh_snapshot(&account).await;

    counter!(PASSWORD_RESET).increment(1);
    tracing::info!(email = %account.email, "password reset");

    let mail = OutboundEmail {
        to_email: account.email.clone(),
        subject: "Your New Password".to_string(),
        html_body: format!(
            "<p>Hello {name},</p>\
             <p>Your new password is: <strong>{new_password}</strong></p>\
             <p>Please log in and change it immediately for security reasons.</p>\
             <br>\
             <p>– The BitTrust Team</p>",
            name = account.name,
        ),
    };

    match state.mailer.send(&mail).await {
        Ok(()) => Ok(Json(ApiMessage::ok(
            "A new password has been sent to your email.",
        ))),
        Err(e) => {
            tracing::warn!(error = %e, "password reset mail failed");
            Ok(Json(ApiMessage::failure(
                "Failed to send email. Try again later.",
            )))
        },
    }
}
