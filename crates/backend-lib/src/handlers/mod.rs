// ============================
// crates/backend-lib/src/handlers/mod.rs
// ============================
//! HTTP request handlers, one module per domain area.

pub mod account;
pub mod auth;
pub mod contact;
pub mod pages;

use axum::{
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use bittrust_common::Account;

use crate::auth::{Session, SESSION_COOKIE};
use crate::repo::AccountRepository;
use crate::AppState;

/// Extract the session token from the request cookies
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value clearing the session cookie
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Resolve the current session and re-fetch its account from the repository.
///
/// The stored record is authoritative; the session snapshot is identity
/// only. Requests without a live session (or whose account has vanished)
/// get the login redirect of the original flow.
pub async fn require_account<R: AccountRepository>(
    state: &AppState<R>,
    headers: &HeaderMap,
) -> Result<(Session, Account), Response> {
    let Some(token) = session_token(headers) else {
        return Err(Redirect::to("/login").into_response());
    };
    let Some(session) = state.sessions.get(&token).await else {
        return Err(Redirect::to("/login").into_response());
    };
    match state.accounts.find_by_email(&session.email).await {
        Ok(Some(account)) => Ok((session, account)),
        Ok(None) => Err(Redirect::to("/login").into_response()),
        Err(e) => Err(e.into_response()),
    }
}
