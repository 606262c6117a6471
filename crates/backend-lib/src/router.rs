// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router wiring.
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{account, auth, contact, pages};
use crate::middleware;
use crate::repo::AccountRepository;
use crate::AppState;

/// Build the full application router (public entrypoint used by `main.rs`)
pub fn create_router<R: AccountRepository + Clone + 'static>(
    state: Arc<AppState<R>>,
) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(pages::health))
        .route("/register", get(pages::register_form).post(auth::register))
        .route("/login", get(pages::login_form).post(auth::login))
        .route("/logout", get(auth::logout))
        .route(
            "/forgot-password",
            get(auth::forgot_password_form).post(auth::forgot_password),
        )
        .route("/dashboard", get(account::dashboard))
        .route("/kyc", get(account::kyc_form).post(account::kyc_submit))
        .route("/payments", get(account::payments))
        .route("/starter-payments", get(account::starter_payments))
        .route("/bronze-payments", get(account::bronze_payments))
        .route("/silver-payments", get(account::silver_payments))
        .route("/gold-payments", get(account::gold_payments))
        .route("/contact", get(contact::contact_form).post(contact::contact_submit))
        .route("/withdraw", post(account::withdraw))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::<R>,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
