// ============================
// crates/backend-lib/src/middleware/rate_limit.rs
// ============================
//! Fixed-window rate limiting keyed by client IP.
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{extract::State, middleware::Next, response::Response};

use crate::error::AppError;
use crate::repo::AccountRepository;
use crate::AppState;

/// Rate limit entry for a client
#[derive(Debug)]
pub struct RateLimitEntry {
    requests: u32,
    window_start: Instant,
}

/// Rate limiter middleware
pub async fn rate_limit<R: AccountRepository + Clone + 'static>(
    State(state): State<Arc<AppState<R>>>,
    request: axum::extract::Request,
    next: Next,
) -> Result<Response, AppError> {
    // Client IP as forwarded by the reverse proxy
    let client_ip = request
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let max_requests = state.settings.rate_limit.max_requests;
    let window = Duration::from_secs(state.settings.rate_limit.window_secs);

    // Drop lapsed windows so the map does not grow one entry per client
    // address forever. Runs before the entry guard is taken.
    state
        .rate_limits
        .retain(|_, e| e.window_start.elapsed() <= window);

    let mut entry = state
        .rate_limits
        .entry(client_ip)
        .or_insert_with(|| RateLimitEntry {
            requests: 0,
            window_start: Instant::now(),
        });

    if entry.window_start.elapsed() > window {
        entry.requests = 0;
        entry.window_start = Instant::now();
    }

    if entry.requests >= max_requests {
        return Err(AppError::RateLimitExceeded);
    }

    entry.requests += 1;
    drop(entry);

    Ok(next.run(request).await)
}
