// crates/backend-lib/tests/http_api.rs

//! Black-box tests driving the full router with `tower::ServiceExt`.
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use backend_lib::{
    config::Settings,
    error::AppError,
    mailer::{Mailer, OutboundEmail},
    repo::JsonFileRepo,
    router::create_router,
    AppState,
};
use tempfile::TempDir;
use tokio::sync::Mutex;
use tower::ServiceExt;

/// Mailer that records every outbound message
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: &OutboundEmail) -> Result<(), AppError> {
        self.sent.lock().await.push(mail.clone());
        Ok(())
    }
}

/// Mailer that always fails, standing in for an unreachable mail API
struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _mail: &OutboundEmail) -> Result<(), AppError> {
        Err(AppError::Mail("connection refused".to_string()))
    }
}

struct TestApp {
    app: Router,
    dir: TempDir,
}

fn spawn_app(mailer: Arc<dyn Mailer>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.data_file = dir.path().join("data.json");
    settings.upload_dir = dir.path().join("uploads");
    // Keep the limiter out of the way unless a test opts in.
    settings.rate_limit.max_requests = 10_000;

    let repo = JsonFileRepo::new(&settings.data_file).unwrap();
    let state = Arc::new(AppState::new(repo, mailer, settings));
    TestApp {
        app: create_router(state),
        dir,
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Pull the bare session cookie out of a `Set-Cookie` header
fn session_cookie(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn register(app: &Router, name: &str, email: &str, password: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            "/register",
            serde_json::json!({ "name": name, "email": email, "password": password }),
        ))
        .await
        .unwrap()
}

async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_register_creates_account_with_zero_balances() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));

    let response = register(&test.app, "Ada", "ada@example.com", "password123").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/dashboard");
    let cookie = session_cookie(&response);
    assert!(cookie.starts_with("bittrust_session="));

    let response = get_with_cookie(&test.app, "/dashboard", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["name"], "Ada");
    assert_eq!(body["package"], "None");
    assert_eq!(body["investment"], 0.0);
    assert_eq!(body["profit"], 0.0);
    assert_eq!(body["kyc_status"], "none");
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));

    let response = register(&test.app, "Ada", "ada@example.com", "password123").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = register(&test.app, "Imposter", "ada@example.com", "password456").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "ACCT_001");
}

#[tokio::test]
async fn test_login_success_and_generic_rejection() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));
    register(&test.app, "Ada", "ada@example.com", "password123").await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            serde_json::json!({ "email": "ada@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response);

    let response = get_with_cookie(&test.app, "/dashboard", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password and unknown email must be indistinguishable.
    let wrong_password = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            serde_json::json!({ "email": "ada@example.com", "password": "nope-nope" }),
        ))
        .await
        .unwrap();
    let unknown_email = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            serde_json::json!({ "email": "ghost@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    let a = body_json(wrong_password).await;
    let b = body_json(unknown_email).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_dashboard_requires_session() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));

    let response = test
        .app
        .clone()
        .oneshot(Request::builder().uri("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));
    let response = register(&test.app, "Ada", "ada@example.com", "password123").await;
    let cookie = session_cookie(&response);

    let response = get_with_cookie(&test.app, "/logout", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");

    let response = get_with_cookie(&test.app, "/dashboard", &cookie).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn test_password_reset_issues_8_hex_working_password() {
    let mailer = Arc::new(RecordingMailer::default());
    let test = spawn_app(mailer.clone());
    register(&test.app, "Ada", "ada@example.com", "password123").await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/forgot-password",
            serde_json::json!({ "email": "ada@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let sent = mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to_email, "ada@example.com");
    assert_eq!(sent[0].subject, "Your New Password");

    // The mail body carries the plaintext replacement password.
    let html = &sent[0].html_body;
    let start = html.find("<strong>").unwrap() + "<strong>".len();
    let end = html.find("</strong>").unwrap();
    let new_password = &html[start..end];
    assert_eq!(new_password.len(), 8);
    assert!(new_password.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(new_password, "password123");
    drop(sent);

    // The old password no longer works; the mailed one does.
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            serde_json::json!({ "email": "ada@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let sent = mailer.sent.lock().await;
    let html = &sent[0].html_body;
    let start = html.find("<strong>").unwrap() + "<strong>".len();
    let end = html.find("</strong>").unwrap();
    let new_password = html[start..end].to_string();
    drop(sent);

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/login",
            serde_json::json!({ "email": "ada@example.com", "password": new_password }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_password_reset_unknown_email() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/forgot-password",
            serde_json::json!({ "email": "ghost@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "ACCT_002");
}

#[tokio::test]
async fn test_password_reset_reports_mail_failure() {
    let test = spawn_app(Arc::new(FailingMailer));
    register(&test.app, "Ada", "ada@example.com", "password123").await;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/forgot-password",
            serde_json::json!({ "email": "ada@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

fn multipart_kyc_request(cookie: &str) -> Request<Body> {
    let boundary = "XKYCBOUNDARY";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"frontId\"; filename=\"front.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         front-bytes\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"backId\"; filename=\"back.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         back-bytes\r\n\
         --{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/kyc")
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_kyc_submission_sets_pending_and_stores_uploads() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));
    let response = register(&test.app, "Ada", "ada@example.com", "password123").await;
    let cookie = session_cookie(&response);

    let response = get_with_cookie(&test.app, "/kyc", &cookie).await;
    let body = body_json(response).await;
    assert_eq!(body["kyc_status"], "none");
    assert_eq!(body["submitted"], false);

    let response = test
        .app
        .clone()
        .oneshot(multipart_kyc_request(&cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/kyc?submitted=true"
    );

    let response = get_with_cookie(&test.app, "/kyc?submitted=true", &cookie).await;
    let body = body_json(response).await;
    assert_eq!(body["kyc_status"], "pending");
    assert_eq!(body["submitted"], true);

    // Uploads land on disk under generated names; the record points at them.
    let raw = std::fs::read_to_string(test.dir.path().join("data.json")).unwrap();
    let data: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let user = &data["users"][0];
    assert_eq!(user["kycStatus"], "pending");
    let front = user["frontId"].as_str().unwrap();
    let back = user["backId"].as_str().unwrap();
    assert!(front.ends_with(".png"));
    assert!(test.dir.path().join("uploads").join(front).exists());
    assert!(test.dir.path().join("uploads").join(back).exists());

    // Re-submission is idempotent on the status.
    let response = test
        .app
        .clone()
        .oneshot(multipart_kyc_request(&cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let response = get_with_cookie(&test.app, "/kyc", &cookie).await;
    let body = body_json(response).await;
    assert_eq!(body["kyc_status"], "pending");
}

#[tokio::test]
async fn test_contact_relays_and_survives_mail_failure() {
    let mailer = Arc::new(RecordingMailer::default());
    let test = spawn_app(mailer.clone());

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/contact",
            serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "message": "How do I invest?"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);

    let sent = mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].subject.contains("Ada"));
    drop(sent);

    // A failing mail API must still produce a success-flagged body.
    let failing = spawn_app(Arc::new(FailingMailer));
    let response = failing
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/contact",
            serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "message": "How do I invest?"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);

    // So must an invalid submission.
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/contact",
            serde_json::json!({ "name": "Ada", "email": "not-an-email", "message": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_withdraw_rejects_and_never_mutates_balances() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));
    let response = register(&test.app, "Ada", "ada@example.com", "password123").await;
    let cookie = session_cookie(&response);

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/withdraw")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("investment period"));

    let response = get_with_cookie(&test.app, "/dashboard", &cookie).await;
    let body = body_json(response).await;
    assert_eq!(body["investment"], 0.0);
    assert_eq!(body["profit"], 0.0);

    let raw = std::fs::read_to_string(test.dir.path().join("data.json")).unwrap();
    let data: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(data["users"][0]["amount"], 0.0);
    assert_eq!(data["users"][0]["profit"], 0.0);
}

#[tokio::test]
async fn test_payment_pages() {
    let test = spawn_app(Arc::new(RecordingMailer::default()));

    // Tier pages are public.
    let response = test
        .app
        .clone()
        .oneshot(Request::builder().uri("/gold-payments").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["package"], "Gold");
    assert!(body["wallets"]["btc"].as_str().unwrap().starts_with("bc1q"));

    // The personal payments page needs a session.
    let response = test
        .app
        .clone()
        .oneshot(Request::builder().uri("/payments").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = register(&test.app, "Ada", "ada@example.com", "password123").await;
    let cookie = session_cookie(&response);
    let response = get_with_cookie(&test.app, "/payments", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["package"], "None");
    assert_eq!(body["amount"], 0.0);
}

#[tokio::test]
async fn test_rate_limit_window() {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.data_file = dir.path().join("data.json");
    settings.upload_dir = dir.path().join("uploads");
    settings.rate_limit.max_requests = 3;
    settings.rate_limit.window_secs = 60;

    let repo = JsonFileRepo::new(&settings.data_file).unwrap();
    let state = Arc::new(AppState::new(
        repo,
        Arc::new(RecordingMailer::default()),
        settings,
    ));
    let app = create_router(state);

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-real-ip", "10.0.0.1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-real-ip", "10.0.0.1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // A different client keeps its own window.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-real-ip", "10.0.0.2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rate_limit_evicts_lapsed_windows() {
    let dir = TempDir::new().unwrap();
    let mut settings = Settings::default();
    settings.data_file = dir.path().join("data.json");
    settings.upload_dir = dir.path().join("uploads");
    settings.rate_limit.max_requests = 3;
    // Zero-length windows lapse immediately.
    settings.rate_limit.window_secs = 0;

    let repo = JsonFileRepo::new(&settings.data_file).unwrap();
    let state = Arc::new(AppState::new(
        repo,
        Arc::new(RecordingMailer::default()),
        settings,
    ));
    let app = create_router(state.clone());

    for ip in ["10.0.0.1", "10.0.0.2", "10.0.0.3"] {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header("x-real-ip", ip)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Every earlier client's window lapsed before the last pass, so the
    // map holds only the entry for the request in flight.
    assert_eq!(state.rate_limits.len(), 1);
    assert!(state.rate_limits.contains_key("10.0.0.3"));
}
