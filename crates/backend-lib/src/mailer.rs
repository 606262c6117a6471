// ============================
// crates/backend-lib/src/mailer.rs
// ============================
//! Transactional email dispatch via the Brevo HTTP API.
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use serde::Serialize;

use crate::config::MailSettings;
use crate::error::AppError;

/// A single outbound message
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub to_email: String,
    pub subject: String,
    pub html_body: String,
}

/// Trait for transactional mail backends
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Dispatch one message; a fire-and-await call with no retry
    async fn send(&self, mail: &OutboundEmail) -> Result<(), AppError>;
}

#[derive(Serialize)]
struct BrevoParty<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
}

/// Wire shape of `POST /v3/smtp/email`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoRequest<'a> {
    sender: BrevoParty<'a>,
    to: Vec<BrevoParty<'a>>,
    subject: &'a str,
    html_content: &'a str,
}

/// Brevo transactional-email client
pub struct BrevoMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl BrevoMailer {
    /// Build a client from mail settings; requires an API key.
    pub fn new(settings: &MailSettings) -> anyhow::Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| anyhow::anyhow!("mail API key not configured"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            api_key,
            from_email: settings.from_email.clone(),
            from_name: settings.from_name.clone(),
        })
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, mail: &OutboundEmail) -> Result<(), AppError> {
        let body = BrevoRequest {
            sender: BrevoParty {
                name: Some(&self.from_name),
                email: &self.from_email,
            },
            to: vec![BrevoParty {
                name: None,
                email: &mail.to_email,
            }],
            subject: &mail.subject,
            html_content: &mail.html_body,
        };

        let response = self
            .client
            .post(format!("{}/v3/smtp/email", self.api_url))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Mail(e.to_string()))?;

        if !response.status().is_success() {
            counter!("mail.failed").increment(1);
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::Mail(format!("{status}: {detail}")));
        }

        counter!("mail.sent").increment(1);
        Ok(())
    }
}

/// Log-only mailer used when no API key is configured.
///
/// Reports success so the contact form stays usable in development,
/// mirroring the unconfigured-transporter behavior of the original service.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, mail: &OutboundEmail) -> Result<(), AppError> {
        tracing::info!(
            to = %mail.to_email,
            subject = %mail.subject,
            "mail dispatch skipped (no API key configured)"
        );
        Ok(())
    }
}
