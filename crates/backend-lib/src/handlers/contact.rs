// ============================
// crates/backend-lib/src/handlers/contact.rs
// ============================
//! Contact-form relay.
use std::sync::Arc;

use axum::{extract::State, Json};
use bittrust_common::ApiMessage;
use metrics::counter;
use serde::Deserialize;

use crate::mailer::OutboundEmail;
use crate::metrics::CONTACT_RELAYED;
use crate::repo::AccountRepository;
use crate::validation;
use crate::AppState;

#[derive(Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Shell for the contact form
pub async fn contact_form() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "title": "Contact" }))
}

/// Relay a contact-form submission to the configured inbox.
///
/// Always answers 200 with a `{success, message}` body; neither validation
/// nor mail-dispatch failures may surface as an error response.
pub async fn contact_submit<R: AccountRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(body): Json<ContactRequest>,
) -> Json<ApiMessage> {
    if let Err(e) = validation::validate_name(&body.name)
        .and(validation::validate_email(&body.email))
        .and(validation::validate_message(&body.message))
    {
        return Json(ApiMessage::failure(e.to_string()));
    }

    let mail = OutboundEmail {
        to_email: state.settings.mail.contact_inbox.clone(),
        subject: format!("New Contact Form Submission from {}", body.name),
        html_body: format!(
            "<h3>New Message from {name}</h3>\
             <p><strong>Email:</strong> {email}</p>\
             <p><strong>Message:</strong></p>\
             <p>{message}</p>",
            name = body.name,
            email = body.email,
            message = body.message,
        ),
    };

    match state.mailer.send(&mail).await {
        Ok(()) => {
            counter!(CONTACT_RELAYED).increment(1);
            tracing::info!(from = %body.email, "contact form relayed");
            Json(ApiMessage::ok("Thank you for contacting us! We’ll reply soon."))
        },
        Err(e) => {
            tracing::warn!(error = %e, "contact form relay failed");
            Json(ApiMessage::failure("Something went wrong. Try again later."))
        },
    }
}
