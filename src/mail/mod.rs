pub mod templates;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub use templates::Templates;

/// A single plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub reply_to: Option<String>,
}

/// A transactional email capability.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResendErrorBody {
    message: String,
}

// Client for the Resend email API
pub struct ResendMailer {
    base_url: String,
    api_key: String,
    client: Client,
}

impl ResendMailer {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<()> {
        let url = format!("{}/emails", self.base_url);
        let payload = SendEmailRequest {
            from: &email.from,
            to: [email.to.as_str()],
            subject: &email.subject,
            text: &email.text,
            reply_to: email.reply_to.as_deref(),
        };
        debug!("Sending email \"{}\" to {}", email.subject, email.to);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            let message = match serde_json::from_str::<ResendErrorBody>(&error_text) {
                Ok(body) => body.message,
                Err(_) if error_text.trim().is_empty() => format!("Failed to send ({})", status),
                Err(_) => error_text,
            };
            return Err(anyhow::anyhow!(message));
        }

        // Delivery is settled by the status code; the id is only logged
        let id = response
            .json::<SendEmailResponse>()
            .await
            .ok()
            .and_then(|sent| sent.id);
        info!("Email accepted by Resend (id: {})", id.as_deref().unwrap_or("unknown"));
        Ok(())
    }
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
