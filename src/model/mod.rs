pub mod history;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;

use types::{
    ApiErrorBody, Content, ContentRole, GenerateContentRequest, GenerateContentResponse, PartRef,
    SystemInstruction,
};

/// Knowledge base the assistant is restricted to.
pub const SITE_CONTEXT: &str = include_str!("site_context.txt");

/// A stateless chat-completion capability.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Answers `latest` given the system instruction and prior history.
    /// History must be empty or open on a user turn.
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[Content],
        latest: &str,
    ) -> Result<String>;
}

// A wrapper for the Gemini generateContent API
pub struct GeminiModel {
    base_url: String,
    model: String,
    api_key: String,
    client: Client,
}

impl GeminiModel {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let base_url = base_url.into();
        let model = model.into();
        info!("Using Gemini model {} at {}", model, base_url);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key: api_key.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatCompletion for GeminiModel {
    async fn complete(
        &self,
        system_instruction: &str,
        history: &[Content],
        latest: &str,
    ) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let payload = build_request(system_instruction, history, latest);

        info!("Sending completion request with {} history turns", history.len());
        debug!("Latest message: {}", latest);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!(provider_message(status.as_u16(), &error_text)));
        }

        let body: GenerateContentResponse = response.json().await?;
        let reply = extract_reply(body)?;

        info!("Response length: {} characters", reply.len());
        Ok(reply)
    }
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

fn build_request<'a>(
    system_instruction: &'a str,
    history: &[Content],
    latest: &str,
) -> GenerateContentRequest<'a> {
    let mut contents = history.to_vec();
    contents.push(Content::text(ContentRole::User, latest));

    GenerateContentRequest {
        system_instruction: SystemInstruction {
            parts: vec![PartRef { text: system_instruction }],
        },
        contents,
    }
}

/// Concatenates the first candidate's text parts. A response without
/// candidates is an empty reply; a blocked prompt is an error.
fn extract_reply(body: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(anyhow::anyhow!("Response was blocked due to {}", reason));
    }

    Ok(body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect::<String>())
        .unwrap_or_default())
}

fn provider_message(status: u16, error_text: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(error_text) {
        Ok(body) => body.error.message,
        Err(_) if error_text.trim().is_empty() => format!("API request failed ({})", status),
        Err(_) => error_text.to_string(),
    }
}
