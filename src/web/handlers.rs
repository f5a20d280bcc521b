use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::error::ApiError;
use crate::mail::Mailer;
use crate::model::history;
use crate::web::models::{ChatRequest, ChatResponse, ContactResponse, ContactSubmission, Inquiry};
use crate::AppState;

// Health check endpoint
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// CORS preflight
pub async fn preflight() -> impl Responder {
    HttpResponse::Ok().json(json!({}))
}

pub async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

// Chat API endpoint
pub async fn chat(
    data: web::Data<AppState>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let conversation = history::adapt(&req.messages)?;

    let model = data
        .model
        .as_ref()
        .ok_or_else(|| ApiError::ServerConfiguration("GEMINI_API_KEY is not set".to_string()))?;

    info!(
        "[{}] Chat request: {} messages, {} replayed as history",
        request_id,
        req.messages.len(),
        conversation.history.len()
    );

    let reply = bounded(
        data.config.upstream_timeout,
        model.complete(
            &data.config.system_instruction,
            &conversation.history,
            conversation.latest,
        ),
    )
    .await
    .map_err(|e| {
        error!("[{}] Gemini API error: {}", request_id, e);
        ApiError::Upstream(e.to_string())
    })?;

    Ok(HttpResponse::Ok().json(ChatResponse { reply }))
}

// Contact form endpoint
pub async fn contact(
    data: web::Data<AppState>,
    req: web::Json<ContactSubmission>,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let inquiry = req.into_inner().validate()?;

    let mailer = data
        .mailer
        .as_ref()
        .ok_or_else(|| ApiError::ServerConfiguration("RESEND_API_KEY is not set".to_string()))?;
    let config = &data.config;

    let notification = data
        .templates
        .inquiry_email(&inquiry, &config.from_email, &config.to_email)
        .map_err(|e| ApiError::ServerConfiguration(format!("inquiry template failed: {}", e)))?;

    bounded(config.upstream_timeout, mailer.send(&notification))
        .await
        .map_err(|e| {
            error!("[{}] Failed to deliver inquiry: {}", request_id, e);
            ApiError::Upstream(e.to_string())
        })?;

    info!("[{}] Inquiry delivered to {}", request_id, config.to_email);

    if config.send_confirmation {
        // The inquiry is already delivered; a failed receipt must not fail the request
        if let Err(e) = send_confirmation(&data, mailer.as_ref(), &inquiry).await {
            warn!("[{}] Confirmation email not sent: {}", request_id, e);
        }
    }

    Ok(HttpResponse::Ok().json(ContactResponse { ok: true }))
}

async fn send_confirmation(
    data: &AppState,
    mailer: &dyn Mailer,
    inquiry: &Inquiry,
) -> anyhow::Result<()> {
    let config = &data.config;
    let receipt = data
        .templates
        .confirmation_email(inquiry, &config.from_email, &config.to_email)?;
    bounded(config.upstream_timeout, mailer.send(&receipt)).await
}

async fn bounded<T, F>(limit: Duration, call: F) -> anyhow::Result<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!("upstream request timed out after {:?}", limit)),
    }
}
