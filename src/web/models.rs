use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const MESSAGES_REQUIRED: &str = "messages array is required";
pub const CONTACT_FIELDS_REQUIRED: &str = "Name, email, and project details are required";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "bot", alias = "assistant")]
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Raw contact form payload. Blank strings and `null` both count as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub business: Option<String>,
    pub email: Option<String>,
    pub project_type: Option<String>,
    pub budget: Option<String>,
    #[serde(alias = "existingSiteUrl")]
    pub existing_site: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub ok: bool,
}

/// A contact submission whose required fields are present, with every value
/// trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inquiry {
    pub name: String,
    pub email: String,
    pub details: String,
    pub business: Option<String>,
    pub project_type: Option<String>,
    pub budget: Option<String>,
    pub existing_site: Option<String>,
}

impl ContactSubmission {
    pub fn validate(self) -> Result<Inquiry, ApiError> {
        let (name, email, details) = match (
            present(self.name),
            present(self.email),
            present(self.details),
        ) {
            (Some(name), Some(email), Some(details)) => (name, email, details),
            _ => return Err(ApiError::InvalidPayload(CONTACT_FIELDS_REQUIRED.to_string())),
        };

        Ok(Inquiry {
            name,
            email,
            details,
            business: present(self.business),
            project_type: present(self.project_type),
            budget: present(self.budget),
            existing_site: present(self.existing_site),
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
