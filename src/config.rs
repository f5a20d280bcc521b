use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::model::SITE_CONTEXT;

const DEFAULT_FROM_EMAIL: &str = "Graphic Define Contact <onboarding@resend.dev>";
const DEFAULT_TO_EMAIL: &str = "riley@graphicdefine.com";

// Process-wide settings, read once at startup and shared with every handler
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub system_instruction: String,
    pub resend_api_key: Option<String>,
    pub resend_base_url: String,
    pub from_email: String,
    pub to_email: String,
    pub send_confirmation: bool,
    pub upstream_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Blank values are
    /// treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match get("PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("invalid PORT: {}", v))?,
            None => 8080,
        };

        let upstream_timeout = match get("UPSTREAM_TIMEOUT_SECS") {
            Some(v) => v
                .parse::<u64>()
                .with_context(|| format!("invalid UPSTREAM_TIMEOUT_SECS: {}", v))?,
            None => 30,
        };

        let send_confirmation = match get("CONTACT_SEND_CONFIRMATION") {
            Some(v) => parse_flag(&v)
                .with_context(|| format!("invalid CONTACT_SEND_CONFIRMATION: {}", v))?,
            None => true,
        };

        let system_instruction = match get("KNOWLEDGE_BASE_PATH") {
            Some(path) => std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read knowledge base from {}", path))?,
            None => SITE_CONTEXT.to_string(),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            static_dir: PathBuf::from(get("STATIC_DIR").unwrap_or_else(|| "./dist".to_string())),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            gemini_base_url: get("GEMINI_BASE_URL").unwrap_or_else(|| {
                "https://generativelanguage.googleapis.com/v1beta".to_string()
            }),
            system_instruction,
            resend_api_key: get("RESEND_API_KEY"),
            resend_base_url: get("RESEND_BASE_URL")
                .unwrap_or_else(|| "https://api.resend.com".to_string()),
            from_email: get("CONTACT_FROM_EMAIL").unwrap_or_else(|| DEFAULT_FROM_EMAIL.to_string()),
            to_email: get("CONTACT_TO_EMAIL").unwrap_or_else(|| DEFAULT_TO_EMAIL.to_string()),
            send_confirmation,
            upstream_timeout: Duration::from_secs(upstream_timeout),
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!("expected a boolean")),
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("static_dir", &self.static_dir)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("gemini_model", &self.gemini_model)
            .field("gemini_base_url", &self.gemini_base_url)
            .field("resend_api_key", &redact(&self.resend_api_key))
            .field("resend_base_url", &self.resend_base_url)
            .field("from_email", &self.from_email)
            .field("to_email", &self.to_email)
            .field("send_confirmation", &self.send_confirmation)
            .field("upstream_timeout", &self.upstream_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert!(config.gemini_api_key.is_none());
        assert!(config.resend_api_key.is_none());
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.from_email, DEFAULT_FROM_EMAIL);
        assert_eq!(config.to_email, "riley@graphicdefine.com");
        assert!(config.send_confirmation);
        assert_eq!(config.upstream_timeout, Duration::from_secs(30));
        assert_eq!(config.system_instruction, SITE_CONTEXT);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("GEMINI_API_KEY", "   "), ("CONTACT_FROM_EMAIL", "")]).unwrap();
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.from_email, DEFAULT_FROM_EMAIL);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = load(&[
            ("PORT", "3000"),
            ("GEMINI_API_KEY", "g-key"),
            ("RESEND_API_KEY", "r-key"),
            ("CONTACT_SEND_CONFIRMATION", "off"),
            ("UPSTREAM_TIMEOUT_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.gemini_api_key.as_deref(), Some("g-key"));
        assert_eq!(config.resend_api_key.as_deref(), Some("r-key"));
        assert!(!config.send_confirmation);
        assert_eq!(config.upstream_timeout, Duration::from_secs(5));
    }

    #[test]
    fn malformed_numbers_fail_startup() {
        assert!(load(&[("PORT", "eighty")]).is_err());
        assert!(load(&[("UPSTREAM_TIMEOUT_SECS", "-1")]).is_err());
        assert!(load(&[("CONTACT_SEND_CONFIRMATION", "maybe")]).is_err());
    }

    #[test]
    fn debug_output_hides_credentials() {
        let config = load(&[("GEMINI_API_KEY", "secret-gemini"), ("RESEND_API_KEY", "secret-resend")])
            .unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-gemini"));
        assert!(!rendered.contains("secret-resend"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
