//! Environment-driven configuration

use crate::state_machine::state::DEFAULT_TRIGGER_WORDS;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BASE_URL: &str = "https://app.chatwoot.com";
const DEFAULT_CONTACT_DOMAIN: &str = "example.com";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Connection settings for the Chatwoot application API
#[derive(Debug, Clone)]
pub struct HelpdeskConfig {
    pub base_url: String,
    pub account_id: String,
    pub api_key: String,
    pub inbox_id: u64,
    /// Domain of the pseudo-email each user's contact is keyed by
    pub contact_domain: String,
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct HandoffConfig {
    pub port: u16,
    /// Directory of static chat widget files served at `/`
    pub public_dir: Option<PathBuf>,
    /// Words that ask for a human, from comma-separated `HANDOFF_TRIGGER_WORDS`
    pub trigger_words: Vec<String>,
    pub helpdesk: HelpdeskConfig,
}

impl HandoffConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let inbox_raw = require("CHATWOOT_INBOX_ID")?;
        let inbox_id = inbox_raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid {
                name: "CHATWOOT_INBOX_ID",
                value: inbox_raw.clone(),
            })?;

        let helpdesk = HelpdeskConfig {
            base_url: get("CHATWOOT_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            account_id: require("CHATWOOT_ACCOUNT_ID")?.trim().to_string(),
            api_key: require("CHATWOOT_API_KEY")?.trim().to_string(),
            inbox_id,
            contact_domain: get("HANDOFF_CONTACT_DOMAIN")
                .unwrap_or_else(|| DEFAULT_CONTACT_DOMAIN.to_string()),
        };

        let trigger_words = match get("HANDOFF_TRIGGER_WORDS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_TRIGGER_WORDS.iter().map(|w| (*w).to_string()).collect(),
        };

        Ok(Self {
            port,
            public_dir: get("HANDOFF_PUBLIC_DIR").map(PathBuf::from),
            trigger_words,
            helpdesk,
        })
    }
}
