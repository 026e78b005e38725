//! Provider-neutral helpdesk types consumed by the handoff state machine

use serde::{Deserialize, Serialize};

/// Identifier of a helpdesk message. Ordered; later messages have larger ids.
pub type AgentMessageId = u64;

/// Remote status of a helpdesk conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Open,
    Resolved,
    /// Pending, snoozed, or anything the helpdesk adds later
    Other(String),
}

impl ConversationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Self::Open,
            "resolved" => Self::Resolved,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
            Self::Other(raw) => raw,
        }
    }
}

/// Who authored a message in a helpdesk conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    /// A human operator of the helpdesk (Chatwoot sender type `user`)
    Agent,
    /// The end user's contact record
    Contact,
    Other(String),
}

impl SenderRole {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "user" => Self::Agent,
            "contact" => Self::Contact,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Self::Agent)
    }
}

/// A message as returned by the conversation listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedMessage {
    pub id: AgentMessageId,
    pub sender_role: SenderRole,
    /// Display name of the sender, when the helpdesk supplied one
    pub sender_name: Option<String>,
    pub content: String,
}

#[cfg(test)]
impl ListedMessage {
    pub fn agent(id: AgentMessageId, name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            sender_role: SenderRole::Agent,
            sender_name: Some(name.into()),
            content: content.into(),
        }
    }

    pub fn contact(id: AgentMessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            sender_role: SenderRole::Contact,
            sender_name: None,
            content: content.into(),
        }
    }
}
