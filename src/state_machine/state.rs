//! Handoff state types

use crate::helpdesk::AgentMessageId;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Timeline
// ============================================================================

/// Who a timeline entry is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    User,
    Assistant,
    Agent,
    System,
}

/// One immutable line of a user's chat timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    #[serde(rename = "from")]
    pub origin: Origin,
    pub text: String,
}

impl TimelineEntry {
    pub fn new(origin: Origin, text: impl Into<String>) -> Self {
        Self {
            origin,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Origin::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Origin::Assistant, text)
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self::new(Origin::Agent, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Origin::System, text)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Per-user link to the helpdesk.
///
/// Existence of a session does not imply a human is engaged: only a session
/// with a `conversation_ref` is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub contact_ref: String,
    pub conversation_ref: Option<String>,
    /// Highest agent message id already merged into the timeline
    pub last_agent_marker: Option<AgentMessageId>,
    pub last_announced_agent_name: Option<String>,
}

impl Session {
    pub fn new(contact_ref: impl Into<String>) -> Self {
        Self {
            contact_ref: contact_ref.into(),
            conversation_ref: None,
            last_agent_marker: None,
            last_announced_agent_name: None,
        }
    }

    /// Attach a freshly created conversation, resetting per-conversation memory
    #[must_use]
    pub fn with_conversation(mut self, conversation_ref: impl Into<String>) -> Self {
        self.conversation_ref = Some(conversation_ref.into());
        self.last_agent_marker = None;
        self
    }

    pub fn is_active(&self) -> bool {
        self.conversation_ref.is_some()
    }

    /// Whether an agent message with `id` has not been merged yet
    pub fn is_unseen(&self, id: AgentMessageId) -> bool {
        self.last_agent_marker.map_or(true, |marker| id > marker)
    }
}

// ============================================================================
// Notices
// ============================================================================

pub const RETURNING_TO_ASSISTANT: &str =
    "The conversation has been resolved. You are now chatting with the automated assistant again.";

pub fn agent_joined(name: &str) -> String {
    format!("Agent {name} has joined the conversation.")
}

/// System notice answering a message that went to the helpdesk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffNotice {
    /// First message of a handoff
    Connecting,
    /// Any later message while the conversation is open
    Forwarded,
}

impl HandoffNotice {
    pub fn text(self) -> &'static str {
        match self {
            HandoffNotice::Connecting => "Connecting you to a human agent...",
            HandoffNotice::Forwarded => "Sent to human agent.",
        }
    }
}

// ============================================================================
// Context
// ============================================================================

pub const DEFAULT_TRIGGER_WORDS: [&str; 4] = ["human", "agent", "representative", "operator"];

/// Words whose presence asks for a human, matched case-insensitively anywhere
/// in the text
#[derive(Debug, Clone)]
pub struct TriggerVocabulary {
    pattern: Option<Regex>,
}

impl TriggerVocabulary {
    pub fn new<I, S>(words: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .map(|w| regex::escape(&w))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self { pattern: None });
        }

        let pattern = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))?;
        Ok(Self {
            pattern: Some(pattern),
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }
}

impl Default for TriggerVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_TRIGGER_WORDS).expect("escaped trigger words always compile")
    }
}

/// Immutable configuration shared by every transition
#[derive(Debug, Clone, Default)]
pub struct HandoffContext {
    pub triggers: TriggerVocabulary,
}

impl HandoffContext {
    pub fn new(triggers: TriggerVocabulary) -> Self {
        Self { triggers }
    }
}
