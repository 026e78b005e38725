//! Effects produced by state transitions

use super::state::{HandoffNotice, TimelineEntry};

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append an entry to the user's timeline
    Append(TimelineEntry),

    /// Append an entry and hand it back as the reply to the current request
    Respond(TimelineEntry),

    /// Store the transition's session, or delete it when there is none
    PersistSession,

    /// Ensure contact and conversation exist, then post the text to the helpdesk
    ForwardToAgent { text: String, notice: HandoffNotice },

    /// Ask the automated responder for a reply
    RequestAutoReply { text: String },
}

impl Effect {
    pub fn system(text: impl Into<String>) -> Self {
        Effect::Append(TimelineEntry::system(text))
    }

    pub fn forward(text: impl Into<String>, notice: HandoffNotice) -> Self {
        Effect::ForwardToAgent {
            text: text.into(),
            notice,
        }
    }

    /// The entry this effect adds to the timeline, if any
    #[cfg(test)]
    pub fn entry(&self) -> Option<&TimelineEntry> {
        match self {
            Effect::Append(entry) | Effect::Respond(entry) => Some(entry),
            _ => None,
        }
    }
}
