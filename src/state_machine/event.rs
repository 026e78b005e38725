//! Events observed by the handoff controller

use super::state::{HandoffNotice, Session};
use crate::helpdesk::{ConversationStatus, ListedMessage};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    UserMessage {
        text: String,
    },

    // Helpdesk observations
    StatusObserved {
        status: ConversationStatus,
    },
    AgentMessagesListed {
        messages: Vec<ListedMessage>,
    },

    // Effect completions
    /// The message reached the helpdesk through `session`'s conversation
    Forwarded {
        session: Session,
        notice: HandoffNotice,
    },
    AutoReplied {
        text: String,
    },
}
