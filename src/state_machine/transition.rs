//! Pure state transition function

use super::state::{agent_joined, RETURNING_TO_ASSISTANT};
use super::{Effect, Event, HandoffContext, Session, TimelineEntry};
use crate::helpdesk::ListedMessage;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub session: Option<Session>,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(session: Option<Session>) -> Self {
        Self {
            session,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error)]
pub enum TransitionError {
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
///
/// Given the user's current session (if any) and an observed event, returns
/// the next session and the effects to run. No I/O happens here.
pub fn transition(
    session: Option<&Session>,
    context: &HandoffContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    let active = session.filter(|s| s.is_active());

    match (active, event) {
        // ============================================================
        // Routing
        // ============================================================

        // Open conversation: every message goes to the agent, unmatched
        (Some(_), Event::UserMessage { text }) => Ok(TransitionResult::new(session.cloned())
            .with_effect(Effect::forward(text, super::HandoffNotice::Forwarded))),

        (None, Event::UserMessage { text }) if context.triggers.matches(&text) => {
            Ok(TransitionResult::new(session.cloned())
                .with_effect(Effect::forward(text, super::HandoffNotice::Connecting)))
        }

        (None, Event::UserMessage { text }) => Ok(TransitionResult::new(session.cloned())
            .with_effect(Effect::RequestAutoReply { text })),

        // ============================================================
        // Effect completions
        // ============================================================
        (_, Event::Forwarded { session: forwarded, notice }) => {
            if !forwarded.is_active() {
                return Err(TransitionError::InvalidTransition(
                    "forwarded without a conversation".to_string(),
                ));
            }
            Ok(TransitionResult::new(Some(forwarded))
                .with_effect(Effect::PersistSession)
                .with_effect(Effect::Respond(TimelineEntry::system(notice.text()))))
        }

        (_, Event::AutoReplied { text }) => Ok(TransitionResult::new(session.cloned())
            .with_effect(Effect::Respond(TimelineEntry::assistant(text)))),

        // ============================================================
        // Reconciliation
        // ============================================================
        (Some(_), Event::StatusObserved { status }) if status.is_resolved() => {
            Ok(TransitionResult::new(None)
                .with_effect(Effect::system(RETURNING_TO_ASSISTANT))
                .with_effect(Effect::PersistSession))
        }

        (Some(current), Event::AgentMessagesListed { messages }) => {
            Ok(merge_agent_messages(current, &messages))
        }

        // Nothing to reconcile without an open conversation, and open/other
        // statuses change nothing
        (_, Event::StatusObserved { .. } | Event::AgentMessagesListed { .. }) => {
            Ok(TransitionResult::new(session.cloned()))
        }
    }
}

/// Append unseen agent messages in id order, announcing each new agent name
/// before that agent's first message.
fn merge_agent_messages(current: &Session, messages: &[ListedMessage]) -> TransitionResult {
    let mut fresh: Vec<&ListedMessage> = messages
        .iter()
        .filter(|m| m.sender_role.is_agent() && current.is_unseen(m.id))
        .collect();
    fresh.sort_by_key(|m| m.id);
    fresh.dedup_by_key(|m| m.id);

    let Some(last) = fresh.last() else {
        return TransitionResult::new(Some(current.clone()));
    };

    let mut next = current.clone();
    next.last_agent_marker = Some(last.id);

    let mut effects = Vec::with_capacity(fresh.len() + 1);
    for message in &fresh {
        if let Some(name) = message.sender_name.as_deref() {
            if next.last_announced_agent_name.as_deref() != Some(name) {
                effects.push(Effect::system(agent_joined(name)));
                next.last_announced_agent_name = Some(name.to_string());
            }
        }
        effects.push(Effect::Append(TimelineEntry::agent(message.content.clone())));
    }
    effects.push(Effect::PersistSession);

    TransitionResult::new(Some(next)).with_effects(effects)
}
