//! Handoff controller
//!
//! Drives the pure state machine for each user: feeds it the inbound message
//! and whatever the helpdesk reports, then executes the returned effects.
//!
//! Calls that create or advance a session (contact, conversation, posting)
//! fail the request. Calls that only observe the helpdesk (status, listing)
//! are best-effort: failures are logged and treated as "nothing new".

use super::traits::{HelpdeskClient, Responder};
use crate::helpdesk::HelpdeskError;
use crate::state_machine::{
    transition, Effect, Event, HandoffContext, Session, TimelineEntry, TransitionError,
};
use crate::store::{SessionRegistry, TimelineStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("User identifier must not be empty")]
    InvalidUser,
    #[error("Helpdesk channel unavailable: {0}")]
    ChannelUnavailable(#[source] HelpdeskError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("Message produced no response")]
    NoResponse,
}

/// Process-wide counters exposed on the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerStats {
    pub users: usize,
    pub sessions: usize,
}

/// Owner of all per-user handoff state
pub struct HandoffController<H, R>
where
    H: HelpdeskClient,
    R: Responder,
{
    context: HandoffContext,
    helpdesk: H,
    responder: R,
    sessions: SessionRegistry,
    timelines: TimelineStore,
    /// One lock per user; held for the whole read-modify-write of a request
    user_locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl<H, R> HandoffController<H, R>
where
    H: HelpdeskClient,
    R: Responder,
{
    pub fn new(context: HandoffContext, helpdesk: H, responder: R) -> Self {
        Self {
            context,
            helpdesk,
            responder,
            sessions: SessionRegistry::new(),
            timelines: TimelineStore::new(),
            user_locks: RwLock::new(HashMap::new()),
        }
    }

    /// Handle one inbound user message and return the entry answering it
    pub async fn post_user_message(
        &self,
        user_id: &str,
        text: &str,
    ) -> Result<TimelineEntry, HandoffError> {
        validate_user(user_id)?;
        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        self.timelines.append(user_id, TimelineEntry::user(text));

        // A conversation resolved since the last poll must not swallow this message
        self.refresh_status(user_id).await?;

        let response = self
            .dispatch(
                user_id,
                Event::UserMessage {
                    text: text.to_string(),
                },
            )
            .await?;
        response.ok_or(HandoffError::NoResponse)
    }

    /// Reconcile with the helpdesk, then return the user's full timeline
    pub async fn timeline(&self, user_id: &str) -> Result<Vec<TimelineEntry>, HandoffError> {
        validate_user(user_id)?;

        // Unknown users have nothing to reconcile; reads alone never allocate a lock
        if !self.timelines.contains(user_id) && self.sessions.get(user_id).is_none() {
            return Ok(Vec::new());
        }

        let lock = self.user_lock(user_id).await;
        let _guard = lock.lock().await;

        self.reconcile(user_id).await?;
        Ok(self.timelines.snapshot(user_id))
    }

    pub fn stats(&self) -> ControllerStats {
        ControllerStats {
            users: self.timelines.user_count(),
            sessions: self.sessions.len(),
        }
    }

    #[cfg(test)]
    pub fn session(&self, user_id: &str) -> Option<Session> {
        self.sessions.get(user_id)
    }

    #[cfg(test)]
    async fn lock_count(&self) -> usize {
        self.user_locks.read().await.len()
    }

    async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        {
            let locks = self.user_locks.read().await;
            if let Some(lock) = locks.get(user_id) {
                return Arc::clone(lock);
            }
        }

        Arc::clone(
            self.user_locks
                .write()
                .await
                .entry(user_id.to_string())
                .or_default(),
        )
    }

    fn active_conversation(&self, user_id: &str) -> Option<String> {
        self.sessions.get(user_id).and_then(|s| s.conversation_ref)
    }

    /// Merge new agent messages, then pick up a status change
    async fn reconcile(&self, user_id: &str) -> Result<(), HandoffError> {
        let Some(conversation_ref) = self.active_conversation(user_id) else {
            return Ok(());
        };

        match self.helpdesk.list_messages(&conversation_ref).await {
            Ok(messages) => {
                tracing::debug!(
                    user_id,
                    conversation_ref = %conversation_ref,
                    listed = messages.len(),
                    "Listed conversation messages"
                );
                self.dispatch(user_id, Event::AgentMessagesListed { messages })
                    .await?;
            }
            Err(e) => {
                tracing::warn!(
                    user_id,
                    conversation_ref = %conversation_ref,
                    kind = e.kind.as_str(),
                    error = %e,
                    "Message listing failed, keeping local timeline"
                );
            }
        }

        self.refresh_status(user_id).await
    }

    async fn refresh_status(&self, user_id: &str) -> Result<(), HandoffError> {
        let Some(conversation_ref) = self.active_conversation(user_id) else {
            return Ok(());
        };

        match self.helpdesk.conversation_status(&conversation_ref).await {
            Ok(status) => {
                tracing::debug!(
                    user_id,
                    conversation_ref = %conversation_ref,
                    status = status.as_str(),
                    "Observed conversation status"
                );
                self.dispatch(user_id, Event::StatusObserved { status })
                    .await?;
            }
            Err(e) => {
                tracing::warn!(
                    user_id,
                    conversation_ref = %conversation_ref,
                    kind = e.kind.as_str(),
                    error = %e,
                    "Status check failed, treating status as unknown"
                );
            }
        }
        Ok(())
    }

    /// Run an event through the state machine, executing effects until no
    /// follow-up events remain. Returns the entry marked as the response.
    async fn dispatch(
        &self,
        user_id: &str,
        event: Event,
    ) -> Result<Option<TimelineEntry>, HandoffError> {
        let mut pending = vec![event];
        let mut response = None;

        while let Some(current) = pending.pop() {
            let session = self.sessions.get(user_id);
            let result = transition(session.as_ref(), &self.context, current)?;

            for effect in result.effects {
                match effect {
                    Effect::Append(entry) => self.timelines.append(user_id, entry),
                    Effect::Respond(entry) => {
                        self.timelines.append(user_id, entry.clone());
                        response = Some(entry);
                    }
                    Effect::PersistSession => {
                        self.persist_session(user_id, result.session.clone());
                    }
                    Effect::ForwardToAgent { text, notice } => {
                        let session = self.forward(user_id, &text).await?;
                        pending.push(Event::Forwarded { session, notice });
                    }
                    Effect::RequestAutoReply { text } => {
                        let reply = self.responder.reply(&text).await;
                        pending.push(Event::AutoReplied { text: reply });
                    }
                }
            }
        }

        Ok(response)
    }

    fn persist_session(&self, user_id: &str, session: Option<Session>) {
        match session {
            Some(session) => self.sessions.put(user_id, session),
            None => {
                if let Some(removed) = self.sessions.remove(user_id) {
                    tracing::info!(
                        user_id,
                        contact_ref = %removed.contact_ref,
                        conversation_ref = ?removed.conversation_ref,
                        "Conversation resolved, returning user to automated mode"
                    );
                }
            }
        }
    }

    async fn forward(&self, user_id: &str, text: &str) -> Result<Session, HandoffError> {
        let session = self.ensure_session(user_id).await?;
        let Some(conversation_ref) = session.conversation_ref.as_deref() else {
            return Err(HandoffError::ChannelUnavailable(
                HelpdeskError::invalid_response("Session has no conversation"),
            ));
        };

        self.helpdesk
            .post_message(conversation_ref, text)
            .await
            .map_err(unavailable(user_id, "post_message"))?;

        tracing::debug!(user_id, conversation_ref, "Forwarded message to helpdesk");
        Ok(session)
    }

    /// Make sure the user has a contact and an open conversation, creating
    /// whichever is missing. Progress is stored as soon as it is made so a
    /// later retry reuses it.
    async fn ensure_session(&self, user_id: &str) -> Result<Session, HandoffError> {
        let session = if let Some(existing) = self.sessions.get(user_id) {
            existing
        } else {
            let contact_ref = self
                .helpdesk
                .find_or_create_contact(user_id)
                .await
                .map_err(unavailable(user_id, "find_or_create_contact"))?;
            let session = Session::new(contact_ref);
            self.sessions.put(user_id, session.clone());
            session
        };

        if session.is_active() {
            return Ok(session);
        }

        let conversation_ref = self
            .helpdesk
            .create_conversation(&session.contact_ref)
            .await
            .map_err(unavailable(user_id, "create_conversation"))?;

        if conversation_ref.trim().is_empty() {
            return Err(unavailable(user_id, "create_conversation")(
                HelpdeskError::invalid_response("Empty conversation reference"),
            ));
        }

        tracing::info!(
            user_id,
            contact_ref = %session.contact_ref,
            conversation_ref = %conversation_ref,
            "Opened helpdesk conversation"
        );

        let session = session.with_conversation(conversation_ref);
        self.sessions.put(user_id, session.clone());
        Ok(session)
    }
}

fn validate_user(user_id: &str) -> Result<(), HandoffError> {
    if user_id.trim().is_empty() {
        Err(HandoffError::InvalidUser)
    } else {
        Ok(())
    }
}

fn unavailable<'a>(
    user_id: &'a str,
    operation: &'static str,
) -> impl FnOnce(HelpdeskError) -> HandoffError + 'a {
    move |e| {
        tracing::error!(
            user_id,
            operation,
            kind = e.kind.as_str(),
            error = %e,
            "Helpdesk call failed"
        );
        HandoffError::ChannelUnavailable(e)
    }
}
