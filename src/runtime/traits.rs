//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the controller with mock implementations.

use crate::helpdesk::{ChatwootClient, ConversationStatus, HelpdeskError, ListedMessage};
use crate::responder::EchoResponder;
use async_trait::async_trait;
use std::sync::Arc;

/// Client for the external helpdesk channel
#[async_trait]
pub trait HelpdeskClient: Send + Sync {
    /// Look up the user's contact by its derived key, creating it on a miss.
    /// Lookup failures count as a miss; creation failures are errors.
    async fn find_or_create_contact(&self, user_id: &str) -> Result<String, HelpdeskError>;

    /// Open a conversation for the contact and return its reference
    async fn create_conversation(&self, contact_ref: &str) -> Result<String, HelpdeskError>;

    /// Post the user's text into the conversation
    async fn post_message(&self, conversation_ref: &str, text: &str) -> Result<(), HelpdeskError>;

    /// All messages of the conversation, in no particular order
    async fn list_messages(
        &self,
        conversation_ref: &str,
    ) -> Result<Vec<ListedMessage>, HelpdeskError>;

    async fn conversation_status(
        &self,
        conversation_ref: &str,
    ) -> Result<ConversationStatus, HelpdeskError>;
}

/// Automated responder consulted while no human is engaged
#[async_trait]
pub trait Responder: Send + Sync {
    async fn reply(&self, text: &str) -> String;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: HelpdeskClient + ?Sized> HelpdeskClient for Arc<T> {
    async fn find_or_create_contact(&self, user_id: &str) -> Result<String, HelpdeskError> {
        (**self).find_or_create_contact(user_id).await
    }

    async fn create_conversation(&self, contact_ref: &str) -> Result<String, HelpdeskError> {
        (**self).create_conversation(contact_ref).await
    }

    async fn post_message(&self, conversation_ref: &str, text: &str) -> Result<(), HelpdeskError> {
        (**self).post_message(conversation_ref, text).await
    }

    async fn list_messages(
        &self,
        conversation_ref: &str,
    ) -> Result<Vec<ListedMessage>, HelpdeskError> {
        (**self).list_messages(conversation_ref).await
    }

    async fn conversation_status(
        &self,
        conversation_ref: &str,
    ) -> Result<ConversationStatus, HelpdeskError> {
        (**self).conversation_status(conversation_ref).await
    }
}

#[async_trait]
impl<T: Responder + ?Sized> Responder for Arc<T> {
    async fn reply(&self, text: &str) -> String {
        (**self).reply(text).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

#[async_trait]
impl HelpdeskClient for ChatwootClient {
    async fn find_or_create_contact(&self, user_id: &str) -> Result<String, HelpdeskError> {
        ChatwootClient::find_or_create_contact(self, user_id).await
    }

    async fn create_conversation(&self, contact_ref: &str) -> Result<String, HelpdeskError> {
        ChatwootClient::create_conversation(self, contact_ref).await
    }

    async fn post_message(&self, conversation_ref: &str, text: &str) -> Result<(), HelpdeskError> {
        ChatwootClient::post_message(self, conversation_ref, text).await
    }

    async fn list_messages(
        &self,
        conversation_ref: &str,
    ) -> Result<Vec<ListedMessage>, HelpdeskError> {
        ChatwootClient::list_messages(self, conversation_ref).await
    }

    async fn conversation_status(
        &self,
        conversation_ref: &str,
    ) -> Result<ConversationStatus, HelpdeskError> {
        ChatwootClient::conversation_status(self, conversation_ref).await
    }
}

#[async_trait]
impl Responder for EchoResponder {
    async fn reply(&self, text: &str) -> String {
        EchoResponder::render(text)
    }
}
