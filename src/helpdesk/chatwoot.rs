//! Chatwoot application API client

use super::types::{ConversationStatus, ListedMessage, SenderRole};
use super::HelpdeskError;
use crate::config::HelpdeskConfig;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Chatwoot client bound to one account and inbox
pub struct ChatwootClient {
    client: Client,
    accounts_url: String,
    api_key: String,
    inbox_id: u64,
    contact_domain: String,
}

impl ChatwootClient {
    pub fn new(config: &HelpdeskConfig) -> Result<Self, HelpdeskError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| HelpdeskError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            accounts_url: format!(
                "{}/api/v1/accounts/{}",
                config.base_url.trim_end_matches('/'),
                config.account_id
            ),
            api_key: config.api_key.clone(),
            inbox_id: config.inbox_id,
            contact_domain: config.contact_domain.clone(),
        })
    }

    /// Stable pseudo-email a user's contact is looked up by
    pub fn contact_email(&self, user_id: &str) -> String {
        format!("{user_id}@{}", self.contact_domain)
    }

    /// Search for the user's contact, creating it on a miss.
    ///
    /// Search failures are treated as a miss; only creation errors surface.
    pub async fn find_or_create_contact(&self, user_id: &str) -> Result<String, HelpdeskError> {
        let email = self.contact_email(user_id);

        match self.search_contact(&email).await {
            Ok(Some(contact_ref)) => {
                tracing::debug!(user_id, contact_ref = %contact_ref, "Found existing contact");
                return Ok(contact_ref);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    kind = e.kind.as_str(),
                    "Contact search failed, creating a new contact"
                );
            }
        }

        self.create_contact(user_id, &email).await
    }

    /// Chatwoot search is a substring match, so only an exact email hit counts
    async fn search_contact(&self, email: &str) -> Result<Option<String>, HelpdeskError> {
        let request = self
            .client
            .get(format!("{}/contacts/search", self.accounts_url))
            .query(&[("q", email)]);
        let response: PayloadList<Value> = self.send(request).await?;

        Ok(response
            .payload
            .iter()
            .find(|contact| {
                contact
                    .get("email")
                    .and_then(Value::as_str)
                    .is_some_and(|candidate| candidate.trim().eq_ignore_ascii_case(email))
            })
            .and_then(|contact| extract_ref(contact.get("id"))))
    }

    async fn create_contact(&self, user_id: &str, email: &str) -> Result<String, HelpdeskError> {
        let body = CreateContactRequest {
            inbox_id: self.inbox_id,
            name: format!("User {user_id}"),
            email: email.to_string(),
            identifier: format!("{user_id}_{}", chrono::Utc::now().timestamp_millis()),
        };
        let request = self
            .client
            .post(format!("{}/contacts", self.accounts_url))
            .json(&body);
        let response: Value = self.send(request).await?;

        let payload = response.get("payload");
        extract_ref(
            payload
                .and_then(|p| p.get("contact"))
                .and_then(|c| c.get("id"))
                .or_else(|| payload.and_then(|p| p.get("id"))),
        )
        .ok_or_else(|| HelpdeskError::invalid_response("Contact creation returned no contact id"))
    }

    pub async fn create_conversation(&self, contact_ref: &str) -> Result<String, HelpdeskError> {
        let body = CreateConversationRequest {
            contact_id: contact_id_value(contact_ref),
            inbox_id: self.inbox_id,
        };
        let request = self
            .client
            .post(format!("{}/conversations", self.accounts_url))
            .json(&body);
        let response: Value = self.send(request).await?;

        extract_ref(
            response
                .get("id")
                .or_else(|| response.get("payload").and_then(|p| p.get("id"))),
        )
        .ok_or_else(|| {
            HelpdeskError::invalid_response("Conversation creation returned no conversation id")
        })
    }

    /// Post the user's text into the conversation as an incoming message
    pub async fn post_message(&self, conversation_ref: &str, text: &str) -> Result<(), HelpdeskError> {
        let body = CreateMessageRequest {
            content: text,
            message_type: "incoming",
        };
        let request = self
            .client
            .post(self.messages_url(conversation_ref))
            .json(&body);
        let _: Value = self.send(request).await?;
        Ok(())
    }

    pub async fn list_messages(
        &self,
        conversation_ref: &str,
    ) -> Result<Vec<ListedMessage>, HelpdeskError> {
        let request = self.client.get(self.messages_url(conversation_ref));
        let response: PayloadList<ChatwootMessage> = self.send(request).await?;

        Ok(response
            .payload
            .into_iter()
            .filter_map(ChatwootMessage::into_listed)
            .collect())
    }

    pub async fn conversation_status(
        &self,
        conversation_ref: &str,
    ) -> Result<ConversationStatus, HelpdeskError> {
        let request = self
            .client
            .get(format!("{}/conversations/{conversation_ref}", self.accounts_url));
        let response: Value = self.send(request).await?;

        response
            .get("status")
            .or_else(|| response.get("payload").and_then(|p| p.get("status")))
            .and_then(Value::as_str)
            .map(ConversationStatus::parse)
            .ok_or_else(|| HelpdeskError::invalid_response("Conversation has no status field"))
    }

    fn messages_url(&self, conversation_ref: &str) -> String {
        format!(
            "{}/conversations/{conversation_ref}/messages",
            self.accounts_url
        )
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, HelpdeskError> {
        let response = request
            .header("api_access_token", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    HelpdeskError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    HelpdeskError::network(format!("Connection failed: {e}"))
                } else {
                    HelpdeskError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HelpdeskError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(HelpdeskError::from_status(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            HelpdeskError::invalid_response(format!("Failed to parse response: {e} - body: {body}"))
        })
    }
}

/// Chatwoot ids are numbers on the wire; refs are carried as strings
fn extract_ref(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn contact_id_value(contact_ref: &str) -> Value {
    contact_ref
        .parse::<u64>()
        .map_or_else(|_| Value::String(contact_ref.to_string()), Value::from)
}

// Chatwoot API types

#[derive(Debug, Serialize)]
struct CreateContactRequest {
    inbox_id: u64,
    name: String,
    email: String,
    identifier: String,
}

#[derive(Debug, Serialize)]
struct CreateConversationRequest {
    contact_id: Value,
    inbox_id: u64,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    content: &'a str,
    message_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct PayloadList<T> {
    #[serde(default = "Vec::new")]
    payload: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ChatwootMessage {
    id: Option<u64>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    sender: Option<ChatwootSender>,
}

#[derive(Debug, Deserialize)]
struct ChatwootSender {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    available_name: Option<String>,
}

impl ChatwootMessage {
    /// Messages without an id or sender cannot be ordered or attributed
    fn into_listed(self) -> Option<ListedMessage> {
        let id = self.id?;
        let sender = self.sender?;
        let sender_name = sender
            .available_name
            .or(sender.name)
            .filter(|n| !n.trim().is_empty());

        Some(ListedMessage {
            id,
            sender_role: SenderRole::parse(sender.kind.as_deref().unwrap_or_default()),
            sender_name,
            content: self.content.unwrap_or_default(),
        })
    }
}
