//! External helpdesk channel
//!
//! Talks to the Chatwoot application API on behalf of end users: contact
//! lookup, conversation creation, message posting, and the read-only calls
//! used for reconciliation.

mod chatwoot;
mod error;
mod types;

pub use chatwoot::ChatwootClient;
#[allow(unused_imports)] // HelpdeskErrorKind is asserted on by tests
pub use error::{HelpdeskError, HelpdeskErrorKind};
pub use types::*;
