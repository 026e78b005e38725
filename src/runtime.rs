//! Runtime for driving handoff sessions
//!
//! Executes the pure state machine's effects against the helpdesk and the
//! automated responder, one user at a time.

mod controller;
pub mod traits;


pub use controller::{ControllerStats, HandoffController, HandoffError};
pub use traits::*;

use crate::helpdesk::ChatwootClient;
use crate::responder::EchoResponder;

/// Type alias for production controller with concrete implementations
pub type ProductionController = HandoffController<ChatwootClient, EchoResponder>;
