//! Core handoff state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the controller feeds observed events in, persists the returned session
//! and executes the returned effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
#[allow(unused_imports)] // Origin and TransitionResult are matched on by tests
pub use state::{HandoffContext, HandoffNotice, Origin, Session, TimelineEntry, TriggerVocabulary};
#[allow(unused_imports)]
pub use transition::{transition, TransitionError, TransitionResult};
