//! In-process session registry and timeline store
//!
//! Both live for the process lifetime only. Entries are written exclusively
//! by the handoff controller, which serializes access per user.

use crate::state_machine::{Session, TimelineEntry};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mapping from user identifier to helpdesk session
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, user_id: &str) -> Option<Session> {
        lock(&self.sessions).get(user_id).cloned()
    }

    pub fn put(&self, user_id: &str, session: Session) {
        lock(&self.sessions).insert(user_id.to_string(), session);
    }

    /// Delete the user's session, returning it if there was one
    pub fn remove(&self, user_id: &str) -> Option<Session> {
        lock(&self.sessions).remove(user_id)
    }

    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    #[allow(dead_code)] // Pairs with len()
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Mapping from user identifier to its append-only chat timeline
#[derive(Debug, Default)]
pub struct TimelineStore {
    timelines: Mutex<HashMap<String, Vec<TimelineEntry>>>,
}

impl TimelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, creating the user's timeline on first use
    pub fn append(&self, user_id: &str, entry: TimelineEntry) {
        lock(&self.timelines)
            .entry(user_id.to_string())
            .or_default()
            .push(entry);
    }

    /// Copy of the user's timeline; empty for users never seen
    pub fn snapshot(&self, user_id: &str) -> Vec<TimelineEntry> {
        lock(&self.timelines)
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        lock(&self.timelines).contains_key(user_id)
    }

    /// Number of users with a timeline
    pub fn user_count(&self) -> usize {
        lock(&self.timelines).len()
    }
}
