//! HTTP API for the handoff service

mod handlers;
mod types;

pub use handlers::create_router;

use crate::runtime::{HandoffController, HelpdeskClient, Responder};
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState<H, R>
where
    H: HelpdeskClient,
    R: Responder,
{
    pub controller: Arc<HandoffController<H, R>>,
}

impl<H, R> AppState<H, R>
where
    H: HelpdeskClient,
    R: Responder,
{
    pub fn new(controller: HandoffController<H, R>) -> Self {
        Self {
            controller: Arc::new(controller),
        }
    }
}

// Derived Clone would require H: Clone and R: Clone
impl<H, R> Clone for AppState<H, R>
where
    H: HelpdeskClient,
    R: Responder,
{
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
        }
    }
}
