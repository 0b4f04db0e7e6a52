//! Domain events emitted by WikiGaia operations.
//!
//! Events are published through [`EventPublisher`](crate::traits::EventPublisher)
//! and consumed by the background worker, which fans them out to the
//! milestone, workflow, and realtime handlers.

pub mod vote;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::UserId;

pub use vote::{VoteAction, VoteEvent};

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event (if applicable).
    pub actor_id: Option<UserId>,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A vote-related event.
    Vote(VoteEvent),
}

impl DomainEvent {
    /// Create a new domain event.
    pub fn new(actor_id: Option<UserId>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor_id,
            payload,
        }
    }

    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match &self.payload {
            EventPayload::Vote(VoteEvent::Changed { .. }) => "vote.changed",
        }
    }
}
