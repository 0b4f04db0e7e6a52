//! Event publishing seam between request handling and background work.

use async_trait::async_trait;

use crate::events::DomainEvent;
use crate::result::AppResult;

/// Accepts domain events for asynchronous processing.
///
/// Implementations must not block on downstream work: publishing hands the
/// event off and returns.
#[async_trait]
pub trait EventPublisher: Send + Sync + 'static {
    /// Hand an event off for processing.
    async fn publish(&self, event: DomainEvent) -> AppResult<()>;
}

/// Publisher that discards every event.
#[derive(Debug, Clone, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: DomainEvent) -> AppResult<()> {
        tracing::trace!(event = event.name(), "Discarding event");
        Ok(())
    }
}
