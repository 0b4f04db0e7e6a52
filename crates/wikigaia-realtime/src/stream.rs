//! Client-facing end of a vote stream.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;

use wikigaia_core::types::ConnectionId;

use crate::connection::ConnectionRegistry;
use crate::message::types::VoteStreamEvent;
use crate::metrics::RealtimeMetrics;

/// Receives the events pushed to one connection.
///
/// Ends when the server evicts the connection. Dropping it (client
/// disconnect) removes the connection from the registry.
#[derive(Debug)]
pub struct ConnectionStream {
    id: ConnectionId,
    receiver: mpsc::Receiver<VoteStreamEvent>,
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl ConnectionStream {
    pub(crate) fn new(
        id: ConnectionId,
        receiver: mpsc::Receiver<VoteStreamEvent>,
        registry: Arc<ConnectionRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            id,
            receiver,
            registry,
            metrics,
        }
    }

    /// The connection this stream belongs to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Stream for ConnectionStream {
    type Item = VoteStreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl Drop for ConnectionStream {
    fn drop(&mut self) {
        if let Some(handle) = self.registry.unregister(&self.id) {
            handle.mark_dead();
            self.metrics.record_disconnect();
            tracing::info!(conn_id = %self.id, "Vote stream closed by client");
        }
    }
}
