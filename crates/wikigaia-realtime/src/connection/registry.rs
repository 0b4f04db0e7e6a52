//! Registry of open connections, indexed by connection and by problem.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;

use wikigaia_core::types::{ConnectionId, ProblemId};

use super::handle::ConnectionHandle;

/// Thread-safe registry of every open stream.
///
/// Lookups return owned snapshots, so callers may remove entries while
/// iterating a result.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    by_problem: DashMap<ProblemId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection.
    pub fn register(&self, handle: Arc<ConnectionHandle>) {
        for problem_id in &handle.subscriptions {
            self.by_problem
                .entry(*problem_id)
                .or_default()
                .insert(handle.id);
        }
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection.
    pub fn unregister(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        for problem_id in &handle.subscriptions {
            if let Some(mut ids) = self.by_problem.get_mut(problem_id) {
                ids.remove(conn_id);
            }
            self.by_problem.remove_if(problem_id, |_, ids| ids.is_empty());
        }
        Some(handle)
    }

    /// Snapshot of the connections subscribed to a problem.
    pub fn subscribers(&self, problem_id: &ProblemId) -> Vec<Arc<ConnectionHandle>> {
        let ids: Vec<ConnectionId> = match self.by_problem.get(problem_id) {
            Some(entry) => entry.value().iter().copied().collect(),
            None => return Vec::new(),
        };
        ids.iter()
            .filter_map(|id| self.by_id.get(id).map(|entry| entry.value().clone()))
            .collect()
    }

    /// Snapshot of every connection.
    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Removes every connection.
    pub fn clear(&self) -> Vec<Arc<ConnectionHandle>> {
        let handles = self.all();
        for handle in &handles {
            self.unregister(&handle.id);
        }
        handles
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Number of problems with at least one subscriber.
    pub fn subscribed_problem_count(&self) -> usize {
        self.by_problem.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn handle(problems: Vec<ProblemId>) -> Arc<ConnectionHandle> {
        let (tx, _rx) = mpsc::channel(4);
        Arc::new(ConnectionHandle::new(None, problems, tx))
    }

    #[test]
    fn test_register_and_unregister() {
        let registry = ConnectionRegistry::new();
        let p1 = ProblemId::new();
        let p2 = ProblemId::new();
        let a = handle(vec![p1, p2]);
        let b = handle(vec![p1]);
        registry.register(a.clone());
        registry.register(b.clone());

        assert_eq!(registry.connection_count(), 2);
        assert_eq!(registry.subscribers(&p1).len(), 2);
        assert_eq!(registry.subscribed_problem_count(), 2);

        assert!(registry.unregister(&a.id).is_some());
        assert!(registry.unregister(&a.id).is_none());
        assert_eq!(registry.subscribers(&p1).len(), 1);
        assert!(registry.subscribers(&p2).is_empty());
        assert_eq!(registry.subscribed_problem_count(), 1);
    }

    #[test]
    fn test_removal_during_iteration() {
        let registry = ConnectionRegistry::new();
        let p = ProblemId::new();
        for _ in 0..5 {
            registry.register(handle(vec![p]));
        }
        for h in registry.subscribers(&p) {
            registry.unregister(&h.id);
        }
        assert_eq!(registry.connection_count(), 0);
        assert_eq!(registry.subscribed_problem_count(), 0);
    }
}
