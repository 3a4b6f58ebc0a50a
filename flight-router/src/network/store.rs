//! Shared, versioned access to the current network graph.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::info;

use crate::domain::RoutingError;

use super::graph::NetworkGraph;

/// Publishes immutable graph snapshots to concurrent readers.
///
/// Readers take an `Arc` to the current graph and keep reading it for as
/// long as they like; a query never observes a half-applied update. Writers
/// are serialized, copy the current graph, modify the copy and publish it
/// in a single pointer swap.
pub struct NetworkStore {
    current: RwLock<Arc<NetworkGraph>>,
    writer: Mutex<()>,
}

impl NetworkStore {
    pub fn new(graph: NetworkGraph) -> Self {
        Self {
            current: RwLock::new(Arc::new(graph)),
            writer: Mutex::new(()),
        }
    }

    /// The graph as of now.
    pub fn snapshot(&self) -> Arc<NetworkGraph> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    /// Replace the whole graph.
    ///
    /// The new graph continues the version sequence of the old one, so
    /// anything cached against an earlier version is recognised as stale.
    pub fn replace(&self, mut graph: NetworkGraph) -> Arc<NetworkGraph> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = self.snapshot().version();
        graph.set_version(previous + 1);

        let published = Arc::new(graph);
        self.publish(published.clone());
        info!(
            version = published.version(),
            airports = published.airport_count(),
            flights = published.flight_count(),
            "network replaced"
        );
        published
    }

    /// Run a mutation against a private copy of the graph and publish it.
    ///
    /// The copy is only published if the mutation succeeded and moved the
    /// version; otherwise readers keep the current snapshot. Returns the
    /// mutation's value and the snapshot that is current afterwards.
    pub fn update<T, F>(&self, mutate: F) -> Result<(T, Arc<NetworkGraph>), RoutingError>
    where
        F: FnOnce(&mut NetworkGraph) -> Result<T, RoutingError>,
    {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.snapshot();
        let mut draft = NetworkGraph::clone(&current);

        let value = mutate(&mut draft)?;
        if draft.version() == current.version() {
            return Ok((value, current));
        }

        let published = Arc::new(draft);
        self.publish(published.clone());
        Ok((value, published))
    }

    fn publish(&self, graph: Arc<NetworkGraph>) {
        let mut slot = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = graph;
    }
}
