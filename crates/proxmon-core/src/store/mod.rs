// ── Resource board ──
//
// Concurrent storage for the latest resource sample of every proxy,
// with push-based change notification via a `watch` channel. A full
// refresh upserts then prunes; a pushed update merges into one sample.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;
use tracing::debug;

use crate::model::{ProxyId, ResourceSample, ResourceUpdate};

pub type BoardSnapshot = Arc<Vec<Arc<ResourceSample>>>;

/// Latest known resource sample per proxy.
pub struct ResourceBoard {
    samples: DashMap<ProxyId, Arc<ResourceSample>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Samples sorted by proxy id, rebuilt on mutation.
    snapshot: watch::Sender<BoardSnapshot>,
}

impl Default for ResourceBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceBoard {
    pub fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            samples: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace the board with a full refresh: upsert every sample, then
    /// prune proxies the refresh no longer reports.
    pub fn apply_snapshot(&self, samples: Vec<ResourceSample>) {
        let incoming: HashSet<ProxyId> = samples.iter().map(|s| s.proxy_id).collect();

        for sample in samples {
            self.samples.insert(sample.proxy_id, Arc::new(sample));
        }

        let stale: Vec<ProxyId> = self
            .samples
            .iter()
            .map(|r| *r.key())
            .filter(|id| !incoming.contains(id))
            .collect();
        for id in &stale {
            self.samples.remove(id);
        }
        if !stale.is_empty() {
            debug!(pruned = stale.len(), "pruned stale resource samples");
        }

        self.publish();
    }

    /// Merge a pushed update into the matching sample, creating one if
    /// the proxy is not on the board yet.
    pub fn apply_update(&self, update: &ResourceUpdate) {
        self.samples
            .entry(update.proxy_id)
            .and_modify(|sample| Arc::make_mut(sample).merge(update))
            .or_insert_with(|| Arc::new(ResourceSample::from_update(update)));
        self.publish();
    }

    pub fn get(&self, id: ProxyId) -> Option<Arc<ResourceSample>> {
        self.samples.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> BoardSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Samples whose group name matches `group`.
    pub fn filter_by_group(&self, group: &str) -> Vec<Arc<ResourceSample>> {
        self.snapshot()
            .iter()
            .filter(|s| s.group_name.as_deref() == Some(group))
            .cloned()
            .collect()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn publish(&self) {
        let mut values: Vec<Arc<ResourceSample>> =
            self.samples.iter().map(|r| Arc::clone(r.value())).collect();
        values.sort_by_key(|s| s.proxy_id);
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.version.send_modify(|v| *v += 1);
    }
}
