//! Last-good snapshot per metric category.
//!
//! The scheduler is the only writer; the TUI and the exporter only read.
//! A write replaces the category's snapshot wholesale, and payloads are
//! shared behind an `Arc` so a reader sees exactly what was written.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::Serialize;

use crate::data::MetricPayload;

/// Kinds of data the console refreshes independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricCategory {
    Cpu,
    Memory,
    Disk,
    Services,
    Storage,
    TopConsumers,
    Quotas,
    Policies,
    Accounts,
}

impl MetricCategory {
    pub const ALL: [MetricCategory; 9] = [
        MetricCategory::Cpu,
        MetricCategory::Memory,
        MetricCategory::Disk,
        MetricCategory::Services,
        MetricCategory::Storage,
        MetricCategory::TopConsumers,
        MetricCategory::Quotas,
        MetricCategory::Policies,
        MetricCategory::Accounts,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricCategory::Cpu => "CPU",
            MetricCategory::Memory => "Memory",
            MetricCategory::Disk => "Disk",
            MetricCategory::Services => "Services",
            MetricCategory::Storage => "Storage",
            MetricCategory::TopConsumers => "Top Consumers",
            MetricCategory::Quotas => "Quotas",
            MetricCategory::Policies => "Policies",
            MetricCategory::Accounts => "Accounts",
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Monotonic number of a fetch round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Generation(pub u64);

/// The last successfully fetched payload for one category.
#[derive(Debug, Clone)]
pub struct MetricSnapshot {
    pub category: MetricCategory,
    pub captured_at: Instant,
    pub generation: Generation,
    pub payload: Arc<MetricPayload>,
}

/// Process-wide snapshot store.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: RwLock<HashMap<MetricCategory, MetricSnapshot>>,
    generation: AtomicU64,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next generation. Later calls always compare greater.
    pub fn next_generation(&self) -> Generation {
        Generation(self.generation.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn get(&self, category: MetricCategory) -> Option<MetricSnapshot> {
        self.snapshots.read().get(&category).cloned()
    }

    /// Replace the snapshot for `category` unconditionally.
    pub fn put(&self, category: MetricCategory, payload: MetricPayload) -> MetricSnapshot {
        let snapshot = MetricSnapshot {
            category,
            captured_at: Instant::now(),
            generation: self.next_generation(),
            payload: Arc::new(payload),
        };
        self.snapshots.write().insert(category, snapshot.clone());
        snapshot
    }

    /// Replace the snapshot unless the held one comes from a newer round.
    ///
    /// Returns the stored snapshot, or `None` when the payload was stale.
    pub fn put_if_newer(
        &self,
        category: MetricCategory,
        payload: MetricPayload,
        generation: Generation,
    ) -> Option<MetricSnapshot> {
        let mut snapshots = self.snapshots.write();
        if let Some(existing) = snapshots.get(&category) {
            if existing.generation > generation {
                return None;
            }
        }
        let snapshot = MetricSnapshot {
            category,
            captured_at: Instant::now(),
            generation,
            payload: Arc::new(payload),
        };
        snapshots.insert(category, snapshot.clone());
        Some(snapshot)
    }

    /// Categories that currently hold a snapshot, in declaration order.
    pub fn categories(&self) -> Vec<MetricCategory> {
        let mut categories: Vec<_> = self.snapshots.read().keys().copied().collect();
        categories.sort();
        categories
    }

    pub fn clear(&self) {
        self.snapshots.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MetricPayload, Severity, UsageGauge};

    fn gauge(percent: f64) -> MetricPayload {
        MetricPayload::Gauge(UsageGauge::new(percent, None))
    }

    #[test]
    fn test_put_then_get_returns_identical_payload() {
        let store = SnapshotStore::new();
        let written = store.put(MetricCategory::Cpu, gauge(42.0));
        let read = store.get(MetricCategory::Cpu).unwrap();

        assert!(Arc::ptr_eq(&written.payload, &read.payload));
        assert_eq!(*read.payload, gauge(42.0));
        assert_eq!(read.generation, written.generation);
    }

    #[test]
    fn test_put_replaces_wholesale() {
        let store = SnapshotStore::new();
        store.put(MetricCategory::Disk, gauge(10.0));
        store.put(MetricCategory::Disk, gauge(90.0));

        let snapshot = store.get(MetricCategory::Disk).unwrap();
        match &*snapshot.payload {
            MetricPayload::Gauge(g) => assert_eq!(g.severity, Severity::Critical),
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(store.categories(), vec![MetricCategory::Disk]);
    }

    #[test]
    fn test_older_generation_is_rejected() {
        let store = SnapshotStore::new();
        let old = store.next_generation();
        let new = store.next_generation();

        assert!(store.put_if_newer(MetricCategory::Memory, gauge(70.0), new).is_some());
        assert!(store.put_if_newer(MetricCategory::Memory, gauge(5.0), old).is_none());

        let snapshot = store.get(MetricCategory::Memory).unwrap();
        assert_eq!(snapshot.generation, new);
        assert_eq!(*snapshot.payload, gauge(70.0));
    }

    #[test]
    fn test_categories_are_independent() {
        let store = SnapshotStore::new();
        store.put(MetricCategory::Services, MetricPayload::Services(Vec::new()));
        assert!(store.get(MetricCategory::Storage).is_none());

        store.put(MetricCategory::Cpu, gauge(1.0));
        assert_eq!(
            store.categories(),
            vec![MetricCategory::Cpu, MetricCategory::Services]
        );

        store.clear();
        assert!(store.categories().is_empty());
    }
}
