// Wed Jan 21 2026 - Alex

use crate::dwarf::{Die, DieRef};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Append-only owner of every DIE batch for the run.
///
/// Batches are shared out as `Arc<Vec<Die>>` so a DIE never moves after
/// insertion; chains across batches stay valid for the life of the analysis.
pub struct DieStore {
    batches: RwLock<Vec<Arc<Vec<Die>>>>,
}

impl DieStore {
    pub fn new() -> Self {
        Self {
            batches: RwLock::new(Vec::new()),
        }
    }

    /// Append a batch, returning its index and the shared handle.
    pub fn push_batch(&self, dies: Vec<Die>) -> (u32, Arc<Vec<Die>>) {
        let batch = Arc::new(dies);
        let mut batches = self.batches.write();
        let index = batches.len() as u32;
        batches.push(batch.clone());
        (index, batch)
    }

    pub fn batch(&self, index: u32) -> Arc<Vec<Die>> {
        self.batches.read()[index as usize].clone()
    }

    pub fn resolve(&self, die_ref: DieRef) -> Arc<Vec<Die>> {
        self.batch(die_ref.batch)
    }

    pub fn batch_count(&self) -> usize {
        self.batches.read().len()
    }

    pub fn die_count(&self) -> usize {
        self.batches.read().iter().map(|b| b.len()).sum()
    }

    pub fn clear(&self) {
        self.batches.write().clear();
    }
}

impl Default for DieStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Global run counters. Atomic increments only; read for progress lines and
/// the end-of-run summary.
#[derive(Default)]
pub struct Counters {
    processed: AtomicUsize,
    analyzed: AtomicUsize,
    unique_symbols: AtomicUsize,
    violations: AtomicUsize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub processed: usize,
    pub analyzed: usize,
    pub unique_symbols: usize,
    pub violations: usize,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processed(&self, count: usize) {
        self.processed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_analyzed(&self, count: usize) {
        self.analyzed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_unique_symbol(&self) {
        self.unique_symbols.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_violation(&self) {
        self.violations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            analyzed: self.analyzed.load(Ordering::Relaxed),
            unique_symbols: self.unique_symbols.load(Ordering::Relaxed),
            violations: self.violations.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.processed.store(0, Ordering::Relaxed);
        self.analyzed.store(0, Ordering::Relaxed);
        self.unique_symbols.store(0, Ordering::Relaxed);
        self.violations.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwarf::{Arch, Tag};

    #[test]
    fn test_push_and_resolve() {
        let store = DieStore::new();
        let dies = vec![
            Die::new(Tag::Subprogram, Arch::Arm64, 0x10),
            Die::new(Tag::BaseType, Arch::Arm64, 0x20),
        ];
        let (index, batch) = store.push_batch(dies);
        assert_eq!(index, 0);
        assert_eq!(batch.len(), 2);
        assert_eq!(store.batch_count(), 1);
        assert_eq!(store.die_count(), 2);

        let resolved = store.resolve(DieRef::new(0, 1));
        assert_eq!(resolved[1].tag, Tag::BaseType);
    }

    #[test]
    fn test_counters_snapshot() {
        let counters = Counters::new();
        counters.add_processed(5);
        counters.add_analyzed(5);
        counters.add_unique_symbol();
        counters.add_violation();
        let snap = counters.snapshot();
        assert_eq!(snap.processed, 5);
        assert_eq!(snap.analyzed, 5);
        assert_eq!(snap.unique_symbols, 1);
        assert_eq!(snap.violations, 1);

        counters.reset();
        assert_eq!(counters.snapshot(), CounterSnapshot::default());
    }
}
