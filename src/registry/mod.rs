// Wed Jan 21 2026 - Alex

pub mod object_files;
pub mod store;

pub use object_files::{ObjectFileDescriptor, ObjectFileRegistry};
pub use store::{CounterSnapshot, Counters, DieStore};

use crate::dwarf::{Die, DieRef};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Prime, to keep hash bias out of the stripe selection.
const CHAIN_STRIPE_COUNT: usize = 67;

/// Concurrent registry of DIEs keyed by identity hash.
///
/// First writer of a hash owns the map slot; later DIEs with the same
/// identity are spliced into a singly linked chain behind the head. The
/// chain `next` fields are only written under the stripe lock for that hash,
/// and stripe holders take no further locks, so there is no ordering cycle.
/// DIE storage is owned by the batch store and survives until `reset`.
pub struct DieRegistry {
    store: DieStore,
    map: DashMap<u64, DieRef>,
    stripes: Vec<Mutex<()>>,
    pub counters: Counters,
    pub object_files: ObjectFileRegistry,
}

impl DieRegistry {
    pub fn new() -> Self {
        Self {
            store: DieStore::new(),
            map: DashMap::new(),
            stripes: (0..CHAIN_STRIPE_COUNT).map(|_| Mutex::new(())).collect(),
            counters: Counters::new(),
            object_files: ObjectFileRegistry::new(),
        }
    }

    /// Register one DIE batch: append it to the store, then insert every
    /// non-skippable member into the identity map or its chain.
    pub fn register_batch(&self, dies: Vec<Die>) -> Arc<Vec<Die>> {
        let (batch_index, batch) = self.store.push_batch(dies);

        self.counters.add_processed(batch.len());

        for (index, die) in batch.iter().enumerate() {
            if die.skippable {
                continue;
            }

            let me = DieRef::new(batch_index, index as u32);

            match self.map.entry(die.hash) {
                Entry::Vacant(slot) => {
                    slot.insert(me);
                    self.counters.add_unique_symbol();
                }
                Entry::Occupied(slot) => {
                    let head = *slot.get();
                    let stripe =
                        &self.stripes[(die.hash % CHAIN_STRIPE_COUNT as u64) as usize];
                    let _guard = stripe.lock();

                    let head_batch = self.store.batch(head.batch);
                    let head_die = &head_batch[head.index as usize];
                    die.next
                        .store(head_die.next.load(Ordering::Acquire), Ordering::Release);
                    head_die.set_next(Some(me));
                }
            }
        }

        self.counters.add_analyzed(batch.len());
        batch
    }

    pub fn batch(&self, index: u32) -> Arc<Vec<Die>> {
        self.store.batch(index)
    }

    pub fn resolve(&self, die_ref: DieRef) -> Arc<Vec<Die>> {
        self.store.resolve(die_ref)
    }

    /// Snapshot of every registered identity and its chain head. Taken once
    /// at the parse barrier to drive the analysis stage.
    pub fn entries(&self) -> Vec<(u64, DieRef)> {
        self.map.iter().map(|e| (*e.key(), *e.value())).collect()
    }

    /// Replace the chain head after analysis re-orders a chain.
    pub fn update_head(&self, hash: u64, head: DieRef) {
        self.map.insert(hash, head);
    }

    /// Walk a chain into a flat list of refs.
    pub fn collect_chain(&self, head: DieRef) -> Vec<DieRef> {
        let mut refs = vec![head];
        let mut current = head;
        loop {
            let batch = self.store.resolve(current);
            match batch[current.index as usize].next_die() {
                Some(next) => {
                    refs.push(next);
                    current = next;
                }
                None => return refs,
            }
        }
    }

    pub fn unique_symbol_count(&self) -> usize {
        self.map.len()
    }

    pub fn die_count(&self) -> usize {
        self.store.die_count()
    }

    /// Drop the identity map, the batch store, and the object-file table.
    /// String-pool arenas are deliberately untouched; handles stay valid.
    pub fn reset(&self) {
        self.map.clear();
        self.store.clear();
        self.object_files.clear();
        self.counters.reset();
    }
}

impl Default for DieRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwarf::parser::identity_hash;
    use crate::dwarf::{Arch, Tag};
    use crate::strings::StringPool;

    fn make_die(pool: &StringPool, path: &str, fatal: u64, skippable: bool) -> Die {
        let mut die = Die::new(Tag::Subprogram, Arch::Arm64, 0x10);
        die.path = pool.empool(path);
        die.hash = identity_hash(die.arch, die.tag, die.path);
        die.fatal_attribute_hash = fatal;
        die.skippable = skippable;
        die
    }

    #[test]
    fn test_first_insert_is_unique() {
        let pool = StringPool::new();
        let registry = DieRegistry::new();
        registry.register_batch(vec![make_die(&pool, "::[u]::foo", 1, false)]);

        assert_eq!(registry.unique_symbol_count(), 1);
        assert_eq!(registry.counters.snapshot().unique_symbols, 1);
        assert_eq!(registry.counters.snapshot().processed, 1);
        assert_eq!(registry.counters.snapshot().analyzed, 1);
    }

    #[test]
    fn test_same_identity_chains() {
        let pool = StringPool::new();
        let registry = DieRegistry::new();
        registry.register_batch(vec![make_die(&pool, "::[u]::foo", 1, false)]);
        registry.register_batch(vec![make_die(&pool, "::[u]::foo", 2, false)]);
        registry.register_batch(vec![make_die(&pool, "::[u]::foo", 3, false)]);

        assert_eq!(registry.unique_symbol_count(), 1);
        let entries = registry.entries();
        assert_eq!(entries.len(), 1);
        let chain = registry.collect_chain(entries[0].1);
        assert_eq!(chain.len(), 3);
        // the head keeps the map slot; later arrivals splice in behind it
        assert_eq!(chain[0], DieRef::new(0, 0));
    }

    #[test]
    fn test_skippable_dies_not_registered() {
        let pool = StringPool::new();
        let registry = DieRegistry::new();
        registry.register_batch(vec![
            make_die(&pool, "::[u]::foo", 1, false),
            make_die(&pool, "::[u]", 0, true),
        ]);

        assert_eq!(registry.unique_symbol_count(), 1);
        // skippable dies still count as processed
        assert_eq!(registry.counters.snapshot().processed, 2);
    }

    #[test]
    fn test_distinct_identities_do_not_chain() {
        let pool = StringPool::new();
        let registry = DieRegistry::new();
        registry.register_batch(vec![
            make_die(&pool, "::[u]::foo", 1, false),
            make_die(&pool, "::[u]::bar", 1, false),
        ]);

        assert_eq!(registry.unique_symbol_count(), 2);
        for (_, head) in registry.entries() {
            assert_eq!(registry.collect_chain(head).len(), 1);
        }
    }

    #[test]
    fn test_concurrent_registration() {
        let pool = Arc::new(StringPool::new());
        let registry = Arc::new(DieRegistry::new());

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let pool = pool.clone();
                let registry = registry.clone();
                scope.spawn(move || {
                    for i in 0..50 {
                        let path = format!("::[u]::sym{}", i);
                        registry.register_batch(vec![make_die(&pool, &path, i as u64, false)]);
                    }
                });
            }
        });

        assert_eq!(registry.unique_symbol_count(), 50);
        let snapshot = registry.counters.snapshot();
        assert_eq!(snapshot.processed, 200);
        assert_eq!(snapshot.analyzed, 200);
        for (_, head) in registry.entries() {
            assert_eq!(registry.collect_chain(head).len(), 4);
        }
    }

    #[test]
    fn test_reset_clears_everything() {
        let pool = StringPool::new();
        let registry = DieRegistry::new();
        let handle = pool.empool("kept");
        registry.register_batch(vec![make_die(&pool, "::[u]::foo", 1, false)]);

        registry.reset();
        assert_eq!(registry.unique_symbol_count(), 0);
        assert_eq!(registry.die_count(), 0);
        assert_eq!(registry.counters.snapshot(), CounterSnapshot::default());
        // interned strings survive a reset
        assert_eq!(handle.view(), "kept");
        assert_eq!(pool.empool("kept"), handle);
    }
}
