use crate::types::SnippetRecord;
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// One complete, internally consistent version of the index.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    records: Vec<SnippetRecord>,
    generation: u64,
}

impl IndexSnapshot {
    /// Orders records by id and drops duplicates. When two records share an
    /// id the one listed last wins.
    pub fn prepare_records(mut records: Vec<SnippetRecord>) -> Vec<SnippetRecord> {
        records.reverse();
        // Stable sort keeps the later duplicate in front, dedup keeps the first.
        records.sort_by(|a, b| a.id().cmp(b.id()));
        records.dedup_by(|later, earlier| later.id() == earlier.id());
        records
    }

    #[inline]
    pub fn records(&self) -> &[SnippetRecord] {
        &self.records
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SnippetRecord> {
        self.records
            .binary_search_by(|record| record.id().cmp(id))
            .ok()
            .map(|idx| &self.records[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(SnippetRecord::id)
    }
}

/// Holds the published snapshot. Writers swap a whole `Arc`, readers clone it,
/// so the lock is only ever held for a pointer copy.
#[derive(Debug)]
pub struct IndexStore {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl Default for IndexStore {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexStore {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(IndexSnapshot::default())),
        }
    }

    /// Replaces the current snapshot with `records` and returns the new
    /// generation.
    pub fn publish(&self, records: Vec<SnippetRecord>) -> u64 {
        let records = IndexSnapshot::prepare_records(records);

        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                error!("Index store lock poisoned, recovering");
                poisoned.into_inner()
            }
        };
        let generation = guard.generation.wrapping_add(1);
        *guard = Arc::new(IndexSnapshot {
            records,
            generation,
        });
        drop(guard);

        debug!("INDEX_PUBLISH: published generation {}", generation);
        generation
    }

    pub fn current(&self) -> Arc<IndexSnapshot> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn generation(&self) -> u64 {
        self.current().generation()
    }
}
