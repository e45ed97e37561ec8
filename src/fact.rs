//! Fact table / working memory (SPEC_FULL §3 "Working memory", §4.2 "Fact Table").
//!
//! Grounded on the teacher's `rete::working_memory::WorkingMemory`: dense handle
//! allocation, a type index for fast iteration, and handles distinct from the
//! underlying storage cell they name.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Opaque, dense identifier for a fact currently registered with the engine.
///
/// Handle `0` is reserved as the null handle and is never allocated by
/// [`FactTable::insert`] (SPEC_FULL §3, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FactHandle(u64);

impl FactHandle {
    /// Construct a handle directly. Exposed for tests and for hosts that persist
    /// and later reconstruct handles from their own serialised state.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The reserved null handle (never returned by `insert`).
    pub const NULL: FactHandle = FactHandle(0);

    /// The raw numeric id.
    pub const fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FactHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to a fact's storage cell, supplied by the host (SPEC_FULL §3
/// "Fact handle", §9 "Storage-reference capture"). The engine never dereferences
/// this itself; it only passes it to [`crate::host::Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StorageRef(pub u64);

struct Entry {
    fact_type: String,
    storage_ref: StorageRef,
}

/// Per-contract mapping from fact handle to (fact-type tag, storage reference),
/// partitioned by type for iteration.
///
/// Deletion is permissive by default (SPEC_FULL §4.2): deleting an unknown handle
/// is silently ignored unless `delete_strict` is used instead.
#[derive(Default)]
pub struct FactTable {
    entries: HashMap<FactHandle, Entry>,
    /// Handles of each fact type, in insertion order. Deleted handles are pruned
    /// lazily on the next `iter` of that type rather than eagerly, keeping
    /// `delete` O(1) at the cost of an occasional filter pass.
    by_type: HashMap<String, Vec<FactHandle>>,
    by_storage: HashMap<StorageRef, FactHandle>,
    next_id: u64,
    free_handles: Vec<FactHandle>,
}

impl FactTable {
    /// An empty fact table.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            by_type: HashMap::new(),
            by_storage: HashMap::new(),
            next_id: 1,
            free_handles: Vec::new(),
        }
    }

    /// Allocate a fresh handle for `storage_ref` and register it under `fact_type`.
    ///
    /// Fails with [`EngineError::DuplicateFact`] if `storage_ref` is already
    /// registered — a storage cell may back at most one live handle at a time.
    pub fn insert(&mut self, fact_type: impl Into<String>, storage_ref: StorageRef) -> Result<FactHandle> {
        if self.by_storage.contains_key(&storage_ref) {
            log::warn!("fact table: duplicate fact, storage reference {storage_ref:?} already inserted");
            return Err(EngineError::DuplicateFact);
        }
        let fact_type = fact_type.into();
        let handle = self.free_handles.pop().unwrap_or_else(|| {
            let id = self.next_id;
            self.next_id += 1;
            FactHandle::new(id)
        });

        self.entries.insert(
            handle,
            Entry {
                fact_type: fact_type.clone(),
                storage_ref,
            },
        );
        self.by_type.entry(fact_type).or_default().push(handle);
        self.by_storage.insert(storage_ref, handle);
        log::trace!("fact table: inserted {handle} (storage {storage_ref:?})");
        Ok(handle)
    }

    /// Remove `handle`. Unknown handles are silently ignored (permissive mode,
    /// the default described in SPEC_FULL §4.2).
    pub fn delete(&mut self, handle: FactHandle) {
        if let Some(entry) = self.entries.remove(&handle) {
            self.by_storage.remove(&entry.storage_ref);
            self.free_handles.push(handle);
            log::trace!("fact table: deleted {handle}");
        }
    }

    /// Like [`Self::delete`], but fails with [`EngineError::UnknownHandle`] instead
    /// of silently ignoring an unregistered handle (the strict mode SPEC_FULL §4.2
    /// leaves as a host decision).
    pub fn delete_strict(&mut self, handle: FactHandle) -> Result<()> {
        let Some(entry) = self.entries.remove(&handle) else {
            log::warn!("fact table: factDelete of unknown handle {handle}");
            return Err(EngineError::UnknownHandle(handle));
        };
        self.by_storage.remove(&entry.storage_ref);
        self.free_handles.push(handle);
        Ok(())
    }

    /// The (fact-type, storage reference) pair registered under `handle`, if live.
    pub fn get(&self, handle: FactHandle) -> Option<(&str, StorageRef)> {
        self.entries.get(&handle).map(|e| (e.fact_type.as_str(), e.storage_ref))
    }

    /// All handles of `fact_type`, in insertion order. This order is observable:
    /// it is the alpha-node enumeration order of SPEC_FULL §4.3, and it decides
    /// insertion-order tie-breaking in conflict resolution (§8).
    pub fn iter(&self, fact_type: &str) -> impl Iterator<Item = (FactHandle, StorageRef)> + '_ {
        self.by_type
            .get(fact_type)
            .into_iter()
            .flatten()
            .filter_map(move |h| self.entries.get(h).map(|e| (*h, e.storage_ref)))
    }

    /// Total number of live facts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no live facts.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
