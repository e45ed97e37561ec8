//! The storage/compiler boundary the engine runs behind (SPEC_FULL §3 "Host", §9
//! "Host integration").
//!
//! The engine never touches contract storage directly — it only knows fact
//! handles and [`crate::fact::StorageRef`]s, and asks a `Host` to read or write
//! the fields of whatever a `StorageRef` names. A real embedding backs this with
//! the contract runtime's storage layer; [`MemoryHost`] is a reference
//! implementation used by this crate's own tests.

use std::collections::HashMap;

use crate::fact::StorageRef;
use crate::value::Value;

/// Everything the matching engine needs from the surrounding contract runtime.
///
/// Field access is the only thing that crosses this boundary: parsing, type
/// checking, gas metering, and the actual storage format are entirely the
/// host's concern (SPEC_FULL §2 "Non-goals").
pub trait Host {
    /// Read `field` of the fact at `storage_ref`.
    ///
    /// The engine only ever calls this with a field name that the compiled
    /// pattern already validated against the host's schema, so a host
    /// implementation may panic on an unknown field rather than return a
    /// recoverable error.
    fn load_field(&self, storage_ref: StorageRef, field: &str) -> Value;

    /// Write `field` of the fact at `storage_ref`.
    fn store_field(&mut self, storage_ref: StorageRef, field: &str, value: Value);
}

/// In-memory reference [`Host`], storing each fact as a `field -> Value` map.
///
/// Not a production storage backend — it exists so this crate's own tests and
/// documentation examples can exercise the engine without depending on a real
/// contract runtime.
#[derive(Debug, Default, Clone)]
pub struct MemoryHost {
    cells: HashMap<StorageRef, HashMap<String, Value>>,
    next_ref: u64,
}

impl MemoryHost {
    /// An empty host.
    pub fn new() -> Self {
        Self {
            cells: HashMap::new(),
            next_ref: 1,
        }
    }

    /// Allocate a fresh storage cell holding `fields`, and return its reference.
    pub fn alloc(&mut self, fields: impl IntoIterator<Item = (&'static str, Value)>) -> StorageRef {
        let r = StorageRef(self.next_ref);
        self.next_ref += 1;
        self.cells
            .insert(r, fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect());
        r
    }
}

impl Host for MemoryHost {
    fn load_field(&self, storage_ref: StorageRef, field: &str) -> Value {
        self.cells
            .get(&storage_ref)
            .and_then(|fields| fields.get(field))
            .copied()
            .unwrap_or_else(|| panic!("MemoryHost: no field `{field}` at {storage_ref:?}"))
    }

    fn store_field(&mut self, storage_ref: StorageRef, field: &str, value: Value) {
        let cell = self
            .cells
            .entry(storage_ref)
            .or_insert_with(|| panic!("MemoryHost: no cell at {storage_ref:?}"));
        cell.insert(field.to_string(), value);
    }
}
