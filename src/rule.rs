//! Runtime rule representation: an LHS pattern list plus an RHS action closure.
//!
//! [`crate::ast::RuleDef`] is the *compile-time* shape a host hands the engine.
//! A [`Rule`] is what the compiler turns it into for execution: the same LHS,
//! paired with the actual RHS effect. Real RHS codegen is the host compiler's
//! concern (SPEC_FULL §2 "Non-goals"); the engine only needs something callable
//! once a tuple has been selected to fire.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::fact::{FactHandle, FactTable, StorageRef};
use crate::host::Host;
use crate::value::Value;

/// The bound facts and storage surface available to a firing rule's RHS.
///
/// Constructed once per firing by [`crate::driver`] from the selected tuple's
/// bindings, handed to the rule's `action`, then discarded.
pub struct RhsContext<'a> {
    host: &'a mut dyn Host,
    fact_table: &'a mut FactTable,
    bindings: HashMap<String, FactHandle>,
}

impl<'a> RhsContext<'a> {
    pub(crate) fn new(host: &'a mut dyn Host, fact_table: &'a mut FactTable, bindings: HashMap<String, FactHandle>) -> Self {
        Self { host, fact_table, bindings }
    }

    /// The fact handle bound to `name` by the LHS match that triggered this firing.
    pub fn handle(&self, name: &str) -> FactHandle {
        *self
            .bindings
            .get(name)
            .unwrap_or_else(|| panic!("RhsContext: no binding named `{name}` in this firing"))
    }

    /// Read `field` of the fact bound to `name`.
    pub fn load_field(&self, name: &str, field: &str) -> Value {
        let handle = self.handle(name);
        let (_, storage_ref) = self
            .fact_table
            .get(handle)
            .unwrap_or_else(|| panic!("RhsContext: binding `{name}` names a handle no longer live"));
        self.host.load_field(storage_ref, field)
    }

    /// Write `field` of the fact bound to `name`. Per SPEC_FULL §4.1, an RHS
    /// that calls this must also call [`Self::update`] on the same binding
    /// before returning — the compiler enforces that statically via
    /// [`crate::ast::RhsMutation`]; this method performs the write itself.
    pub fn store_field(&mut self, name: &str, field: &str, value: Value) {
        let handle = self.handle(name);
        let (_, storage_ref) = self
            .fact_table
            .get(handle)
            .unwrap_or_else(|| panic!("RhsContext: binding `{name}` names a handle no longer live"));
        self.host.store_field(storage_ref, field, value);
    }

    /// Read `field` of an arbitrary fact handle, not necessarily one directly
    /// bound by this rule's LHS (e.g. a handle reached indirectly through
    /// another fact's field, such as a foreign-key-style reference).
    pub fn load_field_by_handle(&self, handle: FactHandle, field: &str) -> Value {
        let (_, storage_ref) = self
            .fact_table
            .get(handle)
            .unwrap_or_else(|| panic!("RhsContext: handle {handle} is no longer live"));
        self.host.load_field(storage_ref, field)
    }

    /// Write `field` of an arbitrary fact handle. See [`Self::load_field_by_handle`].
    pub fn store_field_by_handle(&mut self, handle: FactHandle, field: &str, value: Value) {
        let (_, storage_ref) = self
            .fact_table
            .get(handle)
            .unwrap_or_else(|| panic!("RhsContext: handle {handle} is no longer live"));
        self.host.store_field(storage_ref, field, value);
    }

    /// Mark `name`'s fact as changed. Semantically a no-op under the mandated
    /// full-recompute evaluation model (SPEC_FULL §4.3): every node rebuilds
    /// its tuples from current fact state on every iteration regardless, so
    /// there is no dirty/incremental bookkeeping for this to update. It exists
    /// so the compiler's mutate-without-update check has something to require
    /// a call to.
    pub fn update(&mut self, _name: &str) {}

    /// Register a new fact of `fact_type` backed by `storage_ref`, per the
    /// `factInsert` operator (SPEC_FULL §4.6 operators, §9 "Storage-reference
    /// capture"). `storage_ref` must already exist in the host and must not
    /// back any other live fact, or this returns [`EngineError::DuplicateFact`].
    pub fn fact_insert(&mut self, fact_type: &str, storage_ref: StorageRef) -> Result<FactHandle> {
        self.fact_table.insert(fact_type.to_string(), storage_ref)
    }

    /// Remove a fact from working memory, per the `factDelete` operator.
    pub fn fact_delete(&mut self, handle: FactHandle) {
        self.fact_table.delete(handle);
    }
}

/// An action a firing rule runs, built by the host compiler from its RHS
/// codegen. Boxed rather than generic so [`Rule`] values of different rules
/// can live together in one `Vec`.
pub type Action = Box<dyn Fn(&mut RhsContext<'_>) -> Result<()> + Send + Sync>;

/// A compiled rule: its name (for conflict resolution and diagnostics) and its
/// RHS action. The LHS itself is consumed during compilation into the shared
/// Rete network (SPEC_FULL §4.3) and is not retained here.
pub struct Rule {
    pub name: String,
    pub action: Action,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish_non_exhaustive()
    }
}
