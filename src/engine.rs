//! The embedding surface: compiles a rule set once, then exposes the four
//! operators a host calls against it (SPEC_FULL §4.6 "Embedding", §6
//! "External interfaces").

use std::collections::HashSet;

use crate::compiler::{self, RuleSource};
use crate::config::EngineConfig;
use crate::error::{CompileResult, Result};
use crate::fact::{FactHandle, FactTable, StorageRef};
use crate::host::Host;
use crate::rete::{NodeId, ReteGraph};
use crate::rule::Rule;

/// A compiled rule set bound to one host and one fact table.
///
/// Construction (`Engine::compile`) does all the work SPEC_FULL assigns to
/// contract compile time: pattern classification, alpha-node sharing, and the
/// `update`/forward-reference invariant checks. Everything after that is a
/// runtime operator call.
pub struct Engine<H: Host> {
    graph: ReteGraph,
    rules: Vec<(NodeId, Rule)>,
    fact_table: FactTable,
    host: H,
    config: EngineConfig,
}

impl<H: Host> Engine<H> {
    /// Compile `sources` against `known_fact_types` and bind the result to `host`.
    pub fn compile(known_fact_types: &HashSet<String>, sources: Vec<RuleSource>, host: H, config: EngineConfig) -> CompileResult<Self> {
        let compiled = compiler::compile(known_fact_types, sources)?;
        Ok(Self {
            graph: compiled.graph,
            rules: compiled.rules,
            fact_table: FactTable::new(),
            host,
            config,
        })
    }

    /// The `factInsert` operator: register a new fact of `fact_type` backed by
    /// `storage_ref` (SPEC_FULL §4.6). Fails if `storage_ref` already backs a
    /// live fact.
    pub fn fact_insert(&mut self, fact_type: &str, storage_ref: StorageRef) -> Result<FactHandle> {
        self.fact_table.insert(fact_type.to_string(), storage_ref)
    }

    /// The `factDelete` operator: remove a fact from working memory
    /// (SPEC_FULL §4.2, §4.6). Whether an unknown handle is silently ignored
    /// or reported as [`crate::error::EngineError::UnknownHandle`] is
    /// governed by `config.permissive_delete`.
    pub fn fact_delete(&mut self, handle: FactHandle) -> Result<()> {
        if self.config.permissive_delete {
            self.fact_table.delete(handle);
            Ok(())
        } else {
            self.fact_table.delete_strict(handle)
        }
    }

    /// The `fireAllRules` operator: run rules to quiescence (SPEC_FULL §4.4).
    pub fn fire_all_rules(&mut self) -> Result<u64> {
        crate::driver::fire_all_rules(&mut self.graph, &self.rules, &mut self.fact_table, &mut self.host, &self.config)
    }

    /// The host backing this engine's facts.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for a caller that wants to populate or
    /// inspect storage directly (e.g. test setup).
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The current fact table, for diagnostics and tests.
    pub fn fact_table(&self) -> &FactTable {
        &self.fact_table
    }
}
