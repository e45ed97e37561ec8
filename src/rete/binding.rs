//! Tracks, during compilation of one rule, which pattern position an outer
//! binding name refers to (SPEC_FULL §4.1 "Cross-pattern binding").
//!
//! Local field aliases introduced mid-pattern (`Bind { name, field }`) are a
//! separate, narrower concern the compiler resolves inline while walking a
//! single pattern's field-expression list; this table only remembers names
//! that name a *whole matched fact* from an earlier, already-compiled pattern.

use std::collections::HashMap;

/// Outer binding name -> the pattern index whose match it names.
#[derive(Debug, Default)]
pub struct BindingTable {
    outer: HashMap<String, usize>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self { outer: HashMap::new() }
    }

    /// Record that pattern `pattern_index` carries the outer binding `name`,
    /// making it visible to every later pattern's constraints.
    pub fn bind_pattern(&mut self, name: &str, pattern_index: usize) {
        self.outer.insert(name.to_string(), pattern_index);
    }

    /// The pattern index bound to `name`, if any pattern compiled so far bound it.
    pub fn pattern_index_of(&self, name: &str) -> Option<usize> {
        self.outer.get(name).copied()
    }
}
