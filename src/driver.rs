//! The `fireAllRules` driver: full-recompute refresh, conflict resolution, and
//! repeated single-tuple firing until the network settles (SPEC_FULL §4.4
//! "Firing driver").
//!
//! Conflict resolution has exactly two levels and no others (SPEC_FULL §4.4,
//! explicit non-goal: no salience, no agenda groups): the textual order rules
//! were declared in, then the insertion order of the matching facts within the
//! winning rule's candidate buffer.

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::fact::{FactHandle, FactTable};
use crate::host::Host;
use crate::rete::{NodeId, ReteGraph};
use crate::rule::{Rule, RhsContext};

fn bindings_for(binding_names: &[Option<String>], tuple: &[FactHandle]) -> HashMap<String, FactHandle> {
    binding_names
        .iter()
        .zip(tuple.iter())
        .filter_map(|(name, handle)| name.as_ref().map(|n| (n.clone(), *handle)))
        .collect()
}

/// Run rules to quiescence: refresh the network, fire the first available
/// match in textual-then-insertion order, and repeat until one full refresh
/// finds no match anywhere.
///
/// Returns the number of rule firings that occurred. Under the mandated
/// full-recompute evaluation model there is no incremental re-activation to
/// reason about (SPEC_FULL §4.3): every firing is followed by a complete
/// rebuild of every node's tuples from current fact state before the next
/// match is chosen, so a fact changed by one firing is always visible to the
/// next.
pub fn fire_all_rules(
    graph: &mut ReteGraph,
    rules: &[(NodeId, Rule)],
    fact_table: &mut FactTable,
    host: &mut dyn Host,
    config: &EngineConfig,
) -> Result<u64> {
    let mut firings: u64 = 0;

    loop {
        graph.refresh(fact_table, host);

        let selected = rules.iter().find_map(|(terminal_id, rule)| {
            graph
                .terminal_tuples(*terminal_id)
                .first()
                .map(|tuple| (*terminal_id, rule, tuple.clone()))
        });

        let Some((terminal_id, rule, tuple)) = selected else {
            break;
        };

        if let Some(cap) = config.iteration_cap {
            if firings >= cap {
                return Err(EngineError::IterationCapExceeded(cap));
            }
        }

        let binding_names = graph.terminal(terminal_id).binding_names.clone();
        let bindings = bindings_for(&binding_names, &tuple);
        log::debug!("firing rule `{}` on tuple {tuple:?}", rule.name);

        let mut ctx = RhsContext::new(host, fact_table, bindings);
        (rule.action)(&mut ctx)?;

        firings += 1;
    }

    log::debug!("fireAllRules settled after {firings} firing(s)");
    Ok(firings)
}
