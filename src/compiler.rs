//! Lowers typed LHS/RHS rule definitions into a shared [`ReteGraph`]
//! (SPEC_FULL §4.1 "LHS compiler", §6 "Compile-time interface").
//!
//! Each pattern's field-expressions are classified left-to-right: a reference
//! to a local alias already introduced in the same pattern, or to an earlier
//! pattern's binding, compiles cleanly; a reference to a name the pattern
//! itself will only introduce later is rejected as a
//! [`CompileError::ForwardReference`] rather than given an implementation-
//! defined meaning.

use std::collections::{HashMap, HashSet};

use crate::ast::{self, Constraint, FieldExpr, Pattern, RhsMutation, RuleDef, Term};
use crate::error::{CompileError, CompileResult};
use crate::rete::binding::BindingTable;
use crate::rete::network::{constraint_is_alpha_safe, CConstraint, CTerm};
use crate::rete::{NodeId, ReteGraph};
use crate::rule::{Action, Rule};

/// A rule definition paired with the host-supplied RHS action it compiles down
/// to at runtime.
pub struct RuleSource {
    pub def: RuleDef,
    pub action: Action,
}

/// The compiled form of a whole contract's rule set: the shared matching
/// network plus, for each rule, its terminal node id and runtime action.
pub struct CompiledContract {
    pub graph: ReteGraph,
    pub rules: Vec<(NodeId, Rule)>,
}

/// Compile every rule in `sources` into one shared [`ReteGraph`].
///
/// `known_fact_types` is the set of fact type names the enclosing contract has
/// declared; a pattern naming anything else is rejected with
/// [`CompileError::UnknownFactType`].
pub fn compile(known_fact_types: &HashSet<String>, sources: Vec<RuleSource>) -> CompileResult<CompiledContract> {
    let mut seen_names = HashSet::new();
    for source in &sources {
        if !seen_names.insert(source.def.name.clone()) {
            return Err(CompileError::DuplicateRuleName(source.def.name.clone()));
        }
    }

    let mut graph = ReteGraph::new();
    let mut rules = Vec::new();
    for source in sources {
        let terminal = compile_rule(known_fact_types, &source.def, &mut graph)?;
        rules.push((
            terminal,
            Rule {
                name: source.def.name,
                action: source.action,
            },
        ));
    }
    Ok(CompiledContract { graph, rules })
}

fn compile_rule(known_fact_types: &HashSet<String>, rule: &RuleDef, graph: &mut ReteGraph) -> CompileResult<NodeId> {
    check_update_invariant(rule)?;

    let mut bindings = BindingTable::new();
    let mut node: Option<NodeId> = None;
    let mut binding_names = Vec::with_capacity(rule.patterns.len());

    for (pattern_index, pattern) in rule.patterns.iter().enumerate() {
        if !known_fact_types.contains(&pattern.fact_type) {
            return Err(CompileError::UnknownFactType(pattern.fact_type.clone()));
        }

        let (alpha_constraint, join_constraint) = compile_pattern(rule, pattern_index, pattern, &bindings)?;

        let alpha = match graph.find_alpha(&pattern.fact_type, &alpha_constraint) {
            Some(id) => id,
            None => graph.add_alpha(pattern.fact_type.clone(), alpha_constraint),
        };
        node = Some(match node {
            None => alpha,
            Some(left) => graph.add_beta(left, alpha, join_constraint),
        });

        if let Some(name) = &pattern.binding {
            bindings.bind_pattern(name, pattern_index);
        }
        binding_names.push(pattern.binding.clone());
    }

    let parent = node.ok_or_else(|| CompileError::UnboundIdentifier {
        rule: rule.name.clone(),
        identifier: "<empty LHS>".to_string(),
    })?;
    Ok(graph.add_terminal(parent, rule.name.clone(), binding_names))
}

/// Compile one pattern's field-expressions, producing its alpha-safe
/// constraint (self-contained, shareable) and its join constraint (references
/// an earlier pattern), combined separately with `And`.
fn compile_pattern(
    rule: &RuleDef,
    pattern_index: usize,
    pattern: &Pattern,
    bindings: &BindingTable,
) -> CompileResult<(Option<CConstraint>, Option<CConstraint>)> {
    let all_local_names: HashSet<&str> = pattern
        .field_exprs
        .iter()
        .filter_map(|fe| match fe {
            FieldExpr::Bind { name, .. } => Some(name.as_str()),
            FieldExpr::Constraint(_) => None,
        })
        .collect();

    let mut local_aliases: HashMap<&str, &str> = HashMap::new();
    let mut alpha_parts = Vec::new();
    let mut join_parts = Vec::new();

    for field_expr in &pattern.field_exprs {
        match field_expr {
            FieldExpr::Bind { name, field } => {
                local_aliases.insert(name.as_str(), field.as_str());
            }
            FieldExpr::Constraint(c) => {
                let compiled = compile_constraint(rule, pattern_index, c, &local_aliases, &all_local_names, bindings)?;
                if constraint_is_alpha_safe(&compiled) {
                    alpha_parts.push(compiled);
                } else {
                    join_parts.push(compiled);
                }
            }
        }
    }

    Ok((conjoin(alpha_parts), conjoin(join_parts)))
}

fn conjoin(mut parts: Vec<CConstraint>) -> Option<CConstraint> {
    let mut result = parts.pop()?;
    while let Some(next) = parts.pop() {
        result = CConstraint::And(Box::new(next), Box::new(result));
    }
    Some(result)
}

fn compile_constraint(
    rule: &RuleDef,
    pattern_index: usize,
    c: &Constraint,
    local_aliases: &HashMap<&str, &str>,
    all_local_names: &HashSet<&str>,
    bindings: &BindingTable,
) -> CompileResult<CConstraint> {
    match c {
        Constraint::Compare { op, lhs, rhs } => Ok(CConstraint::Compare(
            *op,
            compile_term(rule, pattern_index, lhs, local_aliases, all_local_names, bindings)?,
            compile_term(rule, pattern_index, rhs, local_aliases, all_local_names, bindings)?,
        )),
        Constraint::And(a, b) => Ok(CConstraint::And(
            Box::new(compile_constraint(rule, pattern_index, a, local_aliases, all_local_names, bindings)?),
            Box::new(compile_constraint(rule, pattern_index, b, local_aliases, all_local_names, bindings)?),
        )),
        Constraint::Or(a, b) => Ok(CConstraint::Or(
            Box::new(compile_constraint(rule, pattern_index, a, local_aliases, all_local_names, bindings)?),
            Box::new(compile_constraint(rule, pattern_index, b, local_aliases, all_local_names, bindings)?),
        )),
        Constraint::Not(a) => Ok(CConstraint::Not(Box::new(compile_constraint(
            rule,
            pattern_index,
            a,
            local_aliases,
            all_local_names,
            bindings,
        )?))),
    }
}

fn compile_term(
    rule: &RuleDef,
    pattern_index: usize,
    term: &Term,
    local_aliases: &HashMap<&str, &str>,
    all_local_names: &HashSet<&str>,
    bindings: &BindingTable,
) -> CompileResult<CTerm> {
    match term {
        Term::Lit(ast::Lit::Int(i)) => Ok(CTerm::Lit(ast::Lit::Int(*i))),
        Term::Lit(ast::Lit::Bool(b)) => Ok(CTerm::Lit(ast::Lit::Bool(*b))),
        Term::Arith { op, lhs, rhs } => Ok(CTerm::Arith(
            *op,
            Box::new(compile_term(rule, pattern_index, lhs, local_aliases, all_local_names, bindings)?),
            Box::new(compile_term(rule, pattern_index, rhs, local_aliases, all_local_names, bindings)?),
        )),
        Term::Field(name) => {
            if let Some(real_field) = local_aliases.get(name.as_str()) {
                return Ok(CTerm::CurrentField(real_field.to_string()));
            }
            if all_local_names.contains(name.as_str()) {
                return Err(CompileError::ForwardReference {
                    rule: rule.name.clone(),
                    pattern_index,
                    identifier: name.clone(),
                });
            }
            Ok(CTerm::CurrentField(name.clone()))
        }
        Term::Binding(name) => match bindings.pattern_index_of(name) {
            Some(pos) => Ok(CTerm::TuplePosHandle(pos)),
            None => Err(unbound_or_forward(rule, pattern_index, name)),
        },
        Term::BoundField { binding, field } => match bindings.pattern_index_of(binding) {
            Some(pos) => Ok(CTerm::TuplePos(pos, field.clone())),
            None => Err(unbound_or_forward(rule, pattern_index, binding)),
        },
    }
}

fn unbound_or_forward(rule: &RuleDef, pattern_index: usize, identifier: &str) -> CompileError {
    let self_binding = rule.patterns[pattern_index].binding.as_deref() == Some(identifier);
    if self_binding {
        CompileError::ForwardReference {
            rule: rule.name.clone(),
            pattern_index,
            identifier: identifier.to_string(),
        }
    } else {
        CompileError::UnboundIdentifier {
            rule: rule.name.clone(),
            identifier: identifier.to_string(),
        }
    }
}

/// The mutate-without-update invariant (SPEC_FULL §4.1 "The update operator"):
/// every binding the RHS mutation trace names a `Set` for must also have a
/// matching `Update`, and every `Update` must name a binding this rule's LHS
/// actually bound.
fn check_update_invariant(rule: &RuleDef) -> CompileResult<()> {
    let bound: HashSet<&str> = rule.patterns.iter().filter_map(|p| p.binding.as_deref()).collect();
    let mut updated: HashSet<&str> = HashSet::new();
    for m in &rule.rhs_mutations {
        if let RhsMutation::Update { binding } = m {
            if !bound.contains(binding.as_str()) {
                return Err(CompileError::UpdateOfUnboundIdentifier {
                    rule: rule.name.clone(),
                    identifier: binding.clone(),
                });
            }
            updated.insert(binding.as_str());
        }
    }
    for m in &rule.rhs_mutations {
        if let RhsMutation::Set { binding } = m {
            if !updated.contains(binding.as_str()) {
                return Err(CompileError::MissingUpdate {
                    rule: rule.name.clone(),
                    binding: binding.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CompareOp, Lit, Pattern, RuleDef};

    fn fact_types(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn noop_action() -> Action {
        Box::new(|_ctx| Ok(()))
    }

    #[test]
    fn single_pattern_rule_compiles_to_one_alpha_and_one_terminal() {
        let rule = RuleDef {
            name: "r1".to_string(),
            patterns: vec![Pattern {
                fact_type: "Account".to_string(),
                binding: Some("a".to_string()),
                field_exprs: vec![FieldExpr::Constraint(Constraint::Compare {
                    op: CompareOp::Gt,
                    lhs: Term::Field("balance".to_string()),
                    rhs: Term::Lit(Lit::Int(0)),
                })],
            }],
            rhs_mutations: vec![],
        };
        let compiled = compile(
            &fact_types(&["Account"]),
            vec![RuleSource { def: rule, action: noop_action() }],
        )
        .unwrap();
        assert_eq!(compiled.rules.len(), 1);
    }

    #[test]
    fn forward_reference_within_a_pattern_is_rejected() {
        let rule = RuleDef {
            name: "r1".to_string(),
            patterns: vec![Pattern {
                fact_type: "Account".to_string(),
                binding: None,
                field_exprs: vec![FieldExpr::Constraint(Constraint::Compare {
                    op: CompareOp::Eq,
                    lhs: Term::Field("alias_not_yet_bound".to_string()),
                    rhs: Term::Lit(Lit::Int(0)),
                })],
            }],
            rhs_mutations: vec![],
        };
        // `alias_not_yet_bound` never actually gets bound anywhere in the pattern,
        // so this exercises the plain field-access path, not ForwardReference.
        // A genuine forward reference needs a later `Bind` introducing the name.
        let rule_with_forward_ref = RuleDef {
            name: "r2".to_string(),
            patterns: vec![Pattern {
                fact_type: "Account".to_string(),
                binding: None,
                field_exprs: vec![
                    FieldExpr::Constraint(Constraint::Compare {
                        op: CompareOp::Eq,
                        lhs: Term::Field("alias".to_string()),
                        rhs: Term::Lit(Lit::Int(0)),
                    }),
                    FieldExpr::Bind {
                        name: "alias".to_string(),
                        field: "balance".to_string(),
                    },
                ],
            }],
            rhs_mutations: vec![],
        };

        assert!(compile(
            &fact_types(&["Account"]),
            vec![RuleSource { def: rule, action: noop_action() }],
        )
        .is_ok());

        let err = compile(
            &fact_types(&["Account"]),
            vec![RuleSource {
                def: rule_with_forward_ref,
                action: noop_action(),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::ForwardReference { .. }));
    }

    #[test]
    fn mutation_without_update_is_rejected() {
        let rule = RuleDef {
            name: "r1".to_string(),
            patterns: vec![Pattern {
                fact_type: "Account".to_string(),
                binding: Some("a".to_string()),
                field_exprs: vec![],
            }],
            rhs_mutations: vec![RhsMutation::Set { binding: "a".to_string() }],
        };
        let err = compile(
            &fact_types(&["Account"]),
            vec![RuleSource { def: rule, action: noop_action() }],
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::MissingUpdate { .. }));
    }

    #[test]
    fn update_after_set_is_accepted() {
        let rule = RuleDef {
            name: "r1".to_string(),
            patterns: vec![Pattern {
                fact_type: "Account".to_string(),
                binding: Some("a".to_string()),
                field_exprs: vec![],
            }],
            rhs_mutations: vec![
                RhsMutation::Set { binding: "a".to_string() },
                RhsMutation::Update { binding: "a".to_string() },
            ],
        };
        assert!(compile(
            &fact_types(&["Account"]),
            vec![RuleSource { def: rule, action: noop_action() }],
        )
        .is_ok());
    }

    #[test]
    fn unknown_fact_type_is_rejected() {
        let rule = RuleDef {
            name: "r1".to_string(),
            patterns: vec![Pattern {
                fact_type: "Widget".to_string(),
                binding: None,
                field_exprs: vec![],
            }],
            rhs_mutations: vec![],
        };
        let err = compile(
            &fact_types(&["Account"]),
            vec![RuleSource { def: rule, action: noop_action() }],
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::UnknownFactType(t) if t == "Widget"));
    }

    #[test]
    fn duplicate_rule_names_are_rejected() {
        let pattern = Pattern {
            fact_type: "Account".to_string(),
            binding: None,
            field_exprs: vec![],
        };
        let rule_a = RuleDef {
            name: "dup".to_string(),
            patterns: vec![pattern.clone()],
            rhs_mutations: vec![],
        };
        let rule_b = RuleDef {
            name: "dup".to_string(),
            patterns: vec![pattern],
            rhs_mutations: vec![],
        };
        let err = compile(
            &fact_types(&["Account"]),
            vec![
                RuleSource { def: rule_a, action: noop_action() },
                RuleSource { def: rule_b, action: noop_action() },
            ],
        )
        .unwrap_err();
        assert!(matches!(err, CompileError::DuplicateRuleName(n) if n == "dup"));
    }

    #[test]
    fn second_pattern_referencing_first_pattern_binding_is_a_join() {
        let rule = RuleDef {
            name: "r1".to_string(),
            patterns: vec![
                Pattern {
                    fact_type: "Account".to_string(),
                    binding: Some("a".to_string()),
                    field_exprs: vec![],
                },
                Pattern {
                    fact_type: "Transfer".to_string(),
                    binding: Some("t".to_string()),
                    field_exprs: vec![FieldExpr::Constraint(Constraint::Compare {
                        op: CompareOp::Eq,
                        lhs: Term::Field("from".to_string()),
                        rhs: Term::Binding("a".to_string()),
                    })],
                },
            ],
            rhs_mutations: vec![],
        };
        let compiled = compile(
            &fact_types(&["Account", "Transfer"]),
            vec![RuleSource { def: rule, action: noop_action() }],
        )
        .unwrap();
        assert_eq!(compiled.rules.len(), 1);
    }
}
