//! Contract-compile-time rejections (SPEC_FULL §4.1, §4.5, §7), exercised the
//! way a host compiler would encounter them: by handing `compiler::compile`
//! an already-typed AST that violates one invariant at a time.

use std::collections::HashSet;

use contract_rule_engine::ast::{CompareOp, Constraint, FieldExpr, Lit, Pattern, RhsMutation, RuleDef, Term};
use contract_rule_engine::compiler::{compile, RuleSource};
use contract_rule_engine::CompileError;

fn fact_types(names: &[&str]) -> HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn noop_action() -> contract_rule_engine::Action {
    Box::new(|_ctx| Ok(()))
}

#[test]
fn forward_reference_to_a_later_binding_in_the_same_pattern_is_rejected() {
    let rule = RuleDef {
        name: "r".to_string(),
        patterns: vec![Pattern {
            fact_type: "Account".to_string(),
            binding: None,
            field_exprs: vec![
                FieldExpr::Constraint(Constraint::Compare {
                    op: CompareOp::Gt,
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

    let err = compile(&fact_types(&["Account"]), vec![RuleSource { def: rule, action: noop_action() }]).unwrap_err();
    assert!(matches!(err, CompileError::ForwardReference { pattern_index: 0, .. }));
}

#[test]
fn mutating_a_bound_fact_without_update_is_rejected() {
    let rule = RuleDef {
        name: "r".to_string(),
        patterns: vec![Pattern {
            fact_type: "Account".to_string(),
            binding: Some("a".to_string()),
            field_exprs: vec![],
        }],
        rhs_mutations: vec![RhsMutation::Set { binding: "a".to_string() }],
    };

    let err = compile(&fact_types(&["Account"]), vec![RuleSource { def: rule, action: noop_action() }]).unwrap_err();
    assert!(matches!(err, CompileError::MissingUpdate { binding, .. } if binding == "a"));
}

#[test]
fn update_of_an_identifier_no_pattern_bound_is_rejected() {
    let rule = RuleDef {
        name: "r".to_string(),
        patterns: vec![Pattern {
            fact_type: "Account".to_string(),
            binding: Some("a".to_string()),
            field_exprs: vec![],
        }],
        rhs_mutations: vec![RhsMutation::Update { binding: "ghost".to_string() }],
    };

    let err = compile(&fact_types(&["Account"]), vec![RuleSource { def: rule, action: noop_action() }]).unwrap_err();
    assert!(matches!(err, CompileError::UpdateOfUnboundIdentifier { identifier, .. } if identifier == "ghost"));
}

#[test]
fn unbound_identifier_in_a_constraint_is_rejected() {
    let rule = RuleDef {
        name: "r".to_string(),
        patterns: vec![Pattern {
            fact_type: "Transfer".to_string(),
            binding: None,
            field_exprs: vec![FieldExpr::Constraint(Constraint::Compare {
                op: CompareOp::Eq,
                lhs: Term::Field("from".to_string()),
                rhs: Term::Binding("nonexistent".to_string()),
            })],
        }],
        rhs_mutations: vec![],
    };

    let err = compile(&fact_types(&["Transfer"]), vec![RuleSource { def: rule, action: noop_action() }]).unwrap_err();
    assert!(matches!(err, CompileError::UnboundIdentifier { identifier, .. } if identifier == "nonexistent"));
}

#[test]
fn unknown_fact_type_is_rejected() {
    let rule = RuleDef {
        name: "r".to_string(),
        patterns: vec![Pattern {
            fact_type: "Ghost".to_string(),
            binding: None,
            field_exprs: vec![],
        }],
        rhs_mutations: vec![],
    };

    let err = compile(&fact_types(&["Account"]), vec![RuleSource { def: rule, action: noop_action() }]).unwrap_err();
    assert!(matches!(err, CompileError::UnknownFactType(t) if t == "Ghost"));
}

#[test]
fn duplicate_rule_names_across_a_contract_are_rejected() {
    let pattern = Pattern {
        fact_type: "Account".to_string(),
        binding: None,
        field_exprs: vec![],
    };
    let a = RuleDef {
        name: "same".to_string(),
        patterns: vec![pattern.clone()],
        rhs_mutations: vec![],
    };
    let b = RuleDef {
        name: "same".to_string(),
        patterns: vec![pattern],
        rhs_mutations: vec![],
    };

    let err = compile(
        &fact_types(&["Account"]),
        vec![
            RuleSource { def: a, action: noop_action() },
            RuleSource { def: b, action: noop_action() },
        ],
    )
    .unwrap_err();
    assert!(matches!(err, CompileError::DuplicateRuleName(n) if n == "same"));
}
