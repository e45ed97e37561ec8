//! Benchmarks how `ReteGraph::refresh` scales with working-memory size, since
//! that full recompute (SPEC_FULL §4.3) is the one operation every
//! `fireAllRules` call pays for repeatedly.

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use contract_rule_engine::ast::{CompareOp, Constraint, FieldExpr, Lit, Pattern, RuleDef, Term};
use contract_rule_engine::compiler::RuleSource;
use contract_rule_engine::{Engine, EngineConfig, MemoryHost, Value};

fn build_engine(num_eligible_persons: usize) -> Engine<MemoryHost> {
    let mut host = MemoryHost::new();
    let budget_ref = host.alloc([("amount", Value::Int(1_000_000))]);

    let mut fact_types = HashSet::new();
    fact_types.insert("Budget".to_string());
    fact_types.insert("Person".to_string());

    let mut engine = Engine::compile(
        &fact_types,
        vec![RuleSource {
            def: RuleDef {
                name: "payPension".to_string(),
                patterns: vec![
                    Pattern {
                        fact_type: "Budget".to_string(),
                        binding: Some("budget".to_string()),
                        field_exprs: vec![],
                    },
                    Pattern {
                        fact_type: "Person".to_string(),
                        binding: Some("person".to_string()),
                        field_exprs: vec![FieldExpr::Constraint(Constraint::Compare {
                            op: CompareOp::Eq,
                            lhs: Term::Field("eligible".to_string()),
                            rhs: Term::Lit(Lit::Bool(true)),
                        })],
                    },
                ],
                rhs_mutations: vec![
                    contract_rule_engine::ast::RhsMutation::Set { binding: "person".to_string() },
                    contract_rule_engine::ast::RhsMutation::Update { binding: "person".to_string() },
                ],
            },
            action: Box::new(|ctx| {
                ctx.store_field("person", "eligible", Value::Bool(false));
                ctx.update("person");
                Ok(())
            }),
        }],
        host,
        EngineConfig::new().with_iteration_cap(10_000),
    )
    .expect("benchmark engine compiles");

    engine.fact_insert("Budget", budget_ref).unwrap();
    for i in 0..num_eligible_persons {
        let person_ref = engine.host_mut().alloc([
            ("age", Value::Int(70)),
            ("eligible", Value::Bool(i % 2 == 0)),
        ]);
        engine.fact_insert("Person", person_ref).unwrap();
    }

    engine
}

fn bench_refresh_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("rete_refresh");

    for size in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("fire_all_rules_settle", size), &size, |b, &size| {
            b.iter_batched(
                || build_engine(size),
                |mut engine| {
                    black_box(engine.fire_all_rules().unwrap());
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_refresh_scaling);
criterion_main!(benches);
