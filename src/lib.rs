//! A deterministic, forward-chaining production-rule engine meant to be
//! embedded inside a smart-contract language's runtime.
//!
//! The engine owns pattern matching only: given a fact table and a compiled
//! set of rules, it decides which rule fires on which facts and in what
//! order. Parsing the rule language's surface syntax, type-checking it, RHS
//! code generation, gas metering, and persistent storage are all the
//! embedding host's responsibility — this crate only sees an opaque
//! [`fact::StorageRef`] and a [`host::Host`] to read and write fields through.
//!
//! The core operators are [`engine::Engine::fact_insert`],
//! [`engine::Engine::fact_delete`], and [`engine::Engine::fire_all_rules`];
//! the fourth, `update`, only exists as an RHS call
//! ([`rule::RhsContext::update`]) because its only job is satisfying a
//! compile-time invariant ([`error::CompileError::MissingUpdate`]) rather than
//! doing anything at runtime — see [`driver`] for why.

pub mod ast;
pub mod compiler;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod fact;
pub mod host;
pub mod rete;
pub mod rule;
pub mod value;

pub use compiler::{CompiledContract, RuleSource};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{CompileError, CompileResult, EngineError, Result};
pub use fact::{FactHandle, FactTable, StorageRef};
pub use host::{Host, MemoryHost};
pub use rule::{Action, Rule, RhsContext};
pub use value::Value;
