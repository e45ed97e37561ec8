//! The typed LHS/RHS fragment the host compiler hands the engine (SPEC_FULL §6
//! "Compile-time interface").
//!
//! There is no text syntax here and no parser: a contract compiler builds these
//! types directly after its own parsing and type-checking pass (SPEC_FULL §2
//! "Non-goals"). This module only has to describe the shape of an
//! already-validated-by-its-own-rules LHS/RHS pair precisely enough for
//! [`crate::compiler`] to lower it into a Rete network.

use serde::{Deserialize, Serialize};

/// A scalar term appearing inside a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Term {
    /// A field of the fact the enclosing pattern matches (`self.field` in effect).
    Field(String),
    /// A bare reference to an earlier binding, used as a fact handle (e.g.
    /// comparing two patterns' identities).
    Binding(String),
    /// A field of an earlier binding's fact (`other.field`).
    BoundField { binding: String, field: String },
    /// An integer or boolean literal.
    Lit(Lit),
    /// An arithmetic combination of two terms.
    Arith {
        op: ArithOp,
        lhs: Box<Term>,
        rhs: Box<Term>,
    },
}

/// A literal constant in a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lit {
    Int(i64),
    Bool(bool),
}

/// Arithmetic operator over two [`Term`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Comparison operator over two [`Term`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A boolean condition over one or more [`Term`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    Compare {
        op: CompareOp,
        lhs: Term,
        rhs: Term,
    },
    And(Box<Constraint>, Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
    Not(Box<Constraint>),
}

/// One element of a pattern's field-expression list, evaluated left-to-right
/// (SPEC_FULL §4.1 "Intra-pattern binding order").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldExpr {
    /// Introduce a local alias for `field` of the fact currently under test,
    /// visible to later field-expressions in this same pattern and to later
    /// patterns (if the pattern itself carries an outer `binding`, this is a
    /// second, narrower name for one of its fields).
    Bind { name: String, field: String },
    /// A boolean condition the fact under test (and any earlier bindings) must
    /// satisfy.
    Constraint(Constraint),
}

/// One pattern in a rule's LHS: "a fact of `fact_type` such that...".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// The fact type this pattern matches against.
    pub fact_type: String,
    /// Optional outer name bound to the whole matched fact (its handle), used
    /// by later patterns' `BoundField`/`Binding` terms.
    pub binding: Option<String>,
    /// Field bindings and constraints, evaluated left-to-right.
    pub field_exprs: Vec<FieldExpr>,
}

/// An RHS mutation the compile-time "mutate without update" check must track
/// (SPEC_FULL §4.1 "The update operator", §9 Open Question).
///
/// This is not the RHS itself — real RHS execution is a runtime closure
/// (see [`crate::rule::Rule::action`]) — it is the minimal trace of *which*
/// bindings an RHS mutates and updates, extracted by the host compiler so this
/// crate can check the invariant without re-implementing RHS codegen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RhsMutation {
    /// The RHS writes a field of `binding` via the host.
    Set { binding: String },
    /// The RHS calls `update(binding)`.
    Update { binding: String },
}

/// A complete rule definition: a name, an LHS pattern list, and the RHS
/// mutation trace used for the `update` invariant check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    pub name: String,
    pub patterns: Vec<Pattern>,
    pub rhs_mutations: Vec<RhsMutation>,
}
