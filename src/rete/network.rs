//! Shared node-arena types and the full-recompute refresh algorithm
//! (SPEC_FULL §4.3 "Matching network").
//!
//! Nodes live in one flat `Vec` and refer to each other by index (`NodeId`)
//! rather than by pointer, so beta nodes can name their parent without the
//! graph becoming a web of `Rc<RefCell<_>>` cycles — the arena-of-indices
//! design note in SPEC_FULL §9.

use crate::ast::{ArithOp, CompareOp, Lit};
use crate::fact::{FactHandle, FactTable};
use crate::host::Host;
use crate::value::Value;

use super::alpha::AlphaNode;
use super::beta::BetaNode;

/// Index of a node within a [`ReteGraph`]. Stable for the graph's lifetime:
/// nodes are never removed, only rebuilt in place on [`ReteGraph::refresh`].
pub type NodeId = usize;

/// One row of a node's output: the fact handle bound to each pattern position
/// covered so far, in pattern order. Alpha-node tuples always have length 1.
pub type Tuple = Vec<FactHandle>;

/// A compiled condition term, resolved by the compiler to either "a field of
/// the fact currently under test" or "a field of an earlier pattern's match."
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CTerm {
    /// A field of the fact an alpha node is filtering, or the candidate right-hand
    /// fact a beta node is testing for join.
    CurrentField(String),
    /// A field of the fact bound at `pos` in the left tuple a beta node is
    /// extending. `pos` always names an earlier, already-compiled pattern.
    TuplePos(usize, String),
    /// The raw handle of the fact currently under test (no field access), used
    /// when a constraint compares fact identity rather than a field.
    CurrentHandle,
    /// The raw handle bound at `pos` in the left tuple.
    TuplePosHandle(usize),
    /// An integer or boolean literal.
    Lit(Lit),
    /// An arithmetic combination of two terms.
    Arith(ArithOp, Box<CTerm>, Box<CTerm>),
}

/// A compiled boolean condition over [`CTerm`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CConstraint {
    Compare(CompareOp, CTerm, CTerm),
    And(Box<CConstraint>, Box<CConstraint>),
    Or(Box<CConstraint>, Box<CConstraint>),
    Not(Box<CConstraint>),
}

/// A terminal node: the candidate-match buffer for one rule (SPEC_FULL §4.3,
/// §4.4). One terminal exists per rule, at the end of its pattern chain.
#[derive(Debug)]
pub struct TerminalNode {
    pub(crate) parent: NodeId,
    pub rule_name: String,
    /// Outer binding name for each pattern position, if that pattern carried one.
    pub binding_names: Vec<Option<String>>,
    pub(crate) tuples: Vec<Tuple>,
}

#[derive(Debug)]
pub(crate) enum Node {
    Alpha(AlphaNode),
    Beta(BetaNode),
    Terminal(TerminalNode),
}

/// Evaluation context passed down while resolving a [`CTerm`]/[`CConstraint`].
pub(crate) struct EvalCtx<'a> {
    pub fact_table: &'a FactTable,
    pub host: &'a dyn Host,
}

/// Whether `term` names only the fact currently under test (no reference to an
/// earlier tuple position), i.e. whether it can live in a shareable alpha node.
pub(crate) fn term_is_alpha_safe(term: &CTerm) -> bool {
    match term {
        CTerm::CurrentField(_) | CTerm::CurrentHandle | CTerm::Lit(_) => true,
        CTerm::TuplePos(..) | CTerm::TuplePosHandle(..) => false,
        CTerm::Arith(_, lhs, rhs) => term_is_alpha_safe(lhs) && term_is_alpha_safe(rhs),
    }
}

/// Whether `constraint` only ever references the fact currently under test.
pub(crate) fn constraint_is_alpha_safe(c: &CConstraint) -> bool {
    match c {
        CConstraint::Compare(_, lhs, rhs) => term_is_alpha_safe(lhs) && term_is_alpha_safe(rhs),
        CConstraint::And(a, b) | CConstraint::Or(a, b) => constraint_is_alpha_safe(a) && constraint_is_alpha_safe(b),
        CConstraint::Not(a) => constraint_is_alpha_safe(a),
    }
}

fn load(ctx: &EvalCtx, handle: FactHandle, field: &str) -> Value {
    let (_, storage_ref) = ctx
        .fact_table
        .get(handle)
        .unwrap_or_else(|| panic!("rete: tuple references a handle no longer in the fact table"));
    ctx.host.load_field(storage_ref, field)
}

fn apply_arith(op: ArithOp, a: i64, b: i64) -> i64 {
    match op {
        ArithOp::Add => a + b,
        ArithOp::Sub => a - b,
        ArithOp::Mul => a * b,
        ArithOp::Div => a / b,
    }
}

pub(crate) fn eval_term(term: &CTerm, current: FactHandle, left: &[FactHandle], ctx: &EvalCtx) -> Value {
    match term {
        CTerm::CurrentField(field) => load(ctx, current, field),
        CTerm::TuplePos(pos, field) => load(ctx, left[*pos], field),
        CTerm::CurrentHandle => Value::Handle(current),
        CTerm::TuplePosHandle(pos) => Value::Handle(left[*pos]),
        CTerm::Lit(Lit::Int(i)) => Value::Int(*i),
        CTerm::Lit(Lit::Bool(b)) => Value::Bool(*b),
        CTerm::Arith(op, lhs, rhs) => {
            let a = eval_term(lhs, current, left, ctx)
                .as_int()
                .expect("rete: arithmetic term did not resolve to an integer");
            let b = eval_term(rhs, current, left, ctx)
                .as_int()
                .expect("rete: arithmetic term did not resolve to an integer");
            Value::Int(apply_arith(*op, a, b))
        }
    }
}

fn compare(op: CompareOp, lhs: Value, rhs: Value) -> bool {
    match op {
        CompareOp::Eq => lhs == rhs,
        CompareOp::Ne => lhs != rhs,
        CompareOp::Lt => lhs < rhs,
        CompareOp::Le => lhs <= rhs,
        CompareOp::Gt => lhs > rhs,
        CompareOp::Ge => lhs >= rhs,
    }
}

pub(crate) fn eval_constraint(c: &CConstraint, current: FactHandle, left: &[FactHandle], ctx: &EvalCtx) -> bool {
    match c {
        CConstraint::Compare(op, lhs, rhs) => {
            let l = eval_term(lhs, current, left, ctx);
            let r = eval_term(rhs, current, left, ctx);
            compare(*op, l, r)
        }
        CConstraint::And(a, b) => eval_constraint(a, current, left, ctx) && eval_constraint(b, current, left, ctx),
        CConstraint::Or(a, b) => eval_constraint(a, current, left, ctx) || eval_constraint(b, current, left, ctx),
        CConstraint::Not(a) => !eval_constraint(a, current, left, ctx),
    }
}

/// The compiled matching network for an entire contract: every rule's
/// patterns lowered into shared alpha nodes and per-rule beta/terminal chains.
///
/// [`Self::refresh`] is the only way tuples ever change. There is no
/// incremental update path (SPEC_FULL §4.3 "Evaluation model" REDESIGN FLAG):
/// every call rebuilds every node's buffer from the current fact table, in
/// node-creation order, which is already a topological order because a node
/// always names a parent created before it.
#[derive(Debug, Default)]
pub struct ReteGraph {
    pub(crate) nodes: Vec<Node>,
}

impl ReteGraph {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn add_alpha(&mut self, fact_type: String, constraint: Option<CConstraint>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::Alpha(AlphaNode {
            fact_type,
            constraint,
            tuples: Vec::new(),
        }));
        id
    }

    /// Find an existing alpha node with identical (fact type, constraint), so
    /// multiple rules sharing a pattern shape reuse one node's work instead of
    /// re-filtering the same fact type redundantly every refresh.
    pub(crate) fn find_alpha(&self, fact_type: &str, constraint: &Option<CConstraint>) -> Option<NodeId> {
        self.nodes.iter().position(|n| match n {
            Node::Alpha(a) => a.fact_type == fact_type && &a.constraint == constraint,
            _ => false,
        })
    }

    pub(crate) fn add_beta(&mut self, left: NodeId, right: NodeId, join_constraint: Option<CConstraint>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::Beta(BetaNode {
            left,
            right,
            join_constraint,
            tuples: Vec::new(),
        }));
        id
    }

    pub(crate) fn add_terminal(&mut self, parent: NodeId, rule_name: String, binding_names: Vec<Option<String>>) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::Terminal(TerminalNode {
            parent,
            rule_name,
            binding_names,
            tuples: Vec::new(),
        }));
        id
    }

    /// Rebuild every node's tuple buffer from `fact_table` via `host`.
    pub fn refresh(&mut self, fact_table: &FactTable, host: &dyn Host) {
        let ctx = EvalCtx { fact_table, host };
        for i in 0..self.nodes.len() {
            match &self.nodes[i] {
                Node::Alpha(a) => {
                    let fact_type = a.fact_type.clone();
                    let constraint = a.constraint.clone();
                    let mut tuples = Vec::new();
                    for (handle, _storage_ref) in fact_table.iter(&fact_type) {
                        let keep = match &constraint {
                            None => true,
                            Some(c) => eval_constraint(c, handle, &[], &ctx),
                        };
                        if keep {
                            tuples.push(vec![handle]);
                        }
                    }
                    if let Node::Alpha(a) = &mut self.nodes[i] {
                        a.tuples = tuples;
                    }
                }
                Node::Beta(b) => {
                    let left = b.left;
                    let right = b.right;
                    let constraint = b.join_constraint.clone();
                    let left_tuples = self.tuples_of(left).to_vec();
                    let right_tuples = self.tuples_of(right).to_vec();
                    let mut tuples = Vec::new();
                    for lt in &left_tuples {
                        for rt in &right_tuples {
                            let candidate = rt[0];
                            let keep = match &constraint {
                                None => true,
                                Some(c) => eval_constraint(c, candidate, lt, &ctx),
                            };
                            if keep {
                                let mut combined = lt.clone();
                                combined.push(candidate);
                                tuples.push(combined);
                            }
                        }
                    }
                    if let Node::Beta(b) = &mut self.nodes[i] {
                        b.tuples = tuples;
                    }
                }
                Node::Terminal(t) => {
                    let parent = t.parent;
                    let tuples = self.tuples_of(parent).to_vec();
                    if let Node::Terminal(t) = &mut self.nodes[i] {
                        t.tuples = tuples;
                    }
                }
            }
        }
    }

    pub(crate) fn tuples_of(&self, id: NodeId) -> &[Tuple] {
        match &self.nodes[id] {
            Node::Alpha(a) => &a.tuples,
            Node::Beta(b) => &b.tuples,
            Node::Terminal(t) => &t.tuples,
        }
    }

    /// All current candidate matches for the rule whose terminal is `id`.
    pub fn terminal_tuples(&self, id: NodeId) -> &[Tuple] {
        match &self.nodes[id] {
            Node::Terminal(t) => &t.tuples,
            _ => panic!("rete: NodeId {id} is not a terminal node"),
        }
    }

    pub fn terminal(&self, id: NodeId) -> &TerminalNode {
        match &self.nodes[id] {
            Node::Terminal(t) => t,
            _ => panic!("rete: NodeId {id} is not a terminal node"),
        }
    }
}
