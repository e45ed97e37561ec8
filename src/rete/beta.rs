//! Beta nodes: multi-fact joins (SPEC_FULL §4.3 "Beta nodes").
//!
//! A beta node extends every tuple produced by its `left` parent (an earlier
//! pattern's alpha or beta node) with every candidate fact from `right` (an
//! alpha node for the next pattern's fact type) whose join constraint holds.
//! `right` is always an alpha node: self-contained filtering on the new
//! pattern's own fields happens there so it can be shared across rules;
//! `join_constraint` only ever compares the new fact against earlier tuple
//! positions or constants.

use super::network::{CConstraint, NodeId, Tuple};

#[derive(Debug)]
pub(crate) struct BetaNode {
    pub left: NodeId,
    pub right: NodeId,
    pub join_constraint: Option<CConstraint>,
    pub tuples: Vec<Tuple>,
}
