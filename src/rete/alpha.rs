//! Alpha nodes: single-fact filters (SPEC_FULL §4.3 "Alpha nodes").
//!
//! An alpha node holds every currently-live fact of one type that satisfies a
//! self-contained constraint (one referencing only that fact's own fields).
//! Two rules whose first pattern has the same fact type and the same
//! constraint share one alpha node (`ReteGraph::find_alpha`), so the filter
//! runs once per refresh rather than once per rule.

use super::network::{CConstraint, Tuple};

#[derive(Debug)]
pub(crate) struct AlphaNode {
    pub fact_type: String,
    pub constraint: Option<CConstraint>,
    pub tuples: Vec<Tuple>,
}
