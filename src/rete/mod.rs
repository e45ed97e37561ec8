//! The compiled matching network: alpha/beta/terminal nodes in a flat arena,
//! and the full-recompute refresh algorithm that drives them (SPEC_FULL §4.3).

pub(crate) mod alpha;
pub(crate) mod beta;
pub mod binding;
pub mod network;

pub use network::{CConstraint, CTerm, NodeId, ReteGraph, TerminalNode, Tuple};
