use thiserror::Error;

use crate::fact::FactHandle;

/// Errors raised while lowering a rule's LHS/RHS into the Rete network, at contract
/// compile time. None of these can occur once a contract has compiled successfully.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A pattern names a fact type the enclosing contract never declared.
    #[error("unknown fact type: {0}")]
    UnknownFactType(String),

    /// A constraint references an identifier that is bound nowhere visible to it.
    #[error("unbound identifier `{identifier}` in rule `{rule}`")]
    UnboundIdentifier {
        /// Name of the offending rule.
        rule: String,
        /// The identifier that resolved to nothing.
        identifier: String,
    },

    /// A constraint in pattern *k* names a binding introduced later in the same
    /// pattern's field-expression list. Evaluation order within one pattern is
    /// left-to-right, so this is rejected rather than given an ambiguous meaning.
    #[error("forward reference to `{identifier}` in rule `{rule}`, pattern {pattern_index}")]
    ForwardReference {
        /// Name of the offending rule.
        rule: String,
        /// Index of the pattern containing the forward reference.
        pattern_index: usize,
        /// The identifier referenced before its binding.
        identifier: String,
    },

    /// `factInsert` was given an operand that does not denote a storage-located
    /// l-value (only the host compiler can determine this; the engine models the
    /// rejection so RHS validation has a complete error surface).
    #[error("factInsert operand in rule `{rule}` is not a storage reference")]
    NonStorageOperand {
        /// Name of the offending rule.
        rule: String,
    },

    /// An RHS mutates a field of a pattern-bound identifier and never calls `update`
    /// on that identifier before the RHS ends.
    #[error("rule `{rule}` mutates `{binding}` without a subsequent `update({binding})`")]
    MissingUpdate {
        /// Name of the offending rule.
        rule: String,
        /// The binding whose mutation was not followed by `update`.
        binding: String,
    },

    /// `update` named an identifier no pattern in this rule's LHS bound.
    #[error("rule `{rule}` calls update on unbound identifier `{identifier}`")]
    UpdateOfUnboundIdentifier {
        /// Name of the offending rule.
        rule: String,
        /// The identifier passed to `update`.
        identifier: String,
    },

    /// Two rules in the same contract share a name.
    #[error("duplicate rule name: {0}")]
    DuplicateRuleName(String),
}

/// Errors raised by the engine's operators at runtime.
#[derive(Error, Debug)]
pub enum EngineError {
    /// `factInsert` was given a storage reference already present in the fact table.
    #[error("duplicate fact: storage reference already inserted")]
    DuplicateFact,

    /// `factDelete` (in strict mode) or a tuple reference named a handle the fact
    /// table does not currently hold.
    #[error("unknown fact handle: {0:?}")]
    UnknownHandle(FactHandle),

    /// The firing driver exceeded the configured iteration cap (`EngineConfig`).
    /// The engine itself imposes no such bound; this only fires when an embedder
    /// opts into one as a safety valve in place of a host gas meter.
    #[error("fireAllRules exceeded the configured iteration cap ({0})")]
    IterationCapExceeded(u64),

    /// A host-level abort surfaced from an RHS action (e.g. a failed external
    /// effect). The firing session stops immediately; no partial state from the
    /// aborted firing is retained.
    #[error("host abort during rule firing: {0}")]
    HostAbort(String),
}

/// Result alias for compile-time operations.
pub type CompileResult<T> = std::result::Result<T, CompileError>;

/// Result alias for runtime engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
