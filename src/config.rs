//! Engine-wide configuration (SPEC_FULL §4.6 "Ambient stack", §7 "Resource model").

/// Tuning knobs for one [`crate::engine::Engine`].
///
/// The matching algorithm itself is fully determined by SPEC_FULL — there is
/// nothing here that changes matching semantics, only operational limits an
/// embedder may want as a safety net in front of (or instead of) a host gas
/// meter.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of rule firings [`crate::driver::fire_all_rules`] will
    /// perform in one call before returning
    /// [`crate::error::EngineError::IterationCapExceeded`]. `None` means no
    /// cap; the engine itself never loops forever on a correctly compiled
    /// rule set (SPEC_FULL §7), but an embedder without its own gas meter may
    /// still want a hard backstop against a pathological rule set that keeps
    /// reintroducing its own trigger fact.
    pub iteration_cap: Option<u64>,

    /// Whether `factDelete` of an unknown handle is silently ignored
    /// (`true`, the default) or reported as
    /// [`crate::error::EngineError::UnknownHandle`] (`false`, strict mode),
    /// per SPEC_FULL §4.2.
    pub permissive_delete: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            iteration_cap: None,
            permissive_delete: true,
        }
    }
}

impl EngineConfig {
    /// The default configuration: no iteration cap, permissive delete.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an iteration cap.
    pub fn with_iteration_cap(mut self, cap: u64) -> Self {
        self.iteration_cap = Some(cap);
        self
    }

    /// Switch `factDelete` of an unknown handle from silently ignored to an
    /// [`crate::error::EngineError::UnknownHandle`] error (SPEC_FULL §4.2
    /// "strict mode").
    pub fn with_strict_delete(mut self) -> Self {
        self.permissive_delete = false;
        self
    }
}
