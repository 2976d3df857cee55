//! Tuning knobs shared by the builder and the mutator.

/// Default bound on 2-opt improvement passes.
pub const DEFAULT_MAX_IMPROVEMENT_PASSES: usize = 50;

/// Configuration for [`GreedyRouteBuilder`](crate::GreedyRouteBuilder) and
/// [`RouteMutator`](crate::RouteMutator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Upper bound on full 2-opt sweeps over a sequence.
    ///
    /// Each sweep tries every segment reversal once; the search stops early
    /// when a sweep finds no improving move. Zero disables local search.
    pub max_improvement_passes: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_improvement_passes: DEFAULT_MAX_IMPROVEMENT_PASSES,
        }
    }
}

impl PlannerConfig {
    /// Return a copy with a different pass bound.
    #[must_use]
    pub const fn with_max_improvement_passes(mut self, passes: usize) -> Self {
        self.max_improvement_passes = passes;
        self
    }
}
