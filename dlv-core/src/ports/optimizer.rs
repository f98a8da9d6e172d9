use crate::models::{Budget, PlanningError, Problem, Solution, SolutionPool};

/// Interface for route optimizers.
///
/// An optimizer takes a fleet snapshot and a task set, and within the given
/// budget produces a pool of feasible solutions covering every task, sorted by
/// ascending cost.
pub trait Optimizer {
    /// The configuration type for this optimizer
    type Settings;

    /// Create a new instance with the provided settings
    fn new(settings: Self::Settings) -> Self;

    /// Search for low-cost feasible solutions.
    ///
    /// # Arguments
    ///
    /// - `problem`: the fleet, the tasks to cover, and the distance model
    /// - `budget`: the wall-clock and iteration limits of this run
    /// - `warm_start`: an optional solution to start from; it is ignored unless
    ///   it is feasible for, and covers exactly the tasks of, `problem`
    ///
    /// # Errors
    ///
    /// [`PlanningError::InfeasibleTask`] when some task exceeds every capacity,
    /// [`PlanningError::EmptyFleet`] when there are tasks but no vehicles.
    fn optimize(
        &self,
        problem: &Problem<'_>,
        budget: Budget,
        warm_start: Option<&Solution>,
    ) -> Result<SolutionPool, PlanningError>;
}
