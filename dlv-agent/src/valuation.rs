use dlv_core::{
    models::{Budget, PlanningError, Problem, Route, Solution, Task},
    ports::{Optimizer, ValuationState, ValuationTable},
};
use std::time::Instant;
use tracing::{Level, event};

/// The outcome of pricing one candidate task
#[derive(Clone, Debug)]
pub struct Valuation {
    /// The best solution found for the owned tasks plus the candidate
    pub solution: Solution,
    /// `solution` cost minus the committed baseline cost
    pub marginal_cost: f64,
    /// The marginal cost after the valuation table, if any, had its say
    pub adjusted_cost: f64,
    /// The price offered to the host
    pub bid: u64,
}

/// Convert a cost figure into a bid: truncate toward zero, fold the sign,
/// and halve with integer division.
///
/// A negative marginal cost means the candidate makes the existing plan
/// cheaper; it is priced by its magnitude like any other.
pub fn bid_from_cost(cost: f64) -> u64 {
    // `as` saturates on overflow and maps NaN to zero
    (cost.trunc() as i64).unsigned_abs() / 2
}

/// Insert `task` into `baseline` at the cheapest feasible position of any
/// vehicle, leaving every other action where it was.
///
/// `problem` must already contain `task`. Returns `None` when no vehicle can
/// take the task on top of its current route.
///
/// The scan stops early once `deadline` passes, keeping the cheapest position
/// found so far; `None` if none was found by then.
pub fn cheapest_insertion(
    problem: &Problem<'_>,
    baseline: &Solution,
    task: &Task,
    deadline: Option<Instant>,
) -> Option<Solution> {
    let overdue = || deadline.is_some_and(|deadline| Instant::now() >= deadline);
    if baseline.routes().len() != problem.vehicles().len() {
        return None;
    }

    let mut best: Option<(usize, Route, f64)> = None;
    'vehicles: for (index, vehicle) in problem.vehicles().iter().enumerate() {
        if task.weight > vehicle.capacity {
            continue;
        }
        let route = baseline.route(index);
        let before = baseline.route_costs()[index];
        for pickup in 0..=route.len() {
            if overdue() {
                event!(Level::DEBUG, vehicle = index, pickup, "insertion scan cut short");
                break 'vehicles;
            }
            for delivery in pickup + 1..=route.len() + 1 {
                let Ok(candidate) =
                    route.insert_task(task, pickup, delivery, vehicle, problem.tasks())
                else {
                    continue;
                };
                let cost = problem.route_cost(index, &candidate);
                let improves = match &best {
                    Some((_, _, best_cost)) => cost - before < *best_cost,
                    None => true,
                };
                if improves {
                    best = Some((index, candidate, cost - before));
                }
            }
        }
    }

    best.map(|(index, route, _)| {
        let mut solution = problem.evaluate(baseline.routes().to_vec());
        let cost = problem.route_cost(index, &route);
        solution.replace_route(index, route, cost);
        solution
    })
}

/// Price `task` against the committed `baseline`.
///
/// `problem` covers the owned tasks plus `task`. The optimizer is warm-started
/// from the cheapest insertion of `task` into `baseline`, so the marginal cost
/// never exceeds that of the plain insertion. When `table` is given, it
/// adjusts the marginal cost for `state` before the bid is derived.
///
/// The insertion scan and the search share `budget`: pin its start with
/// [`Budget::started_at`] to charge the caller's own work to it as well.
///
/// # Errors
///
/// Whatever the optimizer reports, notably [`PlanningError::InfeasibleTask`]
/// when `task` exceeds every capacity.
pub fn quote<O: Optimizer>(
    optimizer: &O,
    problem: &Problem<'_>,
    budget: Budget,
    baseline: &Solution,
    task: &Task,
    table: Option<(&dyn ValuationTable, &ValuationState)>,
) -> Result<Valuation, PlanningError> {
    problem.check_servable()?;

    let now = Instant::now();
    let budget = budget.started_at(budget.origin(now));
    let deadline = budget.soft_deadline(now);
    let warm_start = cheapest_insertion(problem, baseline, task, Some(deadline));
    let solution = optimizer
        .optimize(problem, budget, warm_start.as_ref())?
        .into_best()?;

    let marginal_cost = solution.total_cost() - baseline.total_cost();
    let adjusted_cost = match table {
        Some((table, state)) => table.adjust(state, marginal_cost),
        None => marginal_cost,
    };
    let bid = bid_from_cost(adjusted_cost);

    event!(
        Level::DEBUG,
        task = %task.id,
        with = solution.total_cost(),
        without = baseline.total_cost(),
        marginal_cost,
        adjusted_cost,
        bid,
    );

    Ok(Valuation {
        solution,
        marginal_cost,
        adjusted_cost,
        bid,
    })
}
