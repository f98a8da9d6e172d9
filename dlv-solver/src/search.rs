use crate::{initial::initial_solution, moves::Move};
use dlv_core::{
    models::{Budget, PlanningError, Problem, SearchConfig, Solution, SolutionPool},
    ports::Optimizer,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::{Duration, Instant};
use tracing::{Level, event, span};

/// Stochastic local search over pickup-and-delivery routes.
///
/// Each run starts from a feasible solution (the warm start if usable,
/// otherwise every task chained on the largest vehicle) and iterates:
///
/// 1. draw `neighbors_per_iteration` random moves and keep the feasible results,
/// 2. with probability `explore_probability` step to a random one of them,
///    otherwise to the cheapest,
/// 3. offer the new current solution to the bounded pool,
///
/// until the budget's soft deadline or iteration cap is reached. The clock is
/// only read every `deadline_check_interval` iterations.
pub struct LocalSearch {
    settings: SearchConfig,
}

impl Default for LocalSearch {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

/// Counters describing a finished run
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchStats {
    /// Completed search iterations
    pub iterations: u64,
    /// Moves drawn
    pub proposed: u64,
    /// Moves discarded for breaking capacity or precedence
    pub infeasible: u64,
    /// Accepted steps that increased the current cost
    pub uphill: u64,
    /// Wall-clock time of the run
    pub elapsed: Duration,
}

impl LocalSearch {
    /// The tunables this search runs with
    pub fn settings(&self) -> &SearchConfig {
        &self.settings
    }

    fn rng(&self) -> StdRng {
        match self.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Run the search, reporting the counters alongside the pool
    pub fn search(
        &self,
        problem: &Problem<'_>,
        budget: Budget,
        warm_start: Option<&Solution>,
    ) -> Result<(SolutionPool, SearchStats), PlanningError> {
        problem.check_servable()?;

        let mut pool = SolutionPool::new(self.settings.pool_size);
        let mut stats = SearchStats::default();

        if problem.tasks().is_empty() {
            pool.insert(Solution::empty(problem.vehicles().len()));
            return Ok((pool, stats));
        }

        let span = span!(
            Level::DEBUG,
            "local_search",
            tasks = problem.tasks().len(),
            vehicles = problem.vehicles().len()
        );
        let _entered = span.enter();

        let start = Instant::now();
        let soft_deadline = budget.soft_deadline(start);
        let hard_deadline = budget.hard_deadline(start);

        let mut current = match warm_start {
            Some(solution) if problem.check(solution).is_ok() => {
                // Vehicle positions may have moved since the warm start was costed
                problem.evaluate(solution.routes().to_vec())
            }
            Some(_) => {
                event!(Level::DEBUG, "warm start does not fit the problem, ignoring it");
                initial_solution(problem)
            }
            None => initial_solution(problem),
        };
        pool.insert(current.clone());

        let mut rng = self.rng();
        let check_every = u64::from(self.settings.deadline_check_interval.max(1));
        let width = self.settings.neighbors_per_iteration.max(1);
        let mut neighbors = Vec::with_capacity(width);

        loop {
            if budget.exhausted(stats.iterations) {
                break;
            }
            if stats.iterations % check_every == 0 && Instant::now() >= soft_deadline {
                break;
            }
            stats.iterations += 1;

            neighbors.clear();
            for _ in 0..width {
                let Some(candidate) = Move::random(&current, &mut rng) else {
                    continue;
                };
                stats.proposed += 1;
                match candidate.apply(&current, problem) {
                    Some(neighbor) => neighbors.push(neighbor),
                    None => stats.infeasible += 1,
                }
            }
            if neighbors.is_empty() {
                continue;
            }

            let next = select(&mut neighbors, &mut rng, self.settings.explore_probability);
            if next.total_cost() > current.total_cost() {
                stats.uphill += 1;
            }
            pool.insert(next.clone());
            current = next;
        }

        stats.elapsed = start.elapsed();
        if Instant::now() > hard_deadline {
            event!(
                Level::WARN,
                elapsed_ms = budget.origin(start).elapsed().as_millis() as u64,
                limit_ms = budget.time.as_millis() as u64,
                "local search overran its deadline"
            );
        }

        event!(
            Level::DEBUG,
            iterations = stats.iterations,
            proposed = stats.proposed,
            infeasible = stats.infeasible,
            uphill = stats.uphill,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            best = pool.best().map(Solution::total_cost).unwrap_or(f64::NAN),
            retained = pool.len(),
        );

        Ok((pool, stats))
    }
}

// Almost always the cheapest neighbor (first among ties); occasionally any.
fn select<R: Rng>(neighbors: &mut Vec<Solution>, rng: &mut R, explore: f64) -> Solution {
    let index = if rng.random_bool(explore) {
        rng.random_range(0..neighbors.len())
    } else {
        neighbors
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cost().total_cmp(&b.total_cost()))
            .map_or(0, |(index, _)| index)
    };
    neighbors.swap_remove(index)
}

impl Optimizer for LocalSearch {
    type Settings = SearchConfig;

    fn new(settings: Self::Settings) -> Self {
        Self { settings }
    }

    fn optimize(
        &self,
        problem: &Problem<'_>,
        budget: Budget,
        warm_start: Option<&Solution>,
    ) -> Result<SolutionPool, PlanningError> {
        self.search(problem, budget, warm_start)
            .map(|(pool, _)| pool)
    }
}
