use super::SettingsArgs;
use crate::scenario::Scenario;
use dlv_core::{
    models::{Problem, Solution, VehiclePlan},
    ports::{ConfigProvider as _, Optimizer as _},
};
use dlv_solver::LocalSearch;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub plans: Vec<VehiclePlan>,
    pub cost: f64,
    /// The costs of the runner-up solutions kept by the search
    pub alternatives: Vec<f64>,
    pub iterations: u64,
    pub elapsed_ms: u64,
}

pub fn run(scenario: Scenario, settings: &SettingsArgs) -> anyhow::Result<PlanReport> {
    let world = scenario.build()?;
    let config = settings.source(world.config.clone()).load()?;

    let tasks = world.tasks();
    let problem = Problem::new(&world.vehicles, &tasks, &world.topology);
    let search = LocalSearch::new(config.search.clone());
    let (pool, stats) = search.search(&problem, config.plan_budget(), None)?;
    let best = pool.best()?;

    Ok(PlanReport {
        plans: problem.plans(best),
        cost: best.total_cost(),
        alternatives: pool.iter().skip(1).map(Solution::total_cost).collect(),
        iterations: stats.iterations,
        elapsed_ms: stats.elapsed.as_millis() as u64,
    })
}
