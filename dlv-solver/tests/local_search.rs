use dlv_core::{
    models::{
        Budget, DistanceTable, Location, PlanningError, Problem, SearchConfig, Solution, Task,
        TaskId, TaskSet, Vehicle,
    },
    ports::Optimizer,
};
use approx::assert_abs_diff_eq;
use dlv_solver::LocalSearch;
use rand::{Rng, SeedableRng, rngs::StdRng};
use rstest::*;
use rstest_reuse::{self, *};
use std::time::{Duration, Instant};

use all_seeds::all_seeds;

struct Instance {
    topology: DistanceTable,
    vehicles: Vec<Vehicle>,
    tasks: TaskSet,
}

impl Instance {
    fn problem(&self) -> Problem<'_> {
        Problem::new(&self.vehicles, &self.tasks, &self.topology)
    }
}

// Cities scattered on a grid with euclidean distances, a mixed fleet, and
// tasks whose weights exercise the capacities
#[fixture]
fn instance() -> Instance {
    let mut rng = StdRng::seed_from_u64(99);
    let points = (0..12)
        .map(|_| (rng.random_range(0..100) as f64, rng.random_range(0..100) as f64))
        .collect::<Vec<_>>();
    let matrix = points
        .iter()
        .map(|(x0, y0)| {
            points
                .iter()
                .map(|(x1, y1)| ((x0 - x1).powi(2) + (y0 - y1).powi(2)).sqrt())
                .collect()
        })
        .collect();

    let vehicles = vec![
        Vehicle::new(0, Location(0), 10, 5.0),
        Vehicle::new(1, Location(5), 25, 3.0),
        Vehicle::new(2, Location(11), 15, 4.0),
    ];
    let tasks = TaskSet::from_tasks((0..14).map(|id| {
        let pickup = rng.random_range(0..12);
        let delivery = (pickup + rng.random_range(1..12)) % 12;
        Task::new(
            id,
            Location(pickup),
            Location(delivery),
            rng.random_range(1..=12),
        )
    }));

    Instance {
        topology: DistanceTable::from_matrix(matrix).unwrap(),
        vehicles,
        tasks,
    }
}

fn seeded(seed: u64) -> LocalSearch {
    LocalSearch::new(SearchConfig {
        seed: Some(seed),
        pool_size: 20,
        ..Default::default()
    })
}

fn iterations(n: u64) -> Budget {
    Budget::new(Duration::from_secs(60), Duration::ZERO).with_max_iterations(Some(n))
}

#[apply(all_seeds)]
#[rstest]
fn every_pooled_solution_is_feasible_and_complete(seed: u64, instance: Instance) {
    let problem = instance.problem();
    let pool = seeded(seed).optimize(&problem, iterations(400), None).unwrap();

    assert!(!pool.is_empty());
    for solution in pool.iter() {
        assert_eq!(problem.check(solution), Ok(()));
        for id in instance.tasks.keys() {
            assert_eq!(solution.routes().iter().filter(|r| r.contains(*id)).count(), 1);
        }
    }
}

#[apply(all_seeds)]
#[rstest]
fn pool_is_sorted_distinct_and_bounded(seed: u64, instance: Instance) {
    let problem = instance.problem();
    let pool = seeded(seed).optimize(&problem, iterations(400), None).unwrap();

    assert!(pool.len() <= 20);
    let solutions = pool.iter().collect::<Vec<_>>();
    for pair in solutions.windows(2) {
        assert!(pair[0].total_cost() <= pair[1].total_cost());
    }
    for (i, a) in solutions.iter().enumerate() {
        for b in &solutions[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[apply(all_seeds)]
#[rstest]
fn longer_runs_never_end_worse(seed: u64, instance: Instance) {
    let problem = instance.problem();
    let search = seeded(seed);

    let short = search.optimize(&problem, iterations(150), None).unwrap();
    let long = search.optimize(&problem, iterations(300), None).unwrap();
    assert!(long.best().unwrap().total_cost() <= short.best().unwrap().total_cost());
}

#[rstest]
fn fixed_seed_is_reproducible(instance: Instance) {
    let problem = instance.problem();
    let a = seeded(5).optimize(&problem, iterations(200), None).unwrap();
    let b = seeded(5).optimize(&problem, iterations(200), None).unwrap();
    assert_eq!(a.best().unwrap(), b.best().unwrap());
    assert_eq!(a.len(), b.len());
}

#[rstest]
fn search_improves_on_the_starting_point(instance: Instance) {
    let problem = instance.problem();
    let (pool, stats) = seeded(11).search(&problem, iterations(500), None).unwrap();

    assert_eq!(stats.iterations, 500);
    assert!(stats.proposed > 0);
    let worst = pool.iter().last().unwrap().total_cost();
    assert!(pool.best().unwrap().total_cost() < worst);
}

#[rstest]
fn empty_task_set_is_trivial(instance: Instance) {
    let tasks = TaskSet::default();
    let problem = Problem::new(&instance.vehicles, &tasks, &instance.topology);
    let (pool, stats) = seeded(1).search(&problem, iterations(100), None).unwrap();

    assert_eq!(stats.iterations, 0);
    assert_eq!(pool.len(), 1);
    let best = pool.best().unwrap();
    assert_eq!(best.total_cost(), 0.0);
    assert_eq!(best.routes().len(), 3);
    assert!(best.is_idle());
}

#[rstest]
fn overweight_task_is_surfaced(instance: Instance) {
    let mut tasks = instance.tasks.clone();
    tasks.add(Task::new(100, Location(1), Location(2), 26));
    let problem = Problem::new(&instance.vehicles, &tasks, &instance.topology);

    assert_eq!(
        seeded(1).optimize(&problem, iterations(10), None).err(),
        Some(PlanningError::InfeasibleTask {
            task: TaskId(100),
            weight: 26,
            capacity: 25
        })
    );
}

#[rstest]
fn warm_start_is_never_beaten_by_the_pool(instance: Instance) {
    let problem = instance.problem();
    let search = seeded(3);
    let first = search
        .optimize(&problem, iterations(300), None)
        .unwrap()
        .into_best()
        .unwrap();

    let second = search
        .optimize(&problem, iterations(50), Some(&first))
        .unwrap();
    assert!(second.best().unwrap().total_cost() <= first.total_cost());

    // A warm start that does not cover the task set is ignored
    let stale = Solution::empty(instance.vehicles.len());
    let pool = search.optimize(&problem, iterations(10), Some(&stale)).unwrap();
    assert_eq!(problem.check(pool.best().unwrap()), Ok(()));
}

#[rstest]
fn two_vehicles_single_task_finds_the_cheaper_vehicle() {
    // A=0, B=1, C=2 on a line; the small vehicle waits at A, the large one at C
    let topology = DistanceTable::from_matrix(vec![
        vec![0.0, 4.0, 10.0],
        vec![4.0, 0.0, 6.0],
        vec![10.0, 6.0, 0.0],
    ])
    .unwrap();
    let vehicles = vec![
        Vehicle::new(0, Location(0), 10, 1.0),
        Vehicle::new(1, Location(2), 20, 1.0),
    ];
    let tasks = TaskSet::from_tasks([Task::new(1, Location(0), Location(1), 5)]);
    let problem = Problem::new(&vehicles, &tasks, &topology);

    let best = seeded(1)
        .optimize(&problem, iterations(100), None)
        .unwrap()
        .into_best()
        .unwrap();
    assert_eq!(best.vehicle_of(TaskId(1)), Some(0));
    assert_abs_diff_eq!(best.total_cost(), 4.0);
}

#[rstest]
fn wall_clock_budget_is_respected(instance: Instance) {
    let problem = instance.problem();
    let search = LocalSearch::new(SearchConfig {
        seed: Some(8),
        ..Default::default()
    });
    let budget = Budget::new(Duration::from_millis(200), Duration::from_millis(60));

    let start = Instant::now();
    let (_, stats) = search.search(&problem, budget, None).unwrap();
    let elapsed = start.elapsed();

    assert!(stats.iterations > 0);
    assert!(elapsed >= Duration::from_millis(140));
    assert!(elapsed < Duration::from_millis(250));
}

#[rstest]
fn time_spent_before_the_run_counts_against_the_budget(instance: Instance) {
    let problem = instance.problem();
    let search = LocalSearch::new(SearchConfig {
        seed: Some(8),
        ..Default::default()
    });
    let started = Instant::now();
    std::thread::sleep(Duration::from_millis(50));

    // Only 40ms were granted, and they are already gone
    let budget = Budget::new(Duration::from_millis(60), Duration::from_millis(20))
        .started_at(started);
    let (pool, stats) = search.search(&problem, budget, None).unwrap();

    assert_eq!(stats.iterations, 0);
    assert_eq!(pool.len(), 1);
    let best = pool.best().unwrap();
    assert_eq!(problem.check(best), Ok(()));
}
