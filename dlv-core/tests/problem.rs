use dlv_core::models::{
    Action, DistanceTable, FeasibilityError, Location, PlanStep, PlanningError, Problem, Road,
    Route, Task, TaskId, TaskSet, Vehicle,
};
use rstest::*;

// A - B - C - D laid out on a line, one unit apart
#[fixture]
fn topology() -> DistanceTable {
    let names = ["A", "B", "C", "D"].map(String::from).to_vec();
    let roads = (0..3)
        .map(|i| Road {
            from: Location(i),
            to: Location(i + 1),
            distance: 1.0,
        })
        .collect::<Vec<_>>();
    DistanceTable::new(names, &roads).unwrap()
}

#[fixture]
fn vehicles() -> Vec<Vehicle> {
    vec![
        Vehicle::new(0, Location(0), 10, 2.0),
        Vehicle::new(1, Location(3), 20, 1.0),
    ]
}

#[fixture]
fn tasks() -> TaskSet {
    TaskSet::from_tasks([
        Task::new(1, Location(0), Location(2), 5),
        Task::new(2, Location(3), Location(1), 15),
    ])
}

fn pair(id: u32) -> [Action; 2] {
    [Action::Pickup(TaskId(id)), Action::Delivery(TaskId(id))]
}

#[rstest]
fn evaluates_per_vehicle_cost(topology: DistanceTable, vehicles: Vec<Vehicle>, tasks: TaskSet) {
    let problem = Problem::new(&vehicles, &tasks, &topology);
    let solution = problem.evaluate(vec![
        Route::from_actions(pair(1).to_vec()),
        Route::from_actions(pair(2).to_vec()),
    ]);

    // Vehicle 0: A -> A -> C = 2 units at 2.0; vehicle 1: D -> D -> B = 2 units at 1.0
    assert_eq!(solution.route_costs(), &[4.0, 2.0]);
    assert_eq!(solution.total_cost(), 6.0);
    assert_eq!(problem.check(&solution), Ok(()));
}

#[rstest]
fn detects_capacity_violation(topology: DistanceTable, vehicles: Vec<Vehicle>, tasks: TaskSet) {
    let problem = Problem::new(&vehicles, &tasks, &topology);
    let solution = problem.evaluate(vec![
        Route::from_actions([pair(1), pair(2)].concat()),
        Route::new(),
    ]);
    assert!(matches!(
        problem.check(&solution),
        Err(FeasibilityError::CapacityExceeded { position: 2, .. })
    ));
}

#[rstest]
fn detects_coverage_violations(topology: DistanceTable, vehicles: Vec<Vehicle>, tasks: TaskSet) {
    let problem = Problem::new(&vehicles, &tasks, &topology);

    let missing = problem.evaluate(vec![Route::from_actions(pair(1).to_vec()), Route::new()]);
    assert_eq!(
        problem.check(&missing),
        Err(FeasibilityError::Unassigned(TaskId(2)))
    );

    let twice = problem.evaluate(vec![
        Route::from_actions(pair(1).to_vec()),
        Route::from_actions([pair(1), pair(2)].concat()),
    ]);
    assert_eq!(
        problem.check(&twice),
        Err(FeasibilityError::DuplicateAction(TaskId(1)))
    );

    let short = problem.evaluate(vec![Route::new()]);
    assert_eq!(
        problem.check(&short),
        Err(FeasibilityError::FleetMismatch {
            expected: 2,
            found: 1
        })
    );
}

#[rstest]
fn reports_unservable_tasks(topology: DistanceTable, vehicles: Vec<Vehicle>) {
    let tasks = TaskSet::from_tasks([Task::new(9, Location(0), Location(1), 25)]);
    let problem = Problem::new(&vehicles, &tasks, &topology);
    assert_eq!(
        problem.check_servable(),
        Err(PlanningError::InfeasibleTask {
            task: TaskId(9),
            weight: 25,
            capacity: 20
        })
    );

    let problem = Problem::new(&[], &tasks, &topology);
    assert_eq!(
        problem.check_servable(),
        Err(PlanningError::EmptyFleet { tasks: 1 })
    );

    let empty = TaskSet::default();
    assert_eq!(Problem::new(&[], &empty, &topology).check_servable(), Ok(()));
}

#[rstest]
fn expands_plans_into_moves(topology: DistanceTable, vehicles: Vec<Vehicle>, tasks: TaskSet) {
    let problem = Problem::new(&vehicles, &tasks, &topology);
    let solution = problem.evaluate(vec![
        Route::new(),
        Route::from_actions([pair(2), pair(1)].concat()),
    ]);
    let plans = problem.plans(&solution);

    assert_eq!(plans.len(), 2);
    assert!(plans[0].steps.is_empty());
    assert_eq!(plans[0].cost, 0.0);

    // D: pickup 2, drive to B: deliver 2, drive to A: pickup 1, drive to C: deliver 1
    assert_eq!(
        plans[1].steps,
        vec![
            PlanStep::Pickup(TaskId(2)),
            PlanStep::Move(Location(2)),
            PlanStep::Move(Location(1)),
            PlanStep::Delivery(TaskId(2)),
            PlanStep::Move(Location(0)),
            PlanStep::Pickup(TaskId(1)),
            PlanStep::Move(Location(1)),
            PlanStep::Move(Location(2)),
            PlanStep::Delivery(TaskId(1)),
        ]
    );
    assert_eq!(plans[1].distance, 5.0);
    assert_eq!(plans[1].cost, 5.0);
}
