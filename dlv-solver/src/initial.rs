use dlv_core::models::{Action, Problem, Route, Solution, Task};

/// Put every task on the largest vehicle, one after the other.
///
/// Tasks are chained greedily: the next task is the one whose pickup is
/// nearest to where the previous delivery ended. Since each task is delivered
/// before the next is picked up, the load never exceeds the heaviest single
/// task, so the result is feasible whenever the problem is servable.
pub(crate) fn initial_solution(problem: &Problem<'_>) -> Solution {
    let vehicles = problem.vehicles();
    let mut routes = vec![Route::new(); vehicles.len()];

    // The first vehicle of maximal capacity
    let Some(designated) = (0..vehicles.len()).reduce(|best, i| {
        if vehicles[i].capacity > vehicles[best].capacity {
            i
        } else {
            best
        }
    }) else {
        return Solution::empty(0);
    };

    let topology = problem.topology();
    let mut pending: Vec<&Task> = problem.tasks().values().collect();
    let mut actions = Vec::with_capacity(pending.len() * 2);
    let mut here = vehicles[designated].current;

    while !pending.is_empty() {
        let mut nearest = 0;
        for (i, task) in pending.iter().enumerate().skip(1) {
            let best = topology.distance(here, pending[nearest].pickup);
            if topology.distance(here, task.pickup) < best {
                nearest = i;
            }
        }
        let task = pending.remove(nearest);
        actions.push(Action::Pickup(task.id));
        actions.push(Action::Delivery(task.id));
        here = task.delivery;
    }

    routes[designated] = Route::from_actions(actions);
    problem.evaluate(routes)
}
