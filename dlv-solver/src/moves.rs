use dlv_core::models::{Action, Problem, Solution, TaskId};
use rand::Rng;

/// A local modification of a solution.
///
/// Moves are drawn uniformly at random and only describe *where* to change a
/// solution; whether the result is feasible is decided by [`Move::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Move {
    /// Move a task's pickup/delivery pair to another vehicle
    Transfer {
        task: TaskId,
        from: usize,
        to: usize,
        pickup: usize,
        delivery: usize,
    },
    /// Exchange two actions within one route
    Swap { vehicle: usize, i: usize, j: usize },
    /// Move one action to another position within one route
    Relocate {
        vehicle: usize,
        from: usize,
        to: usize,
    },
}

// Draw an index in 0..n different from `except`; requires n >= 2
fn other_than<R: Rng>(rng: &mut R, n: usize, except: usize) -> usize {
    let k = rng.random_range(0..n - 1);
    if k >= except { k + 1 } else { k }
}

impl Move {
    /// Draw a random move applicable to the shape of `solution`, if any
    pub(crate) fn random<R: Rng>(solution: &Solution, rng: &mut R) -> Option<Self> {
        let routes = solution.routes();
        let busy = routes
            .iter()
            .enumerate()
            .filter(|(_, route)| !route.is_empty())
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        if busy.is_empty() {
            return None;
        }
        let vehicle = busy[rng.random_range(0..busy.len())];
        let len = routes[vehicle].len();

        match rng.random_range(0..3u8) {
            0 => {
                if routes.len() < 2 {
                    return None;
                }
                let nth = rng.random_range(0..len / 2);
                let task = routes[vehicle].tasks().nth(nth)?;
                let to = other_than(rng, routes.len(), vehicle);
                let target = routes[to].len();
                let pickup = rng.random_range(0..=target);
                let delivery = rng.random_range(pickup + 1..=target + 1);
                Some(Self::Transfer {
                    task,
                    from: vehicle,
                    to,
                    pickup,
                    delivery,
                })
            }
            1 => {
                let i = rng.random_range(0..len);
                let j = other_than(rng, len, i);
                Some(Self::Swap {
                    vehicle,
                    i: i.min(j),
                    j: i.max(j),
                })
            }
            _ => {
                let from = rng.random_range(0..len);
                let to = other_than(rng, len, from);
                Some(Self::Relocate { vehicle, from, to })
            }
        }
    }

    /// Produce the neighbor reached by this move, or `None` if it breaks the
    /// capacity or precedence invariants. Only the touched routes are re-checked
    /// and re-costed.
    pub(crate) fn apply(self, solution: &Solution, problem: &Problem<'_>) -> Option<Solution> {
        let mut next = solution.clone();
        match self {
            Self::Transfer {
                task,
                from,
                to,
                pickup,
                delivery,
            } => {
                if !next.route_mut(from).extract_task(task) {
                    return None;
                }
                next.route_mut(to).splice_task(task, pickup, delivery);
                // Removing a task only lowers the load along the source route
                if !problem.route_feasible(to, next.route(to)) {
                    return None;
                }
                for index in [from, to] {
                    let cost = problem.route_cost(index, next.route(index));
                    next.set_route_cost(index, cost);
                }
            }
            Self::Swap { vehicle, i, j } => {
                let actions = next.route(vehicle).actions();
                // Swapping the two halves of one task can never be feasible
                if let (Action::Pickup(a), Action::Delivery(b)) = (actions[i], actions[j]) {
                    if a == b {
                        return None;
                    }
                }
                next.route_mut(vehicle).swap(i, j);
                if !problem.route_feasible(vehicle, next.route(vehicle)) {
                    return None;
                }
                let cost = problem.route_cost(vehicle, next.route(vehicle));
                next.set_route_cost(vehicle, cost);
            }
            Self::Relocate { vehicle, from, to } => {
                next.route_mut(vehicle).relocate(from, to);
                if !problem.route_feasible(vehicle, next.route(vehicle)) {
                    return None;
                }
                let cost = problem.route_cost(vehicle, next.route(vehicle));
                next.set_route_cost(vehicle, cost);
            }
        }
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlv_core::models::{DistanceTable, Location, Route, Task, TaskSet, Vehicle};
    use rand::{SeedableRng, rngs::StdRng};

    struct Fixture {
        topology: DistanceTable,
        vehicles: Vec<Vehicle>,
        tasks: TaskSet,
    }

    fn fixture() -> Fixture {
        Fixture {
            topology: DistanceTable::from_matrix(vec![
                vec![0.0, 3.0, 4.0],
                vec![3.0, 0.0, 5.0],
                vec![4.0, 5.0, 0.0],
            ])
            .unwrap(),
            vehicles: vec![
                Vehicle::new(0, Location(0), 10, 1.0),
                Vehicle::new(1, Location(1), 4, 1.0),
            ],
            tasks: TaskSet::from_tasks([
                Task::new(1, Location(0), Location(2), 3),
                Task::new(2, Location(2), Location(1), 6),
            ]),
        }
    }

    fn sequential(problem: &Problem<'_>) -> Solution {
        problem.evaluate(vec![
            Route::from_actions(vec![
                Action::Pickup(TaskId(1)),
                Action::Delivery(TaskId(1)),
                Action::Pickup(TaskId(2)),
                Action::Delivery(TaskId(2)),
            ]),
            Route::new(),
        ])
    }

    #[test]
    fn test_transfer_respects_capacity() {
        let f = fixture();
        let problem = Problem::new(&f.vehicles, &f.tasks, &f.topology);
        let solution = sequential(&problem);

        let light = Move::Transfer {
            task: TaskId(1),
            from: 0,
            to: 1,
            pickup: 0,
            delivery: 1,
        };
        let next = light.apply(&solution, &problem).unwrap();
        assert_eq!(next.vehicle_of(TaskId(1)), Some(1));
        assert_eq!(problem.check(&next), Ok(()));
        // Vehicle 0 now starts at A: A -> C -> B = 4 + 5; vehicle 1: B -> A -> C = 3 + 4
        assert_eq!(next.route_costs(), &[9.0, 7.0]);

        let heavy = Move::Transfer {
            task: TaskId(2),
            from: 0,
            to: 1,
            pickup: 0,
            delivery: 1,
        };
        assert_eq!(heavy.apply(&solution, &problem), None);
    }

    #[test]
    fn test_intra_route_moves() {
        let f = fixture();
        let problem = Problem::new(&f.vehicles, &f.tasks, &f.topology);
        let solution = sequential(&problem);

        // Delivering before picking up
        let swap = Move::Swap {
            vehicle: 0,
            i: 0,
            j: 1,
        };
        assert_eq!(swap.apply(&solution, &problem), None);

        // Pick up task 2 first: both carried at once (9 <= 10)
        let relocate = Move::Relocate {
            vehicle: 0,
            from: 2,
            to: 0,
        };
        let next = relocate.apply(&solution, &problem).unwrap();
        assert_eq!(problem.check(&next), Ok(()));
        assert_eq!(next.route(0).actions()[0], Action::Pickup(TaskId(2)));
    }

    #[test]
    fn test_random_moves_are_well_formed() {
        let f = fixture();
        let problem = Problem::new(&f.vehicles, &f.tasks, &f.topology);
        let solution = sequential(&problem);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..500 {
            let Some(candidate) = Move::random(&solution, &mut rng) else {
                continue;
            };
            if let Some(next) = candidate.apply(&solution, &problem) {
                assert_eq!(problem.check(&next), Ok(()));
                let recosted = problem.evaluate(next.routes().to_vec());
                assert_eq!(next.total_cost(), recosted.total_cost());
            }
        }

        assert_eq!(Move::random(&Solution::empty(2), &mut rng), None);
    }
}
