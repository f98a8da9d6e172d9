use crate::models::{
    FeasibilityError, Route, Solution, Task, TaskId, TaskSet, Vehicle, VehiclePlan,
};
use crate::ports::Topology;
use rustc_hash::FxHashSet;

/// The input of a single planning call: a fleet snapshot, the tasks to cover
/// in full, and the distance model.
///
/// Routes of every [`Solution`] built through a problem are index-aligned with
/// its vehicle slice.
#[derive(Clone, Copy)]
pub struct Problem<'a> {
    vehicles: &'a [Vehicle],
    tasks: &'a TaskSet,
    topology: &'a dyn Topology,
}

impl<'a> Problem<'a> {
    /// Bundle the inputs of a planning call
    pub fn new(vehicles: &'a [Vehicle], tasks: &'a TaskSet, topology: &'a dyn Topology) -> Self {
        Self {
            vehicles,
            tasks,
            topology,
        }
    }

    /// The fleet
    pub fn vehicles(&self) -> &'a [Vehicle] {
        self.vehicles
    }

    /// The tasks to cover
    pub fn tasks(&self) -> &'a TaskSet {
        self.tasks
    }

    /// The distance model
    pub fn topology(&self) -> &'a dyn Topology {
        self.topology
    }

    /// Look up a task by id
    pub fn task(&self, id: TaskId) -> Option<&'a Task> {
        self.tasks.get(&id)
    }

    /// Cost of `route` when driven by the vehicle at `index`
    pub fn route_cost(&self, index: usize, route: &Route) -> f64 {
        route.cost(&self.vehicles[index], self.tasks, self.topology)
    }

    /// Whether `route` is feasible for the vehicle at `index`
    pub fn route_feasible(&self, index: usize, route: &Route) -> bool {
        route.is_feasible(&self.vehicles[index], self.tasks)
    }

    /// Cost every route and assemble the solution
    pub fn evaluate(&self, routes: Vec<Route>) -> Solution {
        let costs = routes
            .iter()
            .enumerate()
            .map(|(index, route)| self.route_cost(index, route))
            .collect();
        Solution::from_parts(routes, costs)
    }

    /// Ensure every task can be carried by at least one vehicle.
    ///
    /// An empty task set is always servable, even without vehicles.
    pub fn check_servable(&self) -> Result<(), PlanningError> {
        let Some(heaviest) = self.tasks.heaviest() else {
            return Ok(());
        };
        let capacity = self
            .vehicles
            .iter()
            .map(|vehicle| vehicle.capacity)
            .max()
            .ok_or(PlanningError::EmptyFleet {
                tasks: self.tasks.len(),
            })?;
        if heaviest.weight > capacity {
            return Err(PlanningError::InfeasibleTask {
                task: heaviest.id,
                weight: heaviest.weight,
                capacity,
            });
        }
        Ok(())
    }

    /// Check the feasibility and task coverage invariants of a solution:
    /// one route per vehicle, each route feasible for its vehicle, and every
    /// task served by exactly one route.
    pub fn check(&self, solution: &Solution) -> Result<(), FeasibilityError> {
        if solution.routes().len() != self.vehicles.len() {
            return Err(FeasibilityError::FleetMismatch {
                expected: self.vehicles.len(),
                found: solution.routes().len(),
            });
        }

        let mut served = FxHashSet::<TaskId>::default();
        for (vehicle, route) in self.vehicles.iter().zip(solution.routes()) {
            route.check(vehicle, self.tasks)?;
            for id in route.tasks() {
                if !served.insert(id) {
                    return Err(FeasibilityError::DuplicateAction(id));
                }
            }
        }

        match self.tasks.keys().find(|id| !served.contains(id)) {
            Some(id) => Err(FeasibilityError::Unassigned(*id)),
            None => Ok(()),
        }
    }

    /// Expand a solution into one host-facing plan per vehicle, in fleet order
    pub fn plans(&self, solution: &Solution) -> Vec<VehiclePlan> {
        self.vehicles
            .iter()
            .zip(solution.routes())
            .map(|(vehicle, route)| VehiclePlan::build(vehicle, route, self.tasks, self.topology))
            .collect()
    }
}

/// Failures of a planning call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanningError {
    /// A task is heavier than the largest vehicle; no plan can ever serve it
    #[error("task {task} weighs {weight}, more than the largest capacity {capacity}")]
    InfeasibleTask {
        /// The unservable task
        task: TaskId,
        /// Its weight
        weight: u32,
        /// The largest capacity in the fleet
        capacity: u32,
    },
    /// Tasks were requested from a fleet without vehicles
    #[error("cannot serve {tasks} tasks without vehicles")]
    EmptyFleet {
        /// The number of tasks to cover
        tasks: usize,
    },
    /// The optimizer produced no feasible solution at all
    #[error("the solution pool is empty")]
    PoolEmpty,
}
