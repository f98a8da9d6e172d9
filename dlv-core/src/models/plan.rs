use crate::models::{Action, Location, Route, TaskId, TaskSet, Vehicle, VehicleId};
use crate::ports::Topology;

/// One instruction of a host-facing vehicle plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "step", content = "target", rename_all = "snake_case")
)]
pub enum PlanStep {
    /// Drive to an adjacent city
    Move(Location),
    /// Collect a parcel in the current city
    Pickup(TaskId),
    /// Drop a parcel in the current city
    Delivery(TaskId),
}

/// The final deliverable for one vehicle: its route, expanded hop by hop.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehiclePlan {
    /// The vehicle executing the plan
    pub vehicle: VehicleId,
    /// Where the plan starts
    pub start: Location,
    /// The route the plan was expanded from
    pub route: Route,
    /// The expanded steps
    pub steps: Vec<PlanStep>,
    /// The travelled distance
    pub distance: f64,
    /// The travelled distance times the vehicle cost factor
    pub cost: f64,
}

impl VehiclePlan {
    /// Expand a route into moves along the topology's paths, interleaved with
    /// the pickup and delivery actions.
    pub fn build(
        vehicle: &Vehicle,
        route: &Route,
        tasks: &TaskSet,
        topology: &dyn Topology,
    ) -> Self {
        let mut steps = Vec::with_capacity(route.len() * 2);
        let mut here = vehicle.current;

        for action in route.actions() {
            let Some(task) = tasks.get(&action.task()) else {
                continue;
            };
            let next = action.location(task);
            if next != here {
                steps.extend(topology.path(here, next).into_iter().map(PlanStep::Move));
                here = next;
            }
            steps.push(match action {
                Action::Pickup(id) => PlanStep::Pickup(*id),
                Action::Delivery(id) => PlanStep::Delivery(*id),
            });
        }

        let distance = route.distance(vehicle, tasks, topology);
        Self {
            vehicle: vehicle.id,
            start: vehicle.current,
            route: route.clone(),
            steps,
            distance,
            cost: distance * vehicle.cost_per_km,
        }
    }
}
