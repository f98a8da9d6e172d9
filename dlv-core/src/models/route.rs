use crate::models::{Action, Task, TaskId, TaskSet, Vehicle, VehicleId};
use crate::ports::Topology;
use rustc_hash::FxHashSet;

/// The ordered sequence of actions a single vehicle performs.
///
/// A route on its own is only a sequence; feasibility is always relative to a
/// vehicle (its capacity) and a task set (weights and locations), see [`Route::check`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Route(Vec<Action>);

impl Route {
    /// An empty route
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an action sequence without validating it
    pub fn from_actions(actions: Vec<Action>) -> Self {
        Self(actions)
    }

    /// The actions in execution order
    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    /// The number of actions (twice the number of tasks for a valid route)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the route performs nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The tasks served by this route, in pickup order
    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.0.iter().filter_map(|action| match action {
            Action::Pickup(id) => Some(*id),
            Action::Delivery(_) => None,
        })
    }

    /// Whether any action of this route refers to the task
    pub fn contains(&self, task: TaskId) -> bool {
        self.0.iter().any(|action| action.task() == task)
    }

    /// Return a copy of this route with the task inserted so that its pickup
    /// lands at `pickup` and its delivery at `delivery` in the resulting route.
    ///
    /// The result is validated against the vehicle and task set.
    pub fn insert_task(
        &self,
        task: &Task,
        pickup: usize,
        delivery: usize,
        vehicle: &Vehicle,
        tasks: &TaskSet,
    ) -> Result<Route, FeasibilityError> {
        if self.contains(task.id) {
            return Err(FeasibilityError::DuplicateAction(task.id));
        }
        if pickup >= delivery || delivery > self.len() + 1 {
            return Err(FeasibilityError::InvalidInsertion {
                task: task.id,
                pickup,
                delivery,
                len: self.len(),
            });
        }
        let mut route = self.clone();
        route.splice_task(task.id, pickup, delivery);
        route.check(vehicle, tasks)?;
        Ok(route)
    }

    /// Return a copy of this route without any action referring to the task
    pub fn remove_task(&self, task: TaskId) -> Route {
        let mut route = self.clone();
        route.extract_task(task);
        route
    }

    /// In-place insertion used by the search moves. The caller guarantees
    /// `pickup < delivery <= len + 1` and re-checks feasibility afterwards.
    pub fn splice_task(&mut self, task: TaskId, pickup: usize, delivery: usize) {
        debug_assert!(pickup < delivery && delivery <= self.0.len() + 1);
        self.0.insert(pickup, Action::Pickup(task));
        self.0.insert(delivery, Action::Delivery(task));
    }

    /// In-place removal of both actions of a task, reporting whether anything was removed
    pub fn extract_task(&mut self, task: TaskId) -> bool {
        let before = self.0.len();
        self.0.retain(|action| action.task() != task);
        self.0.len() != before
    }

    /// Exchange the actions at positions `i` and `j`
    pub fn swap(&mut self, i: usize, j: usize) {
        self.0.swap(i, j);
    }

    /// Move the action at `from` so that it ends up at position `to`
    pub fn relocate(&mut self, from: usize, to: usize) {
        let action = self.0.remove(from);
        self.0.insert(to, action);
    }

    /// Walk the route once, tracking carried weight, and report the first violation.
    ///
    /// A route is feasible iff the load never exceeds the vehicle capacity at any
    /// prefix, every task is picked up before it is delivered, and every task
    /// appears exactly once as a pickup and exactly once as a delivery.
    pub fn check(&self, vehicle: &Vehicle, tasks: &TaskSet) -> Result<(), FeasibilityError> {
        let mut load: i64 = 0;
        let mut carried = FxHashSet::<TaskId>::default();
        let mut delivered = FxHashSet::<TaskId>::default();

        for (position, action) in self.0.iter().enumerate() {
            let id = action.task();
            let task = tasks.get(&id).ok_or(FeasibilityError::UnknownTask(id))?;
            match action {
                Action::Pickup(_) => {
                    if !carried.insert(id) {
                        return Err(FeasibilityError::DuplicateAction(id));
                    }
                }
                Action::Delivery(_) => {
                    if !carried.contains(&id) {
                        return Err(FeasibilityError::DeliveryBeforePickup(id));
                    }
                    if !delivered.insert(id) {
                        return Err(FeasibilityError::DuplicateAction(id));
                    }
                }
            }
            load += action.load_delta(task);
            if load > vehicle.capacity as i64 {
                return Err(FeasibilityError::CapacityExceeded {
                    vehicle: vehicle.id,
                    position,
                    load: load as u64,
                    capacity: vehicle.capacity,
                });
            }
        }

        if let Some(id) = carried.iter().find(|id| !delivered.contains(id)) {
            return Err(FeasibilityError::MissingDelivery(*id));
        }
        Ok(())
    }

    /// Convenience wrapper around [`Route::check`]
    pub fn is_feasible(&self, vehicle: &Vehicle, tasks: &TaskSet) -> bool {
        self.check(vehicle, tasks).is_ok()
    }

    /// The travelled distance, starting from the vehicle's current location.
    ///
    /// Actions referring to tasks absent from `tasks` are skipped; feasibility
    /// checks are where unknown tasks are reported.
    pub fn distance(&self, vehicle: &Vehicle, tasks: &TaskSet, topology: &dyn Topology) -> f64 {
        let mut here = vehicle.current;
        let mut total = 0.0;
        for action in self.0.iter() {
            if let Some(task) = tasks.get(&action.task()) {
                let next = action.location(task);
                total += topology.distance(here, next);
                here = next;
            }
        }
        total
    }

    /// The travelled distance converted to currency by the vehicle's cost factor
    pub fn cost(&self, vehicle: &Vehicle, tasks: &TaskSet, topology: &dyn Topology) -> f64 {
        self.distance(vehicle, tasks, topology) * vehicle.cost_per_km
    }
}

/// The ways a route or solution can violate the capacity and precedence invariants
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeasibilityError {
    /// The carried load exceeds the vehicle capacity after an action
    #[error("vehicle {vehicle} carries {load} > {capacity} after action {position}")]
    CapacityExceeded {
        /// The overloaded vehicle
        vehicle: VehicleId,
        /// The offending action index
        position: usize,
        /// The load after that action
        load: u64,
        /// The vehicle capacity
        capacity: u32,
    },
    /// A delivery appears before the matching pickup
    #[error("task {0} is delivered before it is picked up")]
    DeliveryBeforePickup(TaskId),
    /// A task is picked up but never delivered
    #[error("task {0} is picked up but never delivered")]
    MissingDelivery(TaskId),
    /// A task's pickup or delivery appears more than once
    #[error("task {0} appears more than once")]
    DuplicateAction(TaskId),
    /// A route refers to a task outside the planning task set
    #[error("task {0} is not part of the task set")]
    UnknownTask(TaskId),
    /// A task of the planning task set is not served by any route
    #[error("task {0} is not assigned to any vehicle")]
    Unassigned(TaskId),
    /// The requested insertion positions do not describe a valid pickup/delivery pair
    #[error("cannot insert task {task} at ({pickup}, {delivery}) into a route of {len} actions")]
    InvalidInsertion {
        /// The task being inserted
        task: TaskId,
        /// The requested pickup position
        pickup: usize,
        /// The requested delivery position
        delivery: usize,
        /// The route length before insertion
        len: usize,
    },
    /// A solution does not have exactly one route per vehicle
    #[error("expected {expected} routes, found {found}")]
    FleetMismatch {
        /// The fleet size
        expected: usize,
        /// The number of routes
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    fn fixture() -> (Vehicle, TaskSet) {
        let vehicle = Vehicle::new(0, Location(0), 10, 1.0);
        let tasks = TaskSet::from_tasks([
            Task::new(1, Location(0), Location(1), 6),
            Task::new(2, Location(1), Location(2), 5),
        ]);
        (vehicle, tasks)
    }

    #[test]
    fn test_insert_into_empty() {
        let (vehicle, tasks) = fixture();
        let route = Route::new()
            .insert_task(&tasks[&TaskId(1)], 0, 1, &vehicle, &tasks)
            .unwrap();
        assert_eq!(
            route.actions(),
            &[Action::Pickup(TaskId(1)), Action::Delivery(TaskId(1))]
        );
    }

    #[test]
    fn test_insert_rejects_overload() {
        let (vehicle, tasks) = fixture();
        let route = Route::new()
            .insert_task(&tasks[&TaskId(1)], 0, 1, &vehicle, &tasks)
            .unwrap();

        // Carrying both at once needs 11 > 10
        let result = route.insert_task(&tasks[&TaskId(2)], 1, 3, &vehicle, &tasks);
        assert!(matches!(
            result,
            Err(FeasibilityError::CapacityExceeded { load: 11, .. })
        ));

        // Sequentially is fine
        let result = route.insert_task(&tasks[&TaskId(2)], 2, 3, &vehicle, &tasks);
        assert!(result.is_ok());
    }

    #[test]
    fn test_insert_rejects_bad_indices() {
        let (vehicle, tasks) = fixture();
        let result = Route::new().insert_task(&tasks[&TaskId(1)], 1, 1, &vehicle, &tasks);
        assert!(matches!(
            result,
            Err(FeasibilityError::InvalidInsertion { .. })
        ));
        let result = Route::new().insert_task(&tasks[&TaskId(1)], 0, 2, &vehicle, &tasks);
        assert!(matches!(
            result,
            Err(FeasibilityError::InvalidInsertion { .. })
        ));
    }

    #[test]
    fn test_precedence() {
        let (vehicle, tasks) = fixture();
        let route =
            Route::from_actions(vec![Action::Delivery(TaskId(1)), Action::Pickup(TaskId(1))]);
        assert_eq!(
            route.check(&vehicle, &tasks),
            Err(FeasibilityError::DeliveryBeforePickup(TaskId(1)))
        );

        let route = Route::from_actions(vec![Action::Pickup(TaskId(1))]);
        assert_eq!(
            route.check(&vehicle, &tasks),
            Err(FeasibilityError::MissingDelivery(TaskId(1)))
        );
    }

    #[test]
    fn test_remove_task() {
        let (vehicle, tasks) = fixture();
        let route = Route::from_actions(vec![
            Action::Pickup(TaskId(1)),
            Action::Delivery(TaskId(1)),
            Action::Pickup(TaskId(2)),
            Action::Delivery(TaskId(2)),
        ]);
        assert!(route.is_feasible(&vehicle, &tasks));

        let route = route.remove_task(TaskId(1));
        assert_eq!(route.tasks().collect::<Vec<_>>(), vec![TaskId(2)]);
        assert!(route.is_feasible(&vehicle, &tasks));
    }

    #[test]
    fn test_relocate_and_swap() {
        let mut route = Route::from_actions(vec![
            Action::Pickup(TaskId(1)),
            Action::Delivery(TaskId(1)),
            Action::Pickup(TaskId(2)),
        ]);
        route.relocate(2, 0);
        assert_eq!(route.actions()[0], Action::Pickup(TaskId(2)));
        route.swap(0, 2);
        assert_eq!(route.actions()[2], Action::Pickup(TaskId(2)));
        assert_eq!(route.actions()[0], Action::Delivery(TaskId(1)));
    }
}
