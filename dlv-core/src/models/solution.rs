use crate::models::{Route, TaskId};

/// A complete assignment of routes to the fleet, with its derived cost.
///
/// Routes are index-aligned with the vehicle slice of the [`Problem`](crate::models::Problem)
/// that produced them. The total cost is the sum of the per-route costs, each
/// being the route distance times the vehicle's cost per unit of distance.
///
/// Equality is structural: two solutions are equal when their routes are,
/// regardless of how their costs were accumulated.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    routes: Vec<Route>,
    costs: Vec<f64>,
    total_cost: f64,
}

impl Solution {
    /// The trivial solution: every vehicle stays put, at zero cost
    pub fn empty(vehicles: usize) -> Self {
        Self {
            routes: vec![Route::new(); vehicles],
            costs: vec![0.0; vehicles],
            total_cost: 0.0,
        }
    }

    /// Assemble a solution from routes and their precomputed costs
    pub fn from_parts(routes: Vec<Route>, costs: Vec<f64>) -> Self {
        debug_assert_eq!(routes.len(), costs.len());
        let total_cost = costs.iter().sum();
        Self {
            routes,
            costs,
            total_cost,
        }
    }

    /// The routes, one per vehicle
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The route of the vehicle at `index`
    pub fn route(&self, index: usize) -> &Route {
        &self.routes[index]
    }

    /// The cost of each route
    pub fn route_costs(&self) -> &[f64] {
        &self.costs
    }

    /// The sum of all route costs
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Replace one route and its cost, keeping the total consistent
    pub fn replace_route(&mut self, index: usize, route: Route, cost: f64) {
        self.routes[index] = route;
        self.costs[index] = cost;
        self.total_cost = self.costs.iter().sum();
    }

    /// Mutable access to a route. The caller must follow up with
    /// [`Solution::set_route_cost`] once the route is re-evaluated.
    pub fn route_mut(&mut self, index: usize) -> &mut Route {
        &mut self.routes[index]
    }

    /// Record the re-evaluated cost of a route
    pub fn set_route_cost(&mut self, index: usize, cost: f64) {
        self.costs[index] = cost;
        self.total_cost = self.costs.iter().sum();
    }

    /// Every task served by this solution
    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.routes.iter().flat_map(|route| route.tasks())
    }

    /// The index of the vehicle serving the task
    pub fn vehicle_of(&self, task: TaskId) -> Option<usize> {
        self.routes.iter().position(|route| route.contains(task))
    }

    /// Whether no vehicle does anything
    pub fn is_idle(&self) -> bool {
        self.routes.iter().all(Route::is_empty)
    }
}

impl PartialEq for Solution {
    fn eq(&self, other: &Self) -> bool {
        self.routes == other.routes
    }
}

impl Eq for Solution {}
