mod action;
mod budget;
mod config;
mod distribution;
mod ids;
mod map;
mod plan;
mod pool;
mod problem;
mod route;
mod solution;
mod task;
mod topology;
mod vehicle;

pub use action::Action;
pub use budget::Budget;
pub use config::{
    AgentConfig, ConfigurationError, RawConfig, RawSearch, RawTimeouts, SearchConfig, Timeouts,
};
pub use distribution::ProbabilityTable;
pub use ids::{AgentId, Location, TaskId, VehicleId};
pub use map::Map;
pub use plan::{PlanStep, VehiclePlan};
pub use pool::SolutionPool;
pub use problem::{PlanningError, Problem};
pub use route::{FeasibilityError, Route};
pub use solution::Solution;
pub use task::{Task, TaskSet};
pub use topology::{DistanceTable, Road, TopologyError};
pub use vehicle::Vehicle;

/// The bid returned when the agent cannot serve a task at any price.
///
/// It is the largest representable bid, so a host that awards the lowest bid
/// never hands the task to this agent.
pub const DECLINE_BID: u64 = u64::MAX;
