use crate::models::{AgentId, Task, TaskSet, Vehicle, VehiclePlan};
use crate::ports::{ConfigProvider, TaskDistribution, Topology};

/// The callback surface the auction host drives.
///
/// The host invokes these synchronously and sequentially: `setup` once, then
/// any number of `ask_price`/`auction_result` rounds, then `plan` once. The
/// agent never calls back into the host.
pub trait AuctionBehavior {
    /// The topology collaborator kept for the whole session
    type Topology: Topology;
    /// The task-distribution collaborator kept for the whole session
    type Distribution: TaskDistribution;
    /// Error type for protocol or planning failures
    type Error: std::error::Error;

    /// Read the configuration and reset the session to an empty baseline
    fn setup(
        &mut self,
        topology: Self::Topology,
        distribution: Self::Distribution,
        config: &impl ConfigProvider,
    ) -> Result<(), Self::Error>;

    /// Price an announced task
    fn ask_price(&mut self, task: &Task) -> Result<u64, Self::Error>;

    /// Learn the outcome of the round for `task`. `bids` holds one entry per
    /// agent, indexed by agent id, `None` where an agent did not bid.
    fn auction_result(
        &mut self,
        task: &Task,
        winner: AgentId,
        bids: &[Option<u64>],
    ) -> Result<(), Self::Error>;

    /// Produce one plan per vehicle covering every task in `tasks`
    fn plan(
        &mut self,
        vehicles: &[Vehicle],
        tasks: &TaskSet,
    ) -> Result<Vec<VehiclePlan>, Self::Error>;
}
