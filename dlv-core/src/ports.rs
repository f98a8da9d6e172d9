mod behavior;
mod config;
mod distribution;
mod optimizer;
mod topology;
mod valuation;

pub use behavior::AuctionBehavior;
pub use config::ConfigProvider;
pub use distribution::TaskDistribution;
pub use optimizer::Optimizer;
pub use topology::Topology;
pub use valuation::{CompetitorSignal, ValuationState, ValuationTable};
