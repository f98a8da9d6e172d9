#![warn(missing_docs)]
//! The bidding side of a delivery-task auction agent.
//!
//! [`AuctionSession`] drives the host protocol (setup, repeated
//! announce/bid/result rounds, then a final plan) on top of any
//! [`Optimizer`](dlv_core::ports::Optimizer). Prices come from the marginal
//! cost of serving one more task, see [`valuation`].

mod error;
pub use error::AgentError;

mod session;
pub use session::{AuctionSession, DefaultSession, RoundHistory, SessionState};

/// Loading the agent configuration from files and the environment.
pub mod settings;

/// Precomputed state-action lookups that bias bids.
pub mod table;

/// Turning marginal costs into bids.
pub mod valuation;
