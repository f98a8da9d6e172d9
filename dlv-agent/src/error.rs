use crate::SessionState;
use dlv_core::models::{ConfigurationError, FeasibilityError, PlanningError};

/// Everything that can go wrong while serving the host
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// The configuration could not be obtained; the session stays idle
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// No plan can be produced for the requested task set
    #[error(transparent)]
    Planning(#[from] PlanningError),
    /// A produced solution broke the route invariants
    #[error(transparent)]
    Feasibility(#[from] FeasibilityError),
    /// The host called out of protocol order
    #[error("`{operation}` is not valid while the session is {state}")]
    InvalidState {
        /// The rejected callback
        operation: &'static str,
        /// The state the session was in
        state: SessionState,
    },
}
