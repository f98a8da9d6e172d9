/**
 * The stochastic local search implementing the optimizer port.
 */
mod search;
pub use search::{LocalSearch, SearchStats};

/**
 * Building blocks of the search: the starting point and the neighborhood.
 */
mod initial;
mod moves;
