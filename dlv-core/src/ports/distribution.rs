use crate::models::Location;

/// Expectations about future task announcements.
///
/// Only the learned valuation layer consumes this collaborator.
pub trait TaskDistribution {
    /// The probability that the next task goes from `from` to `to`
    fn probability(&self, from: Location, to: Location) -> f64;

    /// The expected weight of such a task
    fn weight(&self, from: Location, to: Location) -> f64;

    /// The expected reward of such a task
    fn reward(&self, from: Location, to: Location) -> f64;
}
