use crate::models::Location;

/// The read-only distance model supplied by the topology collaborator.
///
/// `distance` sits on the optimizer's hot path and must be a direct lookup.
/// It is expected to be symmetric and non-negative.
pub trait Topology {
    /// The travel distance between two cities
    fn distance(&self, from: Location, to: Location) -> f64;

    /// The cities traversed when driving from `from` to `to`, excluding
    /// `from` and including `to`. Empty when both are the same city.
    ///
    /// The default treats every pair of cities as directly connected.
    fn path(&self, from: Location, to: Location) -> Vec<Location> {
        if from == to { Vec::new() } else { vec![to] }
    }

    /// The number of cities
    fn locations(&self) -> usize;
}

impl<T: Topology + ?Sized> Topology for &T {
    fn distance(&self, from: Location, to: Location) -> f64 {
        (**self).distance(from, to)
    }

    fn path(&self, from: Location, to: Location) -> Vec<Location> {
        (**self).path(from, to)
    }

    fn locations(&self) -> usize {
        (**self).locations()
    }
}
