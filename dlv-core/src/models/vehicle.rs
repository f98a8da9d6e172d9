use crate::models::{Location, VehicleId};

/// A vehicle of the agent's fleet.
///
/// The optimizer treats a vehicle as a fixed snapshot: its routes start from
/// `current`, which only changes as plans execute on the host.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    /// The vehicle identifier
    pub id: VehicleId,
    /// The depot the vehicle started from
    pub home: Location,
    /// Where the vehicle is right now
    pub current: Location,
    /// The maximum load carried at any instant
    pub capacity: u32,
    /// The currency cost of travelling one unit of distance
    pub cost_per_km: f64,
}

impl Vehicle {
    /// Create a vehicle parked at its home location
    pub fn new(id: impl Into<VehicleId>, home: Location, capacity: u32, cost_per_km: f64) -> Self {
        Self {
            id: id.into(),
            home,
            current: home,
            capacity,
            cost_per_km,
        }
    }
}
