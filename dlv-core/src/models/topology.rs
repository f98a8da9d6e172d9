use crate::models::Location;
use crate::ports::Topology;

/// An undirected road between two cities
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Road {
    /// One end of the road
    pub from: Location,
    /// The other end of the road
    pub to: Location,
    /// The length of the road
    pub distance: f64,
}

/// A precomputed all-pairs shortest-path table over a road graph.
///
/// Distances live in a dense row-major matrix so that a lookup is a single
/// index computation; a parallel next-hop matrix reconstructs the paths used
/// to expand plans into moves.
#[derive(Clone, Debug)]
pub struct DistanceTable {
    names: Vec<String>,
    distances: Vec<f64>,
    next: Vec<usize>,
}

impl DistanceTable {
    /// Build the table from named cities (indexed by position) and undirected roads
    pub fn new(names: Vec<String>, roads: &[Road]) -> Result<Self, TopologyError> {
        let n = names.len();
        let mut direct = vec![f64::INFINITY; n * n];
        for Road { from, to, distance } in roads {
            for location in [from, to] {
                if location.0 >= n {
                    return Err(TopologyError::UnknownLocation(*location));
                }
            }
            if !(distance.is_finite() && *distance >= 0.0) {
                return Err(TopologyError::InvalidDistance {
                    from: *from,
                    to: *to,
                    distance: *distance,
                });
            }
            // Parallel roads: keep the shortest
            for (a, b) in [(from.0, to.0), (to.0, from.0)] {
                let cell = &mut direct[a * n + b];
                *cell = cell.min(*distance);
            }
        }
        Self::close(names, direct)
    }

    /// Build the table from a square matrix of direct distances, where
    /// `f64::INFINITY` marks a missing edge. Cities are named by their index.
    pub fn from_matrix(matrix: Vec<Vec<f64>>) -> Result<Self, TopologyError> {
        let n = matrix.len();
        let mut direct = Vec::with_capacity(n * n);
        for (i, row) in matrix.into_iter().enumerate() {
            if row.len() != n {
                return Err(TopologyError::NotSquare {
                    row: i,
                    len: row.len(),
                    expected: n,
                });
            }
            for (j, distance) in row.into_iter().enumerate() {
                if distance.is_nan() || distance < 0.0 {
                    return Err(TopologyError::InvalidDistance {
                        from: Location(i),
                        to: Location(j),
                        distance,
                    });
                }
                direct.push(distance);
            }
        }
        Self::close((0..n).map(|i| i.to_string()).collect(), direct)
    }

    // Floyd–Warshall over the direct distances, recording next hops
    fn close(names: Vec<String>, mut distances: Vec<f64>) -> Result<Self, TopologyError> {
        let n = names.len();
        let mut next = vec![usize::MAX; n * n];
        for i in 0..n {
            for j in 0..n {
                if distances[i * n + j].is_finite() {
                    next[i * n + j] = j;
                }
            }
            distances[i * n + i] = 0.0;
            next[i * n + i] = i;
        }

        for k in 0..n {
            for i in 0..n {
                let ik = distances[i * n + k];
                if !ik.is_finite() {
                    continue;
                }
                for j in 0..n {
                    let through = ik + distances[k * n + j];
                    if through < distances[i * n + j] {
                        distances[i * n + j] = through;
                        next[i * n + j] = next[i * n + k];
                    }
                }
            }
        }

        if let Some(cell) = distances.iter().position(|d| !d.is_finite()) {
            return Err(TopologyError::Disconnected {
                from: Location(cell / n),
                to: Location(cell % n),
            });
        }

        Ok(Self {
            names,
            distances,
            next,
        })
    }

    /// The name of a city
    pub fn name(&self, location: Location) -> Option<&str> {
        self.names.get(location.0).map(String::as_str)
    }

    /// Find a city by name
    pub fn locate(&self, name: &str) -> Option<Location> {
        self.names.iter().position(|n| n == name).map(Location)
    }
}

impl Topology for DistanceTable {
    fn distance(&self, from: Location, to: Location) -> f64 {
        self.distances[from.0 * self.names.len() + to.0]
    }

    fn path(&self, from: Location, to: Location) -> Vec<Location> {
        let n = self.names.len();
        let mut hops = Vec::new();
        let mut here = from.0;
        while here != to.0 {
            here = self.next[here * n + to.0];
            hops.push(Location(here));
        }
        hops
    }

    fn locations(&self) -> usize {
        self.names.len()
    }
}

/// Errors raised while building a distance table
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopologyError {
    /// A road refers to a city that does not exist
    #[error("unknown location {0}")]
    UnknownLocation(Location),
    /// A road length is negative, NaN, or infinite
    #[error("invalid distance {distance} between {from} and {to}")]
    InvalidDistance {
        /// One end
        from: Location,
        /// The other end
        to: Location,
        /// The offending length
        distance: f64,
    },
    /// Two cities cannot reach each other
    #[error("no path from {from} to {to}")]
    Disconnected {
        /// The origin
        from: Location,
        /// The unreachable destination
        to: Location,
    },
    /// A matrix row has the wrong length
    #[error("row {row} has {len} entries, expected {expected}")]
    NotSquare {
        /// The row index
        row: usize,
        /// Its length
        len: usize,
        /// The number of rows
        expected: usize,
    },
}
