use crate::models::Location;
use crate::ports::TaskDistribution;

/// Dense per-city-pair statistics of future task arrivals.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProbabilityTable {
    locations: usize,
    probability: Vec<f64>,
    weight: Vec<f64>,
    reward: Vec<f64>,
}

impl ProbabilityTable {
    /// Every ordered pair of distinct cities is equally likely
    pub fn uniform(locations: usize, weight: f64, reward: f64) -> Self {
        let pairs = locations * locations.saturating_sub(1);
        let p = if pairs > 0 { 1.0 / pairs as f64 } else { 0.0 };
        let mut probability = vec![p; locations * locations];
        for i in 0..locations {
            probability[i * locations + i] = 0.0;
        }
        Self {
            locations,
            probability,
            weight: vec![weight; locations * locations],
            reward: vec![reward; locations * locations],
        }
    }

    /// Build from explicit row-major matrices, returning `None` if any has the wrong size
    pub fn from_matrices(
        locations: usize,
        probability: Vec<f64>,
        weight: Vec<f64>,
        reward: Vec<f64>,
    ) -> Option<Self> {
        let n = locations * locations;
        (probability.len() == n && weight.len() == n && reward.len() == n).then_some(Self {
            locations,
            probability,
            weight,
            reward,
        })
    }

    fn cell(&self, from: Location, to: Location) -> Option<usize> {
        (from.0 < self.locations && to.0 < self.locations).then(|| from.0 * self.locations + to.0)
    }
}

impl TaskDistribution for ProbabilityTable {
    fn probability(&self, from: Location, to: Location) -> f64 {
        self.cell(from, to).map_or(0.0, |i| self.probability[i])
    }

    fn weight(&self, from: Location, to: Location) -> f64 {
        self.cell(from, to).map_or(0.0, |i| self.weight[i])
    }

    fn reward(&self, from: Location, to: Location) -> f64 {
        self.cell(from, to).map_or(0.0, |i| self.reward[i])
    }
}
