/// How the competition priced the most recent round, relative to us
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum CompetitorSignal {
    /// No completed round yet, or no competitor bid
    #[default]
    Unknown,
    /// A competitor bid below us
    Cheaper,
    /// Every competitor bid at or above us
    Dearer,
}

/// The abstraction of the auction state a valuation table is keyed by.
#[derive(Clone, Debug, PartialEq)]
pub struct ValuationState {
    /// How many tasks the agent currently owns
    pub load: usize,
    /// How the competition priced the last round
    pub competitor: CompetitorSignal,
    /// How many auction rounds are still expected
    pub remaining: usize,
    /// The discounted expected number of future tasks departing from the
    /// candidate's delivery city, per the task distribution
    pub outlook: f64,
}

/// A precomputed state-action lookup that biases the raw marginal cost.
///
/// Building such a table (e.g. by value iteration over the task distribution)
/// happens offline; the agent only queries it.
pub trait ValuationTable {
    /// Turn a raw marginal cost into the cost figure the bid is derived from
    fn adjust(&self, state: &ValuationState, marginal_cost: f64) -> f64;
}
