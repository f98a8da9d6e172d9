use dlv_core::ports::{CompetitorSignal, ValuationState, ValuationTable};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// A precomputed state-action table, loaded from a JSON artifact.
///
/// States are bucketed as `(load / load_bucket, competitor, outlook /
/// outlook_bucket)`; each known bucket carries a multiplicative factor
/// applied to the marginal cost, unknown buckets use `default_factor`.
///
/// ```json
/// {
///   "default_factor": 1.0,
///   "load_bucket": 5,
///   "outlook_bucket": 0.5,
///   "entries": [
///     { "load": 0, "competitor": "cheaper", "outlook": 0, "factor": 0.8 }
///   ]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct StateActionTable {
    default_factor: f64,
    load_bucket: usize,
    outlook_bucket: f64,
    factors: FxHashMap<Bucket, f64>,
}

type Bucket = (usize, CompetitorSignal, usize);

impl StateActionTable {
    /// A table that applies the same factor everywhere
    pub fn uniform(factor: f64) -> Result<Self, TableError> {
        Self::try_from(RawTable {
            default_factor: factor,
            ..Default::default()
        })
    }

    /// Parse a JSON artifact
    pub fn from_reader(reader: impl Read) -> Result<Self, TableError> {
        serde_json::from_reader(reader).map_err(|error| TableError::Malformed(error.to_string()))
    }

    /// The bucket a state falls into
    pub fn bucket(&self, state: &ValuationState) -> (usize, CompetitorSignal, usize) {
        let outlook = (state.outlook.max(0.0) / self.outlook_bucket).floor() as usize;
        (state.load / self.load_bucket, state.competitor, outlook)
    }

    /// The factor applied in `state`
    pub fn factor(&self, state: &ValuationState) -> f64 {
        self.factors
            .get(&self.bucket(state))
            .copied()
            .unwrap_or(self.default_factor)
    }
}

impl ValuationTable for StateActionTable {
    fn adjust(&self, state: &ValuationState, marginal_cost: f64) -> f64 {
        marginal_cost * self.factor(state)
    }
}

/// The serialized form of [`StateActionTable`]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTable {
    /// Factor of every bucket without an entry
    pub default_factor: f64,
    /// Width of a load bucket, in tasks
    pub load_bucket: usize,
    /// Width of an outlook bucket
    pub outlook_bucket: f64,
    /// The known buckets
    pub entries: Vec<RawEntry>,
}

impl Default for RawTable {
    fn default() -> Self {
        Self {
            default_factor: 1.0,
            load_bucket: 1,
            outlook_bucket: 1.0,
            entries: Vec::new(),
        }
    }
}

/// One bucket of a [`RawTable`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawEntry {
    /// Load bucket index
    pub load: usize,
    /// Competitor signal
    #[serde(default)]
    pub competitor: CompetitorSignal,
    /// Outlook bucket index
    #[serde(default)]
    pub outlook: usize,
    /// The multiplicative factor
    pub factor: f64,
}

impl TryFrom<RawTable> for StateActionTable {
    type Error = TableError;

    fn try_from(value: RawTable) -> Result<Self, Self::Error> {
        let valid = |factor: f64| factor.is_finite() && factor >= 0.0;

        if !valid(value.default_factor) {
            return Err(TableError::InvalidFactor(value.default_factor));
        }
        if value.load_bucket == 0 {
            return Err(TableError::InvalidBucket("load_bucket"));
        }
        if !(value.outlook_bucket.is_finite() && value.outlook_bucket > 0.0) {
            return Err(TableError::InvalidBucket("outlook_bucket"));
        }

        let mut factors = FxHashMap::default();
        for entry in value.entries {
            if !valid(entry.factor) {
                return Err(TableError::InvalidFactor(entry.factor));
            }
            let key = (entry.load, entry.competitor, entry.outlook);
            if factors.insert(key, entry.factor).is_some() {
                return Err(TableError::DuplicateEntry {
                    load: entry.load,
                    competitor: entry.competitor,
                    outlook: entry.outlook,
                });
            }
        }

        Ok(Self {
            default_factor: value.default_factor,
            load_bucket: value.load_bucket,
            outlook_bucket: value.outlook_bucket,
            factors,
        })
    }
}

impl From<StateActionTable> for RawTable {
    fn from(value: StateActionTable) -> Self {
        let mut entries = value
            .factors
            .into_iter()
            .map(|((load, competitor, outlook), factor)| RawEntry {
                load,
                competitor,
                outlook,
                factor,
            })
            .collect::<Vec<_>>();
        // Stable output regardless of hashing
        entries.sort_by_key(|entry| (entry.load, entry.competitor as u8, entry.outlook));
        Self {
            default_factor: value.default_factor,
            load_bucket: value.load_bucket,
            outlook_bucket: value.outlook_bucket,
            entries,
        }
    }
}

/// Errors raised while loading a state-action table
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    /// The artifact is not valid JSON of the expected shape
    #[error("malformed table: {0}")]
    Malformed(String),
    /// A factor is negative or not finite
    #[error("invalid factor {0}")]
    InvalidFactor(f64),
    /// A bucket width is not positive
    #[error("`{0}` must be positive")]
    InvalidBucket(&'static str),
    /// Two entries describe the same bucket
    #[error("duplicate entry for load {load}, competitor {competitor:?}, outlook {outlook}")]
    DuplicateEntry {
        /// Load bucket index
        load: usize,
        /// Competitor signal
        competitor: CompetitorSignal,
        /// Outlook bucket index
        outlook: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(load: usize, competitor: CompetitorSignal, outlook: f64) -> ValuationState {
        ValuationState {
            load,
            competitor,
            remaining: 10,
            outlook,
        }
    }

    #[test]
    fn test_lookup() {
        let table = StateActionTable::from_reader(
            r#"{
                "default_factor": 1.0,
                "load_bucket": 5,
                "outlook_bucket": 0.5,
                "entries": [
                    { "load": 0, "competitor": "cheaper", "outlook": 0, "factor": 0.8 },
                    { "load": 1, "competitor": "dearer", "outlook": 2, "factor": 1.5 }
                ]
            }"#
            .as_bytes(),
        )
        .unwrap();

        assert_eq!(table.factor(&state(4, CompetitorSignal::Cheaper, 0.4)), 0.8);
        assert_eq!(table.factor(&state(5, CompetitorSignal::Cheaper, 0.4)), 1.0);
        assert_eq!(table.factor(&state(7, CompetitorSignal::Dearer, 1.2)), 1.5);
        assert_eq!(table.adjust(&state(9, CompetitorSignal::Dearer, 1.0), 10.0), 15.0);
        assert_eq!(table.adjust(&state(0, CompetitorSignal::Unknown, 0.0), 10.0), 10.0);
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert_eq!(
            StateActionTable::uniform(-1.0),
            Err(TableError::InvalidFactor(-1.0))
        );
        assert!(matches!(
            StateActionTable::from_reader(r#"{"load_bucket": 0}"#.as_bytes()),
            Err(TableError::Malformed(_))
        ));
        assert!(matches!(
            StateActionTable::from_reader(
                r#"{"entries": [{"load": 0, "factor": 1.0}, {"load": 0, "factor": 2.0}]}"#
                    .as_bytes()
            ),
            Err(TableError::Malformed(_))
        ));
        assert!(matches!(
            StateActionTable::from_reader("[".as_bytes()),
            Err(TableError::Malformed(_))
        ));
    }

    #[test]
    fn test_serializes_back() {
        let table = StateActionTable::uniform(0.9).unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["default_factor"], 0.9);
        assert_eq!(json["entries"], serde_json::json!([]));
    }
}
