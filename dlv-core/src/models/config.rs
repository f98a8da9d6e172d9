use crate::models::Budget;
use std::time::Duration;

/// The host-imposed wall-clock limits of each callback
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timeouts {
    /// Limit for `setup`
    pub setup: Duration,
    /// Limit for `plan`
    pub plan: Duration,
    /// Limit for `ask_price`
    pub bid: Duration,
}

impl Timeouts {
    /// The same limit for every callback
    pub fn uniform(limit: Duration) -> Self {
        Self {
            setup: limit,
            plan: limit,
            bid: limit,
        }
    }
}

/// Tunables of the local-search optimizer
#[derive(Clone, Debug, PartialEq)]
pub struct SearchConfig {
    /// How many solutions the pool keeps (K)
    pub pool_size: usize,
    /// How early to stop before a host deadline
    pub safety_margin: Duration,
    /// How many candidate moves are drawn per iteration
    pub neighbors_per_iteration: usize,
    /// The probability of accepting a random neighbor instead of the cheapest
    pub explore_probability: f64,
    /// How many iterations pass between two clock reads
    pub deadline_check_interval: u32,
    /// An optional cap on iterations per run
    pub max_iterations: Option<u64>,
    /// A fixed seed for reproducible runs; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            pool_size: 100,
            safety_margin: Duration::from_millis(75),
            neighbors_per_iteration: 24,
            explore_probability: 0.05,
            deadline_check_interval: 16,
            max_iterations: None,
            seed: None,
        }
    }
}

/// The plain settings record the agent reads once at setup.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawConfig", into = "RawConfig")
)]
pub struct AgentConfig {
    /// Per-callback time limits
    pub timeouts: Timeouts,
    /// Discount applied to future rounds when estimating a task's outlook
    pub discount_factor: f64,
    /// Convergence threshold the valuation table was trained with
    pub convergence_threshold: f64,
    /// The expected number of auction rounds
    pub max_tasks: usize,
    /// Optimizer tunables
    pub search: SearchConfig,
}

impl AgentConfig {
    /// Default tunables around the given timeouts
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            timeouts,
            discount_factor: 0.95,
            convergence_threshold: 0.01,
            max_tasks: 50,
            search: SearchConfig::default(),
        }
    }

    /// Check every setting is within its admissible range
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, timeout) in [
            ("timeouts.setup", self.timeouts.setup),
            ("timeouts.plan", self.timeouts.plan),
            ("timeouts.bid", self.timeouts.bid),
        ] {
            if timeout.is_zero() {
                return Err(ConfigurationError::OutOfRange { name, value: 0.0 });
            }
        }
        if !(self.discount_factor > 0.0 && self.discount_factor < 1.0) {
            return Err(ConfigurationError::OutOfRange {
                name: "discount_factor",
                value: self.discount_factor,
            });
        }
        if !(self.convergence_threshold > 0.0) {
            return Err(ConfigurationError::OutOfRange {
                name: "convergence_threshold",
                value: self.convergence_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.search.explore_probability) {
            return Err(ConfigurationError::OutOfRange {
                name: "search.explore_probability",
                value: self.search.explore_probability,
            });
        }
        for (name, value) in [
            ("search.pool_size", self.search.pool_size),
            (
                "search.neighbors_per_iteration",
                self.search.neighbors_per_iteration,
            ),
            (
                "search.deadline_check_interval",
                self.search.deadline_check_interval as usize,
            ),
        ] {
            if value == 0 {
                return Err(ConfigurationError::OutOfRange { name, value: 0.0 });
            }
        }
        Ok(())
    }

    /// The optimizer budget of a single `ask_price`
    pub fn bid_budget(&self) -> Budget {
        self.budget(self.timeouts.bid)
    }

    /// The optimizer budget of the final `plan`
    pub fn plan_budget(&self) -> Budget {
        self.budget(self.timeouts.plan)
    }

    fn budget(&self, time: Duration) -> Budget {
        Budget::new(time, self.search.safety_margin).with_max_iterations(self.search.max_iterations)
    }
}

// To seamlessly (de)serialize, we create a "raw" version of our struct that
// contains only primitive values, durations being plain milliseconds. Serde
// uses the raw version, then the validating TryFrom yields the rich version.

/// The primitive (de)serialization form of [`AgentConfig`]
#[derive(Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RawConfig {
    /// Timeouts in milliseconds
    pub timeouts: RawTimeouts,
    /// See [`AgentConfig::discount_factor`]
    pub discount_factor: Option<f64>,
    /// See [`AgentConfig::convergence_threshold`]
    pub convergence_threshold: Option<f64>,
    /// See [`AgentConfig::max_tasks`]
    pub max_tasks: Option<usize>,
    /// Optimizer tunables, durations in milliseconds
    pub search: RawSearch,
}

/// The timeouts of [`RawConfig`], in milliseconds. All three are required.
#[derive(Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RawTimeouts {
    /// `setup` limit
    pub setup: Option<u64>,
    /// `plan` limit
    pub plan: Option<u64>,
    /// `ask_price` limit
    pub bid: Option<u64>,
}

/// The optimizer tunables of [`RawConfig`]
#[derive(Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RawSearch {
    /// See [`SearchConfig::pool_size`]
    pub pool_size: Option<usize>,
    /// See [`SearchConfig::safety_margin`], in milliseconds
    pub safety_margin: Option<u64>,
    /// See [`SearchConfig::neighbors_per_iteration`]
    pub neighbors_per_iteration: Option<usize>,
    /// See [`SearchConfig::explore_probability`]
    pub explore_probability: Option<f64>,
    /// See [`SearchConfig::deadline_check_interval`]
    pub deadline_check_interval: Option<u32>,
    /// See [`SearchConfig::max_iterations`]
    pub max_iterations: Option<u64>,
    /// See [`SearchConfig::seed`]
    pub seed: Option<u64>,
}

impl TryFrom<RawConfig> for AgentConfig {
    type Error = ConfigurationError;

    fn try_from(value: RawConfig) -> Result<Self, Self::Error> {
        let millis = |value: Option<u64>, name: &'static str| {
            value
                .map(Duration::from_millis)
                .ok_or(ConfigurationError::Missing(name))
        };
        let timeouts = Timeouts {
            setup: millis(value.timeouts.setup, "timeouts.setup")?,
            plan: millis(value.timeouts.plan, "timeouts.plan")?,
            bid: millis(value.timeouts.bid, "timeouts.bid")?,
        };

        let defaults = AgentConfig::new(timeouts);
        let search = SearchConfig {
            pool_size: value.search.pool_size.unwrap_or(defaults.search.pool_size),
            safety_margin: value
                .search
                .safety_margin
                .map(Duration::from_millis)
                .unwrap_or(defaults.search.safety_margin),
            neighbors_per_iteration: value
                .search
                .neighbors_per_iteration
                .unwrap_or(defaults.search.neighbors_per_iteration),
            explore_probability: value
                .search
                .explore_probability
                .unwrap_or(defaults.search.explore_probability),
            deadline_check_interval: value
                .search
                .deadline_check_interval
                .unwrap_or(defaults.search.deadline_check_interval),
            max_iterations: value.search.max_iterations,
            seed: value.search.seed,
        };

        let config = AgentConfig {
            timeouts,
            discount_factor: value.discount_factor.unwrap_or(defaults.discount_factor),
            convergence_threshold: value
                .convergence_threshold
                .unwrap_or(defaults.convergence_threshold),
            max_tasks: value.max_tasks.unwrap_or(defaults.max_tasks),
            search,
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<AgentConfig> for RawConfig {
    fn from(value: AgentConfig) -> Self {
        Self {
            timeouts: RawTimeouts {
                setup: Some(value.timeouts.setup.as_millis() as u64),
                plan: Some(value.timeouts.plan.as_millis() as u64),
                bid: Some(value.timeouts.bid.as_millis() as u64),
            },
            discount_factor: Some(value.discount_factor),
            convergence_threshold: Some(value.convergence_threshold),
            max_tasks: Some(value.max_tasks),
            search: RawSearch {
                pool_size: Some(value.search.pool_size),
                safety_margin: Some(value.search.safety_margin.as_millis() as u64),
                neighbors_per_iteration: Some(value.search.neighbors_per_iteration),
                explore_probability: Some(value.search.explore_probability),
                deadline_check_interval: Some(value.search.deadline_check_interval),
                max_iterations: value.search.max_iterations,
                seed: value.search.seed,
            },
        }
    }
}

/// Errors raised while obtaining or validating the agent configuration
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// The configuration source could not be read
    #[error("configuration source unavailable: {0}")]
    Unavailable(String),
    /// The configuration could not be parsed
    #[error("malformed configuration: {0}")]
    Malformed(String),
    /// A required setting is absent
    #[error("missing setting `{0}`")]
    Missing(&'static str),
    /// A setting lies outside its admissible range
    #[error("setting `{name}` out of range: {value}")]
    OutOfRange {
        /// The dotted setting name
        name: &'static str,
        /// The rejected value
        value: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(setup: u64, plan: u64, bid: u64) -> RawConfig {
        RawConfig {
            timeouts: RawTimeouts {
                setup: Some(setup),
                plan: Some(plan),
                bid: Some(bid),
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let config = AgentConfig::try_from(raw(1000, 2000, 300)).unwrap();
        assert_eq!(config.timeouts.bid, Duration::from_millis(300));
        assert_eq!(config.discount_factor, 0.95);
        assert_eq!(config.convergence_threshold, 0.01);
        assert_eq!(config.max_tasks, 50);
        assert_eq!(config.search.pool_size, 100);
        assert_eq!(config.bid_budget().margin, Duration::from_millis(75));
    }

    #[test]
    fn test_missing_timeout() {
        let mut value = raw(1000, 2000, 300);
        value.timeouts.plan = None;
        assert_eq!(
            AgentConfig::try_from(value),
            Err(ConfigurationError::Missing("timeouts.plan"))
        );
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            AgentConfig::try_from(raw(1000, 0, 300)),
            Err(ConfigurationError::OutOfRange { name: "timeouts.plan", .. })
        ));

        let mut value = raw(1000, 2000, 300);
        value.discount_factor = Some(1.5);
        assert!(matches!(
            AgentConfig::try_from(value),
            Err(ConfigurationError::OutOfRange { name: "discount_factor", .. })
        ));

        let mut value = raw(1000, 2000, 300);
        value.search.explore_probability = Some(-0.1);
        assert!(AgentConfig::try_from(value).is_err());
    }

    #[test]
    fn test_json_roundtrip_through_raw() {
        let config: AgentConfig = serde_json::from_str(
            r#"{"timeouts": {"setup": 500, "plan": 800, "bid": 250}, "search": {"seed": 7}}"#,
        )
        .unwrap();
        assert_eq!(config.search.seed, Some(7));
        assert_eq!(config.timeouts.plan, Duration::from_millis(800));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["timeouts"]["bid"], 250);
    }
}
