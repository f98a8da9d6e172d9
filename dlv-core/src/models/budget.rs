use std::time::{Duration, Instant};

/// The resources a single optimizer run may consume.
///
/// A run stops once `time - margin` has elapsed, or after `max_iterations`
/// search iterations, whichever comes first. The margin keeps the caller
/// clear of the host's hard deadline (`time`).
///
/// Time is counted from `started` when set, so that work done by the caller
/// before the run (pricing, warm starts) is charged to the same deadline.
/// Otherwise it is counted from the start of the run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Budget {
    /// The wall-clock time granted by the host
    pub time: Duration,
    /// The safety margin reserved before the hard deadline
    pub margin: Duration,
    /// An optional cap on search iterations
    pub max_iterations: Option<u64>,
    /// When the host's clock started running, if before the run
    pub started: Option<Instant>,
}

impl Budget {
    /// A purely time-bounded budget
    pub fn new(time: Duration, margin: Duration) -> Self {
        Self {
            time,
            margin,
            max_iterations: None,
            started: None,
        }
    }

    /// Additionally cap the number of search iterations
    pub fn with_max_iterations(self, max_iterations: Option<u64>) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Count the time from `started` instead of the start of the run
    pub fn started_at(self, started: Instant) -> Self {
        Self {
            started: Some(started),
            ..self
        }
    }

    /// The instant time is counted from, given a run starting at `now`
    pub fn origin(&self, now: Instant) -> Instant {
        self.started.unwrap_or(now)
    }

    /// The instant the search must stop ingesting neighbors
    pub fn soft_deadline(&self, now: Instant) -> Instant {
        self.origin(now) + self.time.saturating_sub(self.margin)
    }

    /// The instant after which returning is a protocol violation
    pub fn hard_deadline(&self, now: Instant) -> Instant {
        self.origin(now) + self.time
    }

    /// Whether the iteration cap has been reached
    pub fn exhausted(&self, iterations: u64) -> bool {
        self.max_iterations.is_some_and(|max| iterations >= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_larger_than_time() {
        let budget = Budget::new(Duration::from_millis(50), Duration::from_millis(80));
        let start = Instant::now();
        assert_eq!(budget.soft_deadline(start), start);
        assert_eq!(budget.hard_deadline(start), start + Duration::from_millis(50));
    }

    #[test]
    fn test_deadlines_count_from_the_callback() {
        let started = Instant::now();
        let later = started + Duration::from_millis(30);
        let budget = Budget::new(Duration::from_millis(100), Duration::from_millis(40));

        assert_eq!(budget.soft_deadline(later), later + Duration::from_millis(60));

        let budget = budget.started_at(started);
        assert_eq!(budget.origin(later), started);
        assert_eq!(budget.soft_deadline(later), started + Duration::from_millis(60));
        assert_eq!(budget.hard_deadline(later), started + Duration::from_millis(100));
    }

    #[test]
    fn test_iteration_cap() {
        let budget = Budget::new(Duration::from_secs(1), Duration::ZERO);
        assert!(!budget.exhausted(u64::MAX));
        let budget = budget.with_max_iterations(Some(10));
        assert!(!budget.exhausted(9));
        assert!(budget.exhausted(10));
    }
}
