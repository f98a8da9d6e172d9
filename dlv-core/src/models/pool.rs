use crate::models::{PlanningError, Solution};

// Costs within this distance are considered tied when looking for duplicates
const COST_EPSILON: f64 = 1e-9;

/// A bounded collection of the best feasible solutions seen by a search run.
///
/// Entries are kept sorted by ascending total cost and are structurally
/// distinct. Once `capacity` entries are held, inserting a better solution
/// evicts the worst one and worse solutions are rejected.
#[derive(Clone, Debug)]
pub struct SolutionPool {
    capacity: usize,
    entries: Vec<Solution>,
}

impl SolutionPool {
    /// Create an empty pool holding at most `capacity` solutions (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Vec::with_capacity(capacity.min(1024)),
        }
    }

    /// Offer a solution to the pool, returning whether it was retained
    pub fn insert(&mut self, solution: Solution) -> bool {
        let cost = solution.total_cost();

        if self.entries.len() == self.capacity {
            match self.entries.last() {
                Some(worst) if cost >= worst.total_cost() => return false,
                _ => {}
            }
        }

        // Only solutions with (nearly) the same cost can be structurally equal
        let lo = self
            .entries
            .partition_point(|entry| entry.total_cost() < cost - COST_EPSILON);
        let hi = self
            .entries
            .partition_point(|entry| entry.total_cost() <= cost + COST_EPSILON);
        if self.entries[lo..hi].iter().any(|entry| *entry == solution) {
            return false;
        }

        let position = self
            .entries
            .partition_point(|entry| entry.total_cost() <= cost);
        self.entries.insert(position, solution);
        self.entries.truncate(self.capacity);
        true
    }

    /// The cheapest solution found
    pub fn best(&self) -> Result<&Solution, PlanningError> {
        self.entries.first().ok_or(PlanningError::PoolEmpty)
    }

    /// Consume the pool, keeping only the cheapest solution
    pub fn into_best(self) -> Result<Solution, PlanningError> {
        self.entries
            .into_iter()
            .next()
            .ok_or(PlanningError::PoolEmpty)
    }

    /// The solutions in ascending cost order
    pub fn iter(&self) -> impl Iterator<Item = &Solution> {
        self.entries.iter()
    }

    /// The number of solutions held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been retained yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The maximum number of solutions held
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, Route, TaskId};

    fn solution(task: u32, cost: f64) -> Solution {
        let route = Route::from_actions(vec![
            Action::Pickup(TaskId(task)),
            Action::Delivery(TaskId(task)),
        ]);
        Solution::from_parts(vec![route], vec![cost])
    }

    #[test]
    fn test_sorted_and_bounded() {
        let mut pool = SolutionPool::new(3);
        assert!(pool.insert(solution(1, 5.0)));
        assert!(pool.insert(solution(2, 1.0)));
        assert!(pool.insert(solution(3, 3.0)));
        // Worse than everything in a full pool
        assert!(!pool.insert(solution(4, 9.0)));
        // Better than the worst: evicts it
        assert!(pool.insert(solution(5, 2.0)));

        let costs = pool.iter().map(Solution::total_cost).collect::<Vec<_>>();
        assert_eq!(costs, vec![1.0, 2.0, 3.0]);
        assert_eq!(pool.best().unwrap(), &solution(2, 1.0));
    }

    #[test]
    fn test_deduplicates() {
        let mut pool = SolutionPool::new(10);
        assert!(pool.insert(solution(1, 5.0)));
        assert!(!pool.insert(solution(1, 5.0)));
        // Same cost, different structure
        assert!(pool.insert(solution(2, 5.0)));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_empty_pool() {
        let pool = SolutionPool::new(0);
        assert_eq!(pool.capacity(), 1);
        assert_eq!(pool.best(), Err(PlanningError::PoolEmpty));
        assert_eq!(pool.into_best(), Err(PlanningError::PoolEmpty));
    }
}
