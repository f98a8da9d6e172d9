use crate::models::{Location, Map, TaskId};

/// A pickup-and-delivery task announced by the auction host.
///
/// Tasks are immutable once announced. The agent only ever reads them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    /// The host-assigned identifier
    pub id: TaskId,
    /// Where the parcel is collected
    pub pickup: Location,
    /// Where the parcel is dropped off
    pub delivery: Location,
    /// The load the parcel occupies while carried
    pub weight: u32,
    /// The nominal reward attached to the task by the host
    #[cfg_attr(feature = "serde", serde(default))]
    pub reward: u64,
}

impl Task {
    /// Create a task with no nominal reward
    pub fn new(id: impl Into<TaskId>, pickup: Location, delivery: Location, weight: u32) -> Self {
        Self {
            id: id.into(),
            pickup,
            delivery,
            weight,
            reward: 0,
        }
    }
}

/// The tasks a planning call must cover, keyed by id in announcement order
pub type TaskSet = Map<TaskId, Task>;

impl Map<TaskId, Task> {
    /// Index a sequence of tasks by their id. Later duplicates replace earlier ones.
    pub fn from_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        tasks.into_iter().map(|task| (task.id, task)).collect()
    }

    /// Add a task, returning the previous task with the same id, if any
    pub fn add(&mut self, task: Task) -> Option<Task> {
        self.insert(task.id, task)
    }

    /// Whether both sets hold exactly the same task ids, irrespective of order
    pub fn same_ids(&self, other: &Self) -> bool {
        self.len() == other.len() && self.keys().all(|id| other.contains_key(id))
    }

    /// The heaviest task in the set
    pub fn heaviest(&self) -> Option<&Task> {
        self.values().max_by_key(|task| task.weight)
    }
}
