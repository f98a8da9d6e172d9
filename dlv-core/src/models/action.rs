use crate::models::{Location, Task, TaskId};

/// One step of a vehicle route
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "action", content = "task", rename_all = "snake_case")
)]
pub enum Action {
    /// Collect the task's parcel at its pickup location
    Pickup(TaskId),
    /// Drop the task's parcel at its delivery location
    Delivery(TaskId),
}

impl Action {
    /// The task this action refers to
    pub fn task(&self) -> TaskId {
        match self {
            Self::Pickup(id) | Self::Delivery(id) => *id,
        }
    }

    /// Where the vehicle must be to perform this action
    pub fn location(&self, task: &Task) -> Location {
        match self {
            Self::Pickup(_) => task.pickup,
            Self::Delivery(_) => task.delivery,
        }
    }

    /// The change in carried load caused by this action
    pub fn load_delta(&self, task: &Task) -> i64 {
        match self {
            Self::Pickup(_) => task.weight as i64,
            Self::Delivery(_) => -(task.weight as i64),
        }
    }
}
