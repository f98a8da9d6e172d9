//! The scenario files read by every subcommand.
//!
//! A scenario names its cities and roads, the agent's fleet, and the
//! schedule of auction rounds with the bids the other agents place:
//!
//! ```json
//! {
//!   "cities": ["A", "B", "C"],
//!   "roads": [{ "from": "A", "to": "B", "distance": 4.0 }],
//!   "vehicles": [{ "id": 0, "home": "A", "capacity": 10, "cost_per_km": 1.0 }],
//!   "agent": 0,
//!   "rounds": [
//!     { "task": { "id": 1, "pickup": "A", "delivery": "B", "weight": 5 }, "bids": [null, 30] }
//!   ]
//! }
//! ```

use crate::CliError;
use dlv_core::{
    models::{
        AgentConfig, AgentId, DistanceTable, Location, ProbabilityTable, Road, Task, TaskId,
        TaskSet, Vehicle, VehicleId,
    },
    ports::Topology as _,
};
use serde::{Deserialize, Serialize};
use std::io::Read;

#[derive(Debug, Serialize, Deserialize)]
pub struct Scenario {
    pub cities: Vec<String>,
    pub roads: Vec<ScenarioRoad>,
    pub vehicles: Vec<ScenarioVehicle>,
    pub agent: AgentId,
    #[serde(default)]
    pub rounds: Vec<ScenarioRound>,
    /// Inline agent configuration, used when no file is given
    #[serde(default)]
    pub config: Option<AgentConfig>,
    /// Expected task arrivals; uniform over city pairs if omitted
    #[serde(default)]
    pub distribution: Option<ProbabilityTable>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioRoad {
    pub from: String,
    pub to: String,
    pub distance: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioVehicle {
    pub id: VehicleId,
    pub home: String,
    pub capacity: u32,
    pub cost_per_km: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioTask {
    pub id: TaskId,
    pub pickup: String,
    pub delivery: String,
    pub weight: u32,
    #[serde(default)]
    pub reward: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScenarioRound {
    pub task: ScenarioTask,
    /// The bid of every agent by id; our own slot is ignored
    #[serde(default)]
    pub bids: Vec<Option<u64>>,
}

/// A scenario resolved against its topology
pub struct World {
    pub topology: DistanceTable,
    pub distribution: ProbabilityTable,
    pub vehicles: Vec<Vehicle>,
    pub agent: AgentId,
    pub rounds: Vec<Round>,
    pub config: Option<AgentConfig>,
}

pub struct Round {
    pub task: Task,
    pub bids: Vec<Option<u64>>,
}

impl World {
    /// Every scheduled task
    pub fn tasks(&self) -> TaskSet {
        TaskSet::from_tasks(self.rounds.iter().map(|round| round.task.clone()))
    }
}

impl Scenario {
    pub fn from_reader(reader: impl Read) -> anyhow::Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn build(self) -> anyhow::Result<World> {
        let names = self.cities;
        let locate = |name: &str| {
            names
                .iter()
                .position(|city| city == name)
                .map(Location)
                .ok_or_else(|| CliError::UnknownCity(name.to_owned()))
        };

        let roads = self
            .roads
            .iter()
            .map(|road| {
                Ok(Road {
                    from: locate(&road.from)?,
                    to: locate(&road.to)?,
                    distance: road.distance,
                })
            })
            .collect::<Result<Vec<_>, CliError>>()?;

        let vehicles = self
            .vehicles
            .into_iter()
            .map(|vehicle| {
                Ok(Vehicle::new(
                    vehicle.id,
                    locate(&vehicle.home)?,
                    vehicle.capacity,
                    vehicle.cost_per_km,
                ))
            })
            .collect::<Result<Vec<_>, CliError>>()?;

        let mut seen = TaskSet::default();
        let mut rounds = Vec::with_capacity(self.rounds.len());
        for ScenarioRound { task, bids } in self.rounds {
            let task = Task {
                id: task.id,
                pickup: locate(&task.pickup)?,
                delivery: locate(&task.delivery)?,
                weight: task.weight,
                reward: task.reward,
            };
            if seen.add(task.clone()).is_some() {
                return Err(CliError::DuplicateTask(task.id).into());
            }
            rounds.push(Round { task, bids });
        }

        let topology = DistanceTable::new(names.clone(), &roads)?;
        let distribution = match self.distribution {
            Some(distribution) => distribution,
            None => {
                let count = seen.len().max(1) as f64;
                let weight = seen.values().map(|task| task.weight as f64).sum::<f64>() / count;
                let reward = seen.values().map(|task| task.reward as f64).sum::<f64>() / count;
                ProbabilityTable::uniform(topology.locations(), weight, reward)
            }
        };

        Ok(World {
            topology,
            distribution,
            vehicles,
            agent: self.agent,
            rounds,
            config: self.config,
        })
    }
}
