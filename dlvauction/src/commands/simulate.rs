use super::SettingsArgs;
use crate::scenario::{Scenario, World};
use dlv_agent::DefaultSession;
use dlv_core::{
    models::{AgentId, DECLINE_BID, TaskId, VehiclePlan},
    ports::AuctionBehavior as _,
};
use serde::Serialize;
use tracing::{Level, event};

#[derive(Debug, Serialize)]
pub struct RoundReport {
    pub task: TaskId,
    /// Our bid, absent when we declined
    pub bid: Option<u64>,
    /// Absent when nobody bid
    pub winner: Option<AgentId>,
    /// The winning bid
    pub price: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub agent: AgentId,
    pub rounds: Vec<RoundReport>,
    pub won: Vec<TaskId>,
    pub plans: Vec<VehiclePlan>,
    /// The cost of driving the final plans
    pub cost: f64,
    /// The sum of our winning bids
    pub revenue: u64,
    pub profit: f64,
}

// Lowest bid wins, ties go to `agent`, then to the lowest id
fn lowest(bids: &[Option<u64>], agent: AgentId) -> Option<(usize, u64)> {
    bids.iter()
        .enumerate()
        .filter_map(|(index, bid)| bid.map(|bid| (index, bid)))
        .min_by_key(|(index, bid)| (*bid, *index != agent.index(), *index))
}

pub fn run(scenario: Scenario, settings: &SettingsArgs) -> anyhow::Result<SimulationReport> {
    let World {
        topology,
        distribution,
        vehicles,
        agent,
        rounds,
        config,
    } = scenario.build()?;

    let mut session = DefaultSession::new(agent, vehicles.clone());
    if let Some(table) = settings.table()? {
        session = session.with_table(table);
    }
    session.setup(topology, distribution, &settings.source(config))?;

    let mut reports = Vec::with_capacity(rounds.len());
    for round in rounds {
        let bid = session.ask_price(&round.task)?;
        let offered = (bid != DECLINE_BID).then_some(bid);

        let mut bids = round.bids;
        if bids.len() <= agent.index() {
            bids.resize(agent.index() + 1, None);
        }
        bids[agent.index()] = offered;

        let (winner, price) = match lowest(&bids, agent) {
            Some((index, price)) => {
                let winner = AgentId::from(u32::try_from(index)?);
                session.auction_result(&round.task, winner, &bids)?;
                (Some(winner), Some(price))
            }
            None => {
                event!(Level::WARN, task = %round.task.id, "nobody bid, the task is withdrawn");
                session.withdraw(round.task.id);
                (None, None)
            }
        };

        reports.push(RoundReport {
            task: round.task.id,
            bid: offered,
            winner,
            price,
        });
    }

    let owned = session.owned().clone();
    let plans = session.plan(&vehicles, &owned)?;

    let cost = plans.iter().map(|plan| plan.cost).sum::<f64>();
    let revenue = reports
        .iter()
        .filter(|report| report.winner == Some(agent))
        .filter_map(|report| report.price)
        .sum::<u64>();

    Ok(SimulationReport {
        agent,
        rounds: reports,
        won: owned.keys().copied().collect(),
        plans,
        cost,
        revenue,
        profit: revenue as f64 - cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowest_bid_wins() {
        let us = AgentId(1);
        assert_eq!(lowest(&[Some(5), Some(3), Some(4)], us), Some((1, 3)));
        assert_eq!(lowest(&[Some(3), Some(3), None], us), Some((1, 3)));
        assert_eq!(lowest(&[Some(3), None, Some(3)], us), Some((0, 3)));
        assert_eq!(lowest(&[None, None], us), None);
    }
}
