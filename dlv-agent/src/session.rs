use crate::{AgentError, valuation};
use dlv_core::{
    models::{
        AgentConfig, AgentId, DECLINE_BID, DistanceTable, Map, PlanningError, Problem,
        ProbabilityTable, SearchConfig, Solution, Task, TaskId, TaskSet, Vehicle, VehiclePlan,
    },
    ports::{
        AuctionBehavior, CompetitorSignal, ConfigProvider, Optimizer, TaskDistribution, Topology,
        ValuationState, ValuationTable,
    },
};
use dlv_solver::LocalSearch;
use std::{fmt, time::Instant};
use tracing::{Level, event, span};

/// Where a session stands in the host protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Created, `setup` not yet called
    Idle,
    /// `setup` is reading the configuration
    AwaitingSetup,
    /// Auction rounds are running
    Active,
    /// The final `plan` is being computed
    Finalizing,
    /// The final plan was delivered
    Done,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::AwaitingSetup => "awaiting setup",
            Self::Active => "active",
            Self::Finalizing => "finalizing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What the session remembers of past rounds: only the latest one
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoundHistory {
    /// Completed auction rounds
    pub rounds: usize,
    /// Whether we won the latest round
    pub won_last: Option<bool>,
    /// The lowest competitor bid of the latest round
    pub competitor_bid: Option<u64>,
    /// How that bid compared to ours
    pub competitor: CompetitorSignal,
}

// The collaborators handed over at setup
struct Context<O, T, D> {
    optimizer: O,
    topology: T,
    distribution: D,
    config: AgentConfig,
}

// A priced candidate awaiting its auction result
struct Tentative {
    bid: u64,
    // None when the candidate was declined
    solution: Option<Solution>,
}

/// A session searching with [`LocalSearch`] over the stock collaborators
pub type DefaultSession = AuctionSession<LocalSearch, DistanceTable, ProbabilityTable>;

/// The auction session controller.
///
/// Owns the tasks won so far and the committed solution serving them. Each
/// announced task is priced against the committed solution; the priced
/// solution is kept, keyed by task id, until the result for that task
/// arrives. A win commits it, a loss discards it.
pub struct AuctionSession<O, T, D> {
    agent: AgentId,
    vehicles: Vec<Vehicle>,
    state: SessionState,
    context: Option<Context<O, T, D>>,
    owned: TaskSet,
    committed: Solution,
    tentative: Map<TaskId, Tentative>,
    table: Option<Box<dyn ValuationTable>>,
    history: RoundHistory,
}

impl<O, T, D> AuctionSession<O, T, D>
where
    O: Optimizer<Settings = SearchConfig>,
    T: Topology,
    D: TaskDistribution,
{
    /// A session for `agent` bidding with the given fleet
    pub fn new(agent: AgentId, vehicles: Vec<Vehicle>) -> Self {
        let committed = Solution::empty(vehicles.len());
        Self {
            agent,
            vehicles,
            state: SessionState::Idle,
            context: None,
            owned: TaskSet::default(),
            committed,
            tentative: Map::default(),
            table: None,
            history: RoundHistory::default(),
        }
    }

    /// Bias every bid through a precomputed valuation table
    pub fn with_table(mut self, table: impl ValuationTable + 'static) -> Self {
        self.table = Some(Box::new(table));
        self
    }

    /// This agent's id
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    /// The fleet bids are computed for
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// The protocol state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The tasks won so far
    pub fn owned(&self) -> &TaskSet {
        &self.owned
    }

    /// The baseline solution serving the owned tasks
    pub fn committed(&self) -> &Solution {
        &self.committed
    }

    /// The latest round
    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    /// The number of bids still awaiting a result
    pub fn pending(&self) -> usize {
        self.tentative.len()
    }

    /// The configuration read at setup
    pub fn config(&self) -> Option<&AgentConfig> {
        self.context.as_ref().map(|context| &context.config)
    }

    /// Forget the quote for a task the host withdrew without a result.
    /// Returns whether a quote was pending.
    pub fn withdraw(&mut self, task: TaskId) -> bool {
        let pending = self.tentative.shift_remove(&task).is_some();
        if pending {
            event!(Level::DEBUG, %task, "quote withdrawn");
        }
        pending
    }

    fn invalid(&self, operation: &'static str) -> AgentError {
        AgentError::InvalidState {
            operation,
            state: self.state,
        }
    }

    // The abstraction of the auction a valuation table is keyed by
    fn valuation_state(&self, context: &Context<O, T, D>, task: &Task) -> ValuationState {
        let remaining = context.config.max_tasks.saturating_sub(self.history.rounds);

        // Chance that the next task starts where this one ends
        let affinity = (0..context.topology.locations())
            .map(|to| context.distribution.probability(task.delivery, to.into()))
            .sum::<f64>();

        let gamma = context.config.discount_factor;
        let horizon = i32::try_from(remaining).unwrap_or(i32::MAX);
        let discounted = gamma * (1.0 - gamma.powi(horizon)) / (1.0 - gamma);

        ValuationState {
            load: self.owned.len(),
            competitor: self.history.competitor,
            remaining,
            outlook: affinity * discounted,
        }
    }
}

impl<O, T, D> AuctionBehavior for AuctionSession<O, T, D>
where
    O: Optimizer<Settings = SearchConfig>,
    T: Topology,
    D: TaskDistribution,
{
    type Topology = T;
    type Distribution = D;
    type Error = AgentError;

    fn setup(
        &mut self,
        topology: T,
        distribution: D,
        config: &impl ConfigProvider,
    ) -> Result<(), AgentError> {
        if self.state != SessionState::Idle {
            return Err(self.invalid("setup"));
        }
        self.state = SessionState::AwaitingSetup;

        let config = match config.load() {
            Ok(config) => config,
            Err(error) => {
                event!(Level::ERROR, %error, "unable to load the agent configuration");
                self.state = SessionState::Idle;
                return Err(error.into());
            }
        };

        event!(
            Level::INFO,
            agent = %self.agent,
            vehicles = self.vehicles.len(),
            locations = topology.locations(),
            bid_ms = config.timeouts.bid.as_millis() as u64,
            plan_ms = config.timeouts.plan.as_millis() as u64,
            "session set up"
        );

        self.context = Some(Context {
            optimizer: O::new(config.search.clone()),
            topology,
            distribution,
            config,
        });
        self.owned = TaskSet::default();
        self.committed = Solution::empty(self.vehicles.len());
        self.tentative.clear();
        self.history = RoundHistory::default();
        self.state = SessionState::Active;
        Ok(())
    }

    fn ask_price(&mut self, task: &Task) -> Result<u64, AgentError> {
        let started = Instant::now();
        let context = match (&self.context, self.state) {
            (Some(context), SessionState::Active) => context,
            _ => return Err(self.invalid("ask_price")),
        };
        let span = span!(Level::INFO, "ask_price", task = %task.id);
        let _entered = span.enter();

        let mut candidates = self.owned.clone();
        candidates.add(task.clone());
        let problem = Problem::new(&self.vehicles, &candidates, &context.topology);
        let state = self.valuation_state(context, task);
        let table = self.table.as_deref().map(|table| (table, &state));

        let tentative = match valuation::quote(
            &context.optimizer,
            &problem,
            context.config.bid_budget().started_at(started),
            &self.committed,
            task,
            table,
        ) {
            Ok(valuation) => Tentative {
                bid: valuation.bid,
                solution: Some(valuation.solution),
            },
            Err(
                error @ (PlanningError::InfeasibleTask { .. } | PlanningError::EmptyFleet { .. }),
            ) => {
                event!(Level::WARN, %error, "declining a task we cannot serve");
                Tentative {
                    bid: DECLINE_BID,
                    solution: None,
                }
            }
            Err(error) => return Err(error.into()),
        };

        let bid = tentative.bid;
        event!(Level::INFO, bid, owned = self.owned.len());
        // A repeated announcement supersedes the earlier quote
        self.tentative.insert(task.id, tentative);
        Ok(bid)
    }

    fn auction_result(
        &mut self,
        task: &Task,
        winner: AgentId,
        bids: &[Option<u64>],
    ) -> Result<(), AgentError> {
        let started = Instant::now();
        let context = match (&self.context, self.state) {
            (Some(context), SessionState::Active) => context,
            _ => return Err(self.invalid("auction_result")),
        };
        let span = span!(Level::INFO, "auction_result", task = %task.id, %winner);
        let _entered = span.enter();

        let tentative = self.tentative.shift_remove(&task.id);
        let ours = bids
            .get(self.agent.index())
            .copied()
            .flatten()
            .or(tentative.as_ref().map(|tentative| tentative.bid));
        let competitor_bid = bids
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != self.agent.index())
            .filter_map(|(_, bid)| *bid)
            .min();
        let competitor = match (ours, competitor_bid) {
            (Some(ours), Some(theirs)) if theirs < ours => CompetitorSignal::Cheaper,
            (Some(_), Some(_)) => CompetitorSignal::Dearer,
            _ => CompetitorSignal::Unknown,
        };
        let won = winner == self.agent;

        if won {
            let mut owned = self.owned.clone();
            owned.add(task.clone());
            let problem = Problem::new(&self.vehicles, &owned, &context.topology);

            // The quote was made against the baseline of its time; anything
            // won in between makes it stale
            let committed = match tentative.and_then(|tentative| tentative.solution) {
                Some(solution) if problem.check(&solution).is_ok() => Some(solution),
                _ => match problem.check_servable() {
                    Ok(()) => {
                        event!(Level::DEBUG, "no usable quote, re-optimizing the owned tasks");
                        let budget = context.config.bid_budget().started_at(started);
                        let deadline = budget.soft_deadline(started);
                        let warm_start = valuation::cheapest_insertion(
                            &problem,
                            &self.committed,
                            task,
                            Some(deadline),
                        );
                        let pool = context
                            .optimizer
                            .optimize(&problem, budget, warm_start.as_ref())?;
                        Some(pool.into_best()?)
                    }
                    Err(error) => {
                        event!(Level::WARN, %error, "ignoring an award we cannot serve");
                        None
                    }
                },
            };

            if let Some(committed) = committed {
                event!(
                    Level::INFO,
                    owned = owned.len(),
                    cost = committed.total_cost(),
                    "won"
                );
                self.owned = owned;
                self.committed = committed;
                // Quotes still pending were priced against the previous baseline
                for pending in self.tentative.values_mut() {
                    pending.solution = None;
                }
            }
        } else {
            event!(Level::INFO, ?competitor_bid, "lost");
        }

        self.history = RoundHistory {
            rounds: self.history.rounds + 1,
            won_last: Some(won),
            competitor_bid,
            competitor,
        };
        Ok(())
    }

    fn plan(
        &mut self,
        vehicles: &[Vehicle],
        tasks: &TaskSet,
    ) -> Result<Vec<VehiclePlan>, AgentError> {
        let started = Instant::now();
        let context = match (&self.context, self.state) {
            (Some(context), SessionState::Active) => context,
            _ => return Err(self.invalid("plan")),
        };
        self.state = SessionState::Finalizing;
        let span = span!(Level::INFO, "plan", tasks = tasks.len(), vehicles = vehicles.len());
        let _entered = span.enter();

        if !tasks.same_ids(&self.owned) {
            event!(
                Level::WARN,
                owned = self.owned.len(),
                requested = tasks.len(),
                "planning a task set that differs from the tasks won"
            );
        }

        let problem = Problem::new(vehicles, tasks, &context.topology);
        // The committed solution is only used if it still fits
        let planned = context
            .optimizer
            .optimize(
                &problem,
                context.config.plan_budget().started_at(started),
                Some(&self.committed),
            )
            .and_then(|pool| pool.into_best())
            .map_err(AgentError::from)
            .and_then(|best| {
                problem.check(&best)?;
                Ok(best)
            });

        let best = match planned {
            Ok(best) => best,
            Err(error) => {
                event!(Level::ERROR, %error, "final planning failed");
                self.state = SessionState::Active;
                return Err(error);
            }
        };

        let plans = problem.plans(&best);
        event!(Level::INFO, cost = best.total_cost(), "final plan");
        self.committed = best;
        self.tentative.clear();
        self.state = SessionState::Done;
        Ok(plans)
    }
}
