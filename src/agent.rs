//! The agent: explore, solve, persist and play.
//!
//! `Agent` owns the game configuration and the discovered `StateTable`, and
//! wires the explorer, the solver, the greedy policy and the policy store
//! together.
//!
//! ```rust
//! use rust_2048::{Agent, Environment, Game2048, GameConfig, GameRng};
//!
//! let config = GameConfig::default();
//! let mut env = Game2048::new(config.clone()).unwrap();
//! let mut rng = GameRng::new(config.seed);
//!
//! let mut agent = Agent::new(config).unwrap();
//! agent.train(&mut env, 30, &mut rng).unwrap();
//! agent.create_policy(&env).unwrap();
//!
//! let start = env.canonical_start_state().cloned().unwrap();
//! let action = agent.forward(&start).unwrap();
//! println!("best first move: {}", action.arrow());
//! ```

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Environment, StateId};
use crate::core::{Action, GameConfig, GameRng};
use crate::error::Result;
use crate::explore::{ExploreConfig, ExploreStats, Explorer, StateTable};
use crate::solve::{GreedyPolicy, PolicyError, SolveStats, SolverConfig, ValueSolver};
use crate::store::PolicyStore;

/// One decision taken during `Agent::play`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayStep {
    /// State the decision was taken in.
    pub state: StateId,
    /// Action chosen.
    pub action: Action,
    /// Solved value of `state`.
    pub value: f64,
}

/// Why a played episode stopped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayEnd {
    /// The target tile was reached.
    Won,
    /// Full board with no merge left.
    Lost,
    /// The episode reached a state exploration never discovered.
    Unexplored(StateId),
    /// `max_moves` decisions were taken.
    MoveLimit,
}

/// Result of one greedy episode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayOutcome {
    /// Moves applied.
    pub moves: usize,
    /// State the episode ended in.
    pub final_state: StateId,
    /// True if the target tile was reached.
    pub won: bool,
    pub end: PlayEnd,
    /// One entry per move, in order.
    pub trace: Vec<PlayStep>,
}

/// Explores, solves and plays one board configuration.
#[derive(Clone, Debug)]
pub struct Agent {
    config: GameConfig,
    explore: ExploreConfig,
    solver: SolverConfig,
    table: StateTable,
    policy: GreedyPolicy,
}

impl Agent {
    /// Create an agent with an empty table.
    pub fn new(config: GameConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            explore: ExploreConfig::default(),
            solver: SolverConfig::default(),
            table: StateTable::new(),
            policy: GreedyPolicy::new(),
        })
    }

    #[must_use]
    pub fn with_explore_config(mut self, explore: ExploreConfig) -> Self {
        self.explore = explore;
        self
    }

    #[must_use]
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn table(&self) -> &StateTable {
        &self.table
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.table.len()
    }

    /// Explore until the table holds `bound` states.
    pub fn train<E: Environment>(
        &mut self,
        env: &mut E,
        bound: usize,
        rng: &mut GameRng,
    ) -> Result<ExploreStats> {
        let explorer = Explorer::new(self.explore.clone().with_bound(bound));
        Ok(explorer.explore(&mut self.table, env, rng)?)
    }

    /// Solve every state, starting from the environment's canonical start.
    ///
    /// Previously solved values are discarded first.
    pub fn create_policy<E: Environment>(&mut self, env: &E) -> Result<SolveStats> {
        let solver = ValueSolver::new(&self.config, self.solver.clone());
        self.table.clear_values();

        let root = env
            .canonical_start_state()
            .filter(|id| self.table.contains(id))
            .cloned();
        let mut stats = match &root {
            Some(root) => solver.solve(&mut self.table, root)?,
            None => SolveStats::default(),
        };

        if self.table.solved_count() < self.table.len() {
            let rest = solver.solve_all(&mut self.table)?;
            if root.is_none() {
                stats.method = rest.method;
            }
            stats.states_solved += rest.states_solved;
            stats.max_depth = stats.max_depth.max(rest.max_depth);
            stats.sweeps += rest.sweeps;
            stats.residual = stats.residual.max(rest.residual);
            stats.time_us += rest.time_us;
        }
        Ok(stats)
    }

    /// Solved value of `state`.
    pub fn state_value(&self, state: &StateId) -> Result<f64> {
        let record = self
            .table
            .get(state)
            .ok_or_else(|| PolicyError::UnknownState(state.clone()))?;
        if !record.solved {
            return Err(PolicyError::Unsolved(state.clone()).into());
        }
        Ok(record.value)
    }

    /// Best action from `state`.
    pub fn forward(&self, state: &StateId) -> Result<Action> {
        Ok(self.policy.best_action(&self.table, state)?)
    }

    /// Best action and current value for a live board.
    pub fn decide(&self, board: &Board) -> Result<(Action, f64)> {
        let state = board.encode()?;
        Ok((self.forward(&state)?, self.state_value(&state)?))
    }

    /// Write the table through `store`; returns the file path.
    pub fn save(&self, store: &PolicyStore) -> Result<PathBuf> {
        Ok(store.save(&self.table, &self.config)?)
    }

    /// Replace the table with the one stored at `path`.
    ///
    /// Every id must decode into this agent's board shape.
    pub fn load(&mut self, store: &PolicyStore, path: impl AsRef<Path>) -> Result<()> {
        let table = store.load(path)?;
        table.validate_shape(self.config.rows, self.config.cols)?;
        self.table = table;
        Ok(())
    }

    /// Play one greedy episode from the canonical start state.
    ///
    /// Starts from a fresh board if the environment has no start state yet.
    pub fn play<E: Environment>(
        &self,
        env: &mut E,
        rng: &mut GameRng,
        max_moves: usize,
    ) -> Result<PlayOutcome> {
        let start = env.canonical_start_state().cloned();
        env.reset(start.as_ref(), rng)?;

        let mut trace = Vec::new();
        let end = loop {
            let state = env.encoded_state()?;
            if env.is_win() {
                break PlayEnd::Won;
            }
            if env.is_terminal() {
                break PlayEnd::Lost;
            }
            if !self.table.contains(&state) {
                break PlayEnd::Unexplored(state);
            }
            if trace.len() >= max_moves {
                break PlayEnd::MoveLimit;
            }

            let action = self.forward(&state)?;
            let value = self.state_value(&state)?;
            env.apply(action, rng);
            trace.push(PlayStep { state, action, value });
        };

        let final_state = env.encoded_state()?;
        debug!("played {} moves, ended {:?}", trace.len(), end);
        Ok(PlayOutcome {
            moves: trace.len(),
            final_state,
            won: end == PlayEnd::Won,
            end,
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Game2048;
    use crate::error::Error;
    use crate::explore::{StateRecord, TransitionEdge};

    fn trained(bound: usize) -> (Agent, Game2048, GameRng) {
        let config = GameConfig::default();
        let mut env = Game2048::new(config.clone()).unwrap();
        let mut rng = GameRng::new(config.seed);
        let mut agent = Agent::new(config).unwrap();
        agent.train(&mut env, bound, &mut rng).unwrap();
        agent.create_policy(&env).unwrap();
        (agent, env, rng)
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = GameConfig::default().with_gamma(1.5);
        assert!(matches!(Agent::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_create_policy_solves_everything() {
        let (agent, env, _) = trained(60);
        assert_eq!(agent.table().solved_count(), agent.state_count());

        let start = env.canonical_start_state().unwrap();
        let value = agent.state_value(start).unwrap();
        assert!(value.is_finite());
        assert!(value >= 0.0);
        agent.forward(start).unwrap();
    }

    #[test]
    fn test_unknown_state_is_an_error() {
        let (agent, _, _) = trained(20);
        let missing = StateId::new("20482048999");
        assert!(matches!(
            agent.forward(&missing),
            Err(Error::Policy(PolicyError::UnknownState(_)))
        ));
        assert!(agent.state_value(&missing).is_err());
    }

    #[test]
    fn test_play_trace_matches_moves() {
        let (agent, mut env, mut rng) = trained(200);
        let outcome = agent.play(&mut env, &mut rng, 500).unwrap();

        assert_eq!(outcome.moves, outcome.trace.len());
        assert_eq!(outcome.won, outcome.end == PlayEnd::Won);
        assert_eq!(
            outcome.trace.first().map(|s| &s.state),
            env.canonical_start_state()
        );
        for step in &outcome.trace {
            assert_eq!(agent.forward(&step.state).unwrap(), step.action);
        }
    }

    #[test]
    fn test_play_stops_at_move_limit() {
        let (agent, mut env, mut rng) = trained(100);
        let outcome = agent.play(&mut env, &mut rng, 0).unwrap();
        assert_eq!(outcome.moves, 0);
        assert_eq!(outcome.end, PlayEnd::MoveLimit);
    }

    #[test]
    fn test_decide_on_board() {
        let config = GameConfig::default();
        let mut agent = Agent::new(config.clone()).unwrap();
        let board = Board::from_rows(&[vec![0, 0], vec![2, 2]]).unwrap();
        let state = board.encode().unwrap();
        let merged = Board::from_rows(&[vec![2, 0], vec![4, 0]]).unwrap().encode().unwrap();

        agent.table.insert_new(state.clone());
        agent.table.insert(
            merged.clone(),
            StateRecord {
                reward: config.win_reward,
                ..StateRecord::new()
            },
        );
        agent
            .table
            .record_transition(&state, Action::Right, TransitionEdge::new(0.45, merged));
        let env = Game2048::new(config).unwrap();
        agent.create_policy(&env).unwrap();

        let (action, value) = agent.decide(&board).unwrap();
        assert_eq!(action, Action::Right);
        assert!((value - 0.9 * 0.45 * 100.0).abs() < 1e-9);
    }
}
