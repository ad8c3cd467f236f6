//! Bounded random-walk exploration.
//!
//! Repeats episodes over an `Environment` until the table holds
//! `bound_of_states` states. The first episode starts from a fresh board;
//! every later one restarts from the canonical start state.

use std::time::Instant;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{BoardError, Environment, StateId};
use crate::core::{Action, GameConfig, GameRng};

use super::table::{StateTable, TransitionEdge};

/// Errors raised while exploring.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExploreError {
    #[error("board error during exploration: {0}")]
    Board(#[from] BoardError),
}

/// Exploration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExploreConfig {
    /// Stop once this many states are known.
    pub bound_of_states: usize,

    /// Give up after this many episodes, in case the reachable state space
    /// is smaller than the bound.
    pub max_episodes: u64,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            bound_of_states: 400,
            max_episodes: 1_000_000,
        }
    }
}

impl ExploreConfig {
    /// Set the state bound.
    #[must_use]
    pub fn with_bound(mut self, bound: usize) -> Self {
        self.bound_of_states = bound;
        self
    }

    /// Set the episode budget.
    #[must_use]
    pub fn with_max_episodes(mut self, episodes: u64) -> Self {
        self.max_episodes = episodes;
        self
    }
}

/// Counters collected during exploration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploreStats {
    /// Episodes started.
    pub episodes: u64,

    /// Moves applied, including discarded no-ops.
    pub steps: u64,

    /// Moves that left the state unchanged.
    pub no_op_moves: u64,

    /// New states registered by this run.
    pub states_discovered: usize,

    /// New edges stored by this run.
    pub edges_recorded: usize,

    /// Episodes ending on the target tile.
    pub wins: u64,

    /// Episodes ending on a full board with no merges.
    pub losses: u64,

    /// True if `max_episodes` stopped the run before the bound.
    pub budget_exhausted: bool,

    /// True if the canonical start is already a win or a loss, so no later
    /// episode could discover anything.
    pub start_is_final: bool,

    /// Wall time (microseconds).
    pub time_us: u64,
}

/// Chooses the action to try from a state during exploration.
pub trait ExplorationPolicy: Send + Sync {
    fn choose(&self, state: &StateId, rng: &mut GameRng) -> Action;
}

/// Uniform random over the four actions.
#[derive(Clone, Debug, Default)]
pub struct UniformExploration;

impl ExplorationPolicy for UniformExploration {
    fn choose(&self, _state: &StateId, rng: &mut GameRng) -> Action {
        Action::ALL[rng.gen_range_usize(0..Action::COUNT)]
    }
}

/// Edge weight for a transition that spawned a tile worth `value_delta`.
///
/// `1 / (free + 1)` approximates a uniform choice among the cells that were
/// free before the spawn; the spawn prior then weights the tile value.
#[must_use]
pub fn transition_probability(free_after: usize, value_delta: u64, config: &GameConfig) -> f64 {
    let location = 1.0 / (free_after as f64 + 1.0);
    match value_delta {
        2 => location * config.prob_of_2,
        4 => location * config.prob_of_4,
        _ => location,
    }
}

/// Random-walk explorer.
pub struct Explorer {
    config: ExploreConfig,
    policy: Box<dyn ExplorationPolicy>,
}

impl Explorer {
    pub fn new(config: ExploreConfig) -> Self {
        Self {
            config,
            policy: Box::new(UniformExploration),
        }
    }

    /// Set a custom exploration policy.
    pub fn with_policy<P: ExplorationPolicy + 'static>(mut self, policy: P) -> Self {
        self.policy = Box::new(policy);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ExploreConfig {
        &self.config
    }

    /// Explore until `table` holds `bound_of_states` states.
    ///
    /// The episode in progress when the bound is reached runs to its end, so
    /// the table may hold slightly more states than the bound.
    pub fn explore<E: Environment>(
        &self,
        table: &mut StateTable,
        env: &mut E,
        rng: &mut GameRng,
    ) -> Result<ExploreStats, ExploreError> {
        let start = Instant::now();
        let mut stats = ExploreStats::default();
        let bound = self.config.bound_of_states;
        let win_reward = env.config().win_reward;
        let mut decile = progress_decile(table.len(), bound);

        while table.len() < bound {
            if stats.episodes >= self.config.max_episodes {
                warn!(
                    "exploration budget of {} episodes exhausted at {}/{} states",
                    self.config.max_episodes,
                    table.len(),
                    bound
                );
                stats.budget_exhausted = true;
                break;
            }

            let start_state = if table.is_empty() {
                None
            } else {
                env.canonical_start_state().cloned()
            };
            env.reset(start_state.as_ref(), rng)?;
            stats.episodes += 1;
            let episode_start_steps = stats.steps;

            loop {
                let state = env.encoded_state()?;
                let value = env.board_value();

                if table.insert_new(state.clone()) {
                    stats.states_discovered += 1;
                    let now = progress_decile(table.len(), bound);
                    if now > decile {
                        decile = now;
                        info!("exploration progress: {}% ({} states)", now * 10, table.len());
                    }
                }

                if env.is_win() {
                    if let Some(record) = table.get_mut(&state) {
                        record.reward = win_reward;
                    }
                    stats.wins += 1;
                    break;
                }
                if env.is_terminal() {
                    stats.losses += 1;
                    break;
                }

                let action = self.policy.choose(&state, rng);
                env.apply(action, rng);
                stats.steps += 1;

                let next = env.encoded_state()?;
                if next == state {
                    stats.no_op_moves += 1;
                    continue;
                }

                let delta = env.board_value().saturating_sub(value);
                let probability =
                    transition_probability(env.free_tile_count(), delta, env.config());
                if table.record_transition(&state, action, TransitionEdge::new(probability, next)) {
                    stats.edges_recorded += 1;
                }
            }

            debug!(
                "episode {} finished after {} moves ({} states known)",
                stats.episodes,
                stats.steps - episode_start_steps,
                table.len()
            );

            if start_state.is_some() && stats.steps == episode_start_steps {
                warn!(
                    "canonical start state is final; stopping at {}/{} states",
                    table.len(),
                    bound
                );
                stats.start_is_final = true;
                break;
            }
        }

        stats.time_us = start.elapsed().as_micros() as u64;
        info!(
            "explored {} states in {} episodes ({} wins, {} losses, {} edges)",
            table.len(),
            stats.episodes,
            stats.wins,
            stats.losses,
            table.edge_count()
        );
        Ok(stats)
    }
}

fn progress_decile(count: usize, bound: usize) -> usize {
    if bound == 0 {
        10
    } else {
        (count.min(bound) * 10) / bound
    }
}
