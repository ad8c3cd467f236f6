//! Bellman value solver over the discovered graph.
//!
//! Each state's value is a mixture over every sampled action:
//!
//! ```text
//! V(s) = R(s) + gamma * sum_a sum_edges P(edge) * V(next)
//! ```
//!
//! Winning states are fixed at the win reward. The max over actions only
//! happens at decision time (see `policy`).
//!
//! Two methods are available:
//! - **Memoized**: depth-first evaluation with an explicit stack, a memo
//!   (`solved` flag) and a visiting set. A state reached again while still on
//!   the current path is reported as a cycle instead of recursing forever.
//! - **Value iteration**: Jacobi sweeps over every state until the largest
//!   change drops below a tolerance, for graphs that do contain cycles.
//!
//! `SolveMethod::Auto` runs the memoized solver and falls back to value
//! iteration when it meets a cycle.

use std::time::Instant;

use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::StateId;
use crate::core::GameConfig;
use crate::explore::StateTable;

/// Errors raised while solving.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolveError {
    #[error("state {0} is not in the table")]
    UnknownState(StateId),
    #[error("cycle detected through state {0}")]
    Cycle(StateId),
    #[error("evaluation depth exceeded the limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("value iteration did not converge after {sweeps} sweeps (residual {residual})")]
    NotConverged { sweeps: usize, residual: f64 },
}

/// Which algorithm computes the values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveMethod {
    /// Depth-first memoized evaluation; fails on cycles.
    Memoized,
    /// Iterate to a fixed point over all states.
    ValueIteration,
    /// Memoized, falling back to value iteration on a cycle.
    #[default]
    Auto,
}

/// Solver parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Algorithm to use.
    pub method: SolveMethod,

    /// Longest path the memoized solver will follow.
    pub max_depth: usize,

    /// Value iteration stops when the largest change is below this.
    pub tolerance: f64,

    /// Value iteration gives up after this many sweeps.
    pub max_sweeps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            method: SolveMethod::Auto,
            max_depth: 100_000,
            tolerance: 1e-9,
            max_sweeps: 10_000,
        }
    }
}

impl SolverConfig {
    #[must_use]
    pub fn with_method(mut self, method: SolveMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_max_sweeps(mut self, sweeps: usize) -> Self {
        self.max_sweeps = sweeps;
        self
    }
}

/// Statistics from one solve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Method that produced the values.
    pub method: SolveMethod,

    /// States whose value was computed.
    pub states_solved: usize,

    /// Deepest path followed by the memoized solver.
    pub max_depth: usize,

    /// Sweeps performed by value iteration (0 if not used).
    pub sweeps: usize,

    /// Final largest change of value iteration.
    pub residual: f64,

    /// Wall time (microseconds).
    pub time_us: u64,
}

/// Stack frame for the memoized solver.
struct Frame {
    id: StateId,
    expanded: bool,
}

/// Computes state values for a `StateTable`.
#[derive(Clone, Debug)]
pub struct ValueSolver {
    config: SolverConfig,
    gamma: f64,
    win_reward: f64,
}

impl ValueSolver {
    pub fn new(game: &GameConfig, config: SolverConfig) -> Self {
        Self {
            config,
            gamma: game.gamma,
            win_reward: game.win_reward,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve every state reachable from `root`.
    pub fn solve(&self, table: &mut StateTable, root: &StateId) -> Result<SolveStats, SolveError> {
        self.run(table, std::slice::from_ref(root))
    }

    /// Solve every state in the table that is not solved yet.
    pub fn solve_all(&self, table: &mut StateTable) -> Result<SolveStats, SolveError> {
        let roots: Vec<StateId> = table
            .sorted_ids()
            .into_iter()
            .filter(|id| table.get(id).map_or(false, |r| !r.solved))
            .collect();
        self.run(table, &roots)
    }

    fn run(&self, table: &mut StateTable, roots: &[StateId]) -> Result<SolveStats, SolveError> {
        let start = Instant::now();
        let mut stats = SolveStats {
            method: self.config.method,
            ..SolveStats::default()
        };

        match self.config.method {
            SolveMethod::Memoized => self.memoized_all(table, roots, &mut stats)?,
            SolveMethod::ValueIteration => self.value_iteration(table, &mut stats)?,
            SolveMethod::Auto => match self.memoized_all(table, roots, &mut stats) {
                Ok(()) => stats.method = SolveMethod::Memoized,
                Err(SolveError::Cycle(id)) => {
                    warn!("cycle through state {}, falling back to value iteration", id);
                    stats.method = SolveMethod::ValueIteration;
                    stats.states_solved = 0;
                    self.value_iteration(table, &mut stats)?;
                }
                Err(e) => return Err(e),
            },
        }

        stats.time_us = start.elapsed().as_micros() as u64;
        info!(
            "solved {} states ({:?}, max depth {}, {} sweeps)",
            stats.states_solved, stats.method, stats.max_depth, stats.sweeps
        );
        Ok(stats)
    }

    fn memoized_all(
        &self,
        table: &mut StateTable,
        roots: &[StateId],
        stats: &mut SolveStats,
    ) -> Result<(), SolveError> {
        for root in roots {
            self.memoized(table, root, stats)?;
        }
        Ok(())
    }

    /// Depth-first evaluation from `root` without call-stack recursion.
    fn memoized(
        &self,
        table: &mut StateTable,
        root: &StateId,
        stats: &mut SolveStats,
    ) -> Result<(), SolveError> {
        let mut stack = vec![Frame {
            id: root.clone(),
            expanded: false,
        }];
        let mut visiting: FxHashSet<StateId> = FxHashSet::default();

        while let Some(frame) = stack.last_mut() {
            let record = table
                .get(&frame.id)
                .ok_or_else(|| SolveError::UnknownState(frame.id.clone()))?;

            if record.solved {
                stack.pop();
                continue;
            }

            if frame.expanded {
                // Every successor was solved above this frame.
                let sum: f64 = record
                    .all_edges()
                    .map(|e| e.probability * table.get(&e.next).map_or(0.0, |t| t.value))
                    .sum();
                let value = record.reward + self.gamma * sum;
                let id = frame.id.clone();
                self.store(table, &id, value, stats);
                visiting.remove(&id);
                stack.pop();
                continue;
            }

            if record.reward == self.win_reward {
                let id = frame.id.clone();
                self.store(table, &id, self.win_reward, stats);
                stack.pop();
                continue;
            }

            if !visiting.insert(frame.id.clone()) {
                return Err(SolveError::Cycle(frame.id.clone()));
            }
            if visiting.len() > self.config.max_depth {
                return Err(SolveError::DepthExceeded {
                    limit: self.config.max_depth,
                });
            }
            stats.max_depth = stats.max_depth.max(visiting.len());

            let mut children = Vec::new();
            for edge in record.all_edges() {
                let target = table
                    .get(&edge.next)
                    .ok_or_else(|| SolveError::UnknownState(edge.next.clone()))?;
                if target.solved {
                    continue;
                }
                if visiting.contains(&edge.next) {
                    return Err(SolveError::Cycle(edge.next.clone()));
                }
                children.push(Frame {
                    id: edge.next.clone(),
                    expanded: false,
                });
            }
            frame.expanded = true;
            stack.extend(children);
        }
        Ok(())
    }

    /// Jacobi value iteration over every state in the table.
    fn value_iteration(
        &self,
        table: &mut StateTable,
        stats: &mut SolveStats,
    ) -> Result<(), SolveError> {
        let ids = table.sorted_ids();
        let index: FxHashMap<&StateId, usize> =
            ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

        struct Row {
            reward: f64,
            win: bool,
            edges: Vec<(f64, usize)>,
        }

        let mut rows = Vec::with_capacity(ids.len());
        let mut values = Vec::with_capacity(ids.len());
        for id in &ids {
            let record = table
                .get(id)
                .ok_or_else(|| SolveError::UnknownState(id.clone()))?;
            let mut edges = Vec::with_capacity(record.edge_count());
            for edge in record.all_edges() {
                let j = *index
                    .get(&edge.next)
                    .ok_or_else(|| SolveError::UnknownState(edge.next.clone()))?;
                edges.push((edge.probability, j));
            }
            rows.push(Row {
                reward: record.reward,
                win: record.reward == self.win_reward,
                edges,
            });
            values.push(record.value);
        }

        let mut residual = f64::INFINITY;
        for sweep in 1..=self.config.max_sweeps {
            let next: Vec<f64> = rows
                .iter()
                .map(|row| {
                    if row.win {
                        self.win_reward
                    } else {
                        let sum: f64 = row.edges.iter().map(|&(p, j)| p * values[j]).sum();
                        row.reward + self.gamma * sum
                    }
                })
                .collect();

            residual = next
                .iter()
                .zip(&values)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            values = next;

            if !residual.is_finite() || values.iter().any(|v| !v.is_finite()) {
                return Err(SolveError::NotConverged {
                    sweeps: sweep,
                    residual,
                });
            }
            if residual < self.config.tolerance {
                stats.sweeps = sweep;
                stats.residual = residual;
                for (id, value) in ids.iter().zip(values) {
                    self.store(table, id, value, stats);
                }
                return Ok(());
            }
        }

        Err(SolveError::NotConverged {
            sweeps: self.config.max_sweeps,
            residual,
        })
    }

    fn store(&self, table: &mut StateTable, id: &StateId, value: f64, stats: &mut SolveStats) {
        if let Some(record) = table.get_mut(id) {
            record.value = value;
            record.solved = true;
            stats.states_solved += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Action;
    use crate::explore::{StateRecord, TransitionEdge};

    fn id(raw: &str) -> StateId {
        StateId::new(raw)
    }

    fn solver(method: SolveMethod) -> ValueSolver {
        ValueSolver::new(&GameConfig::default(), SolverConfig::default().with_method(method))
    }

    fn win_record() -> StateRecord {
        StateRecord {
            reward: GameConfig::default().win_reward,
            ..StateRecord::new()
        }
    }

    /// a -> {b (0.5), c (0.5)}, b -> win, c dead end
    fn diamond() -> StateTable {
        let mut table = StateTable::new();
        for raw in ["a", "b", "c"] {
            table.insert_new(id(raw));
        }
        table.insert(id("w"), win_record());
        table.record_transition(&id("a"), Action::Left, TransitionEdge::new(0.5, id("b")));
        table.record_transition(&id("a"), Action::Left, TransitionEdge::new(0.5, id("c")));
        table.record_transition(&id("b"), Action::Up, TransitionEdge::new(1.0, id("w")));
        table
    }

    #[test]
    fn test_config_is_kept() {
        let config = SolverConfig::default()
            .with_method(SolveMethod::ValueIteration)
            .with_tolerance(1e-6);
        let solver = ValueSolver::new(&GameConfig::default(), config.clone());
        assert_eq!(solver.config(), &config);
    }

    #[test]
    fn test_single_win_state() {
        let mut table = StateTable::new();
        table.insert(id("w"), win_record());

        solver(SolveMethod::Memoized).solve(&mut table, &id("w")).unwrap();

        let record = table.get(&id("w")).unwrap();
        assert!(record.solved);
        assert_eq!(record.value, 100.0);
    }

    #[test]
    fn test_memoized_diamond() {
        let mut table = diamond();
        let stats = solver(SolveMethod::Memoized).solve(&mut table, &id("a")).unwrap();

        assert_eq!(table.get(&id("w")).unwrap().value, 100.0);
        assert!((table.get(&id("b")).unwrap().value - 90.0).abs() < 1e-12);
        assert_eq!(table.get(&id("c")).unwrap().value, 0.0);
        assert!((table.get(&id("a")).unwrap().value - 40.5).abs() < 1e-12);
        assert_eq!(stats.states_solved, 4);
        assert_eq!(stats.method, SolveMethod::Memoized);
    }

    #[test]
    fn test_value_iteration_matches_memoized() {
        let mut memo = diamond();
        solver(SolveMethod::Memoized).solve(&mut memo, &id("a")).unwrap();

        let mut iter = diamond();
        let stats = solver(SolveMethod::ValueIteration).solve(&mut iter, &id("a")).unwrap();

        for raw in ["a", "b", "c", "w"] {
            let a = memo.get(&id(raw)).unwrap().value;
            let b = iter.get(&id(raw)).unwrap().value;
            assert!((a - b).abs() < 1e-9, "{}: {} vs {}", raw, a, b);
        }
        assert!(stats.sweeps > 0);
    }

    #[test]
    fn test_memoized_rejects_cycle() {
        let mut table = StateTable::new();
        table.insert_new(id("a"));
        table.insert_new(id("b"));
        table.record_transition(&id("a"), Action::Left, TransitionEdge::new(0.5, id("b")));
        table.record_transition(&id("b"), Action::Left, TransitionEdge::new(0.5, id("a")));

        let err = solver(SolveMethod::Memoized).solve(&mut table, &id("a")).unwrap_err();
        assert!(matches!(err, SolveError::Cycle(_)));
    }

    #[test]
    fn test_auto_falls_back_on_cycle() {
        let mut table = StateTable::new();
        table.insert_new(id("a"));
        table.insert_new(id("b"));
        table.insert(id("w"), win_record());
        table.record_transition(&id("a"), Action::Left, TransitionEdge::new(0.5, id("b")));
        table.record_transition(&id("b"), Action::Left, TransitionEdge::new(0.5, id("a")));
        table.record_transition(&id("b"), Action::Up, TransitionEdge::new(0.5, id("w")));

        let stats = solver(SolveMethod::Auto).solve(&mut table, &id("a")).unwrap();

        assert_eq!(stats.method, SolveMethod::ValueIteration);
        // b = 0.9 * (0.5 a + 50), a = 0.45 b
        let b = 45.0 / (1.0 - 0.9 * 0.5 * 0.45);
        assert!((table.get(&id("b")).unwrap().value - b).abs() < 1e-6);
        assert!((table.get(&id("a")).unwrap().value - 0.45 * b).abs() < 1e-6);
    }

    #[test]
    fn test_self_loop_is_a_cycle() {
        let mut table = StateTable::new();
        table.insert_new(id("a"));
        table.record_transition(&id("a"), Action::Left, TransitionEdge::new(1.0, id("a")));

        let err = solver(SolveMethod::Memoized).solve(&mut table, &id("a")).unwrap_err();
        assert_eq!(err, SolveError::Cycle(id("a")));
    }

    #[test]
    fn test_unknown_target() {
        let mut table = StateTable::new();
        table.insert_new(id("a"));
        table.record_transition(&id("a"), Action::Left, TransitionEdge::new(1.0, id("zz")));

        let err = solver(SolveMethod::Memoized).solve(&mut table, &id("a")).unwrap_err();
        assert_eq!(err, SolveError::UnknownState(id("zz")));

        let err = solver(SolveMethod::ValueIteration).solve_all(&mut table).unwrap_err();
        assert_eq!(err, SolveError::UnknownState(id("zz")));

        let err = solver(SolveMethod::Memoized).solve(&mut table, &id("nope")).unwrap_err();
        assert_eq!(err, SolveError::UnknownState(id("nope")));
    }

    #[test]
    fn test_depth_limit() {
        let mut table = StateTable::new();
        let names: Vec<String> = (0..10).map(|i| format!("s{}", i)).collect();
        for name in &names {
            table.insert_new(id(name));
        }
        for pair in names.windows(2) {
            table.record_transition(
                &id(&pair[0]),
                Action::Down,
                TransitionEdge::new(1.0, id(&pair[1])),
            );
        }

        let limited = ValueSolver::new(
            &GameConfig::default(),
            SolverConfig::default()
                .with_method(SolveMethod::Memoized)
                .with_max_depth(5),
        );
        let err = limited.solve(&mut table, &id("s0")).unwrap_err();
        assert_eq!(err, SolveError::DepthExceeded { limit: 5 });

        let stats = solver(SolveMethod::Memoized).solve(&mut table, &id("s0")).unwrap();
        assert_eq!(stats.max_depth, 10);
    }

    #[test]
    fn test_value_iteration_divergence() {
        let mut table = StateTable::new();
        table.insert(
            id("a"),
            StateRecord {
                reward: 1.0,
                ..StateRecord::new()
            },
        );
        for action in Action::ALL {
            table.record_transition(&id("a"), action, TransitionEdge::new(1.0, id("a")));
        }

        let solver = ValueSolver::new(
            &GameConfig::default(),
            SolverConfig::default()
                .with_method(SolveMethod::ValueIteration)
                .with_max_sweeps(50),
        );
        let err = solver.solve_all(&mut table).unwrap_err();
        assert!(matches!(err, SolveError::NotConverged { sweeps: 50, .. }));
    }

    #[test]
    fn test_solve_all_covers_unreachable_states() {
        let mut table = diamond();
        table.insert_new(id("island"));

        solver(SolveMethod::Memoized).solve(&mut table, &id("a")).unwrap();
        assert!(!table.get(&id("island")).unwrap().solved);

        let stats = solver(SolveMethod::Memoized).solve_all(&mut table).unwrap();
        assert_eq!(stats.states_solved, 1);
        assert_eq!(table.solved_count(), table.len());
    }
}
