//! Greedy decision rule over solved values.
//!
//! The value of taking action `a` in state `s` is the weighted sum of the
//! solved values of the states its edges lead to. The best action is the
//! argmax over the four actions, keeping the lowest index on ties.
//!
//! Lookups never recurse and never fall back to a default: a state the
//! explorer did not discover, or one the solver has not reached, is an error.

use thiserror::Error;

use crate::board::StateId;
use crate::core::Action;
use crate::explore::StateTable;

/// Errors raised by policy lookups.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("state {0} was never discovered")]
    UnknownState(StateId),
    #[error("state {0} has no solved value")]
    Unsolved(StateId),
}

/// Picks the action with the highest expected successor value.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Expected successor value for each action, in index order.
    ///
    /// Actions without recorded edges score 0.
    pub fn action_values(
        &self,
        table: &StateTable,
        state: &StateId,
    ) -> Result<[f64; 4], PolicyError> {
        let record = table
            .get(state)
            .ok_or_else(|| PolicyError::UnknownState(state.clone()))?;
        if !record.solved {
            return Err(PolicyError::Unsolved(state.clone()));
        }

        let mut values = [0.0; Action::COUNT];
        for action in Action::ALL {
            for edge in record.edges(action) {
                let target = table
                    .get(&edge.next)
                    .ok_or_else(|| PolicyError::UnknownState(edge.next.clone()))?;
                if !target.solved {
                    return Err(PolicyError::Unsolved(edge.next.clone()));
                }
                values[action.index()] += edge.probability * target.value;
            }
        }
        Ok(values)
    }

    /// Best action for `state`.
    pub fn best_action(&self, table: &StateTable, state: &StateId) -> Result<Action, PolicyError> {
        let values = self.action_values(table, state)?;
        Ok(argmax(&values))
    }
}

/// Index of the largest value; the first one wins ties.
fn argmax(values: &[f64; 4]) -> Action {
    let mut best = 0;
    for i in 1..values.len() {
        if values[i] > values[best] {
            best = i;
        }
    }
    Action::ALL[best]
}
