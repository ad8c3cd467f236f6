//! Discovered-state table.
//!
//! `StateTable` maps each `StateId` to a `StateRecord` holding the reward,
//! the solved value and, per action, the observed outgoing edges. It is the
//! only persisted artifact and grows monotonically during exploration.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::{BoardError, StateId};
use crate::core::Action;

/// One observed stochastic outcome of taking an action.
///
/// Serialized as the pair `[probability, "nextStateId"]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, StateId)", into = "(f64, StateId)")]
pub struct TransitionEdge {
    /// Edge weight used by the solver.
    pub probability: f64,
    /// State reached.
    pub next: StateId,
}

impl TransitionEdge {
    pub fn new(probability: f64, next: StateId) -> Self {
        Self { probability, next }
    }
}

impl From<(f64, StateId)> for TransitionEdge {
    fn from((probability, next): (f64, StateId)) -> Self {
        Self { probability, next }
    }
}

impl From<TransitionEdge> for (f64, StateId) {
    fn from(edge: TransitionEdge) -> Self {
        (edge.probability, edge.next)
    }
}

/// Edges observed for one action.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionEdges {
    /// Most actions see only a handful of distinct outcomes.
    pub edges: SmallVec<[TransitionEdge; 4]>,
}

/// Per-state reward, value and outgoing edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Immediate reward (win reward for winning states, else 0).
    pub reward: f64,

    /// Solved value.
    pub value: f64,

    /// Whether `value` has been computed.
    pub solved: bool,

    /// Edges per action, indexed by `Action::index`.
    #[serde(with = "action_map")]
    pub actions: [ActionEdges; 4],
}

impl StateRecord {
    /// Fresh record: zero reward, zero value, unsolved, no edges.
    pub fn new() -> Self {
        Self::default()
    }

    /// Edges recorded for `action`.
    #[inline]
    #[must_use]
    pub fn edges(&self, action: Action) -> &[TransitionEdge] {
        &self.actions[action.index()].edges
    }

    /// All edges across all actions, in action order.
    pub fn all_edges(&self) -> impl Iterator<Item = &TransitionEdge> {
        self.actions.iter().flat_map(|a| a.edges.iter())
    }

    /// Add an edge unless an identical `(probability, next)` pair exists.
    ///
    /// Returns true if the edge was added.
    pub fn add_edge(&mut self, action: Action, edge: TransitionEdge) -> bool {
        let edges = &mut self.actions[action.index()].edges;
        if edges.contains(&edge) {
            return false;
        }
        edges.push(edge);
        true
    }

    /// Total number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.actions.iter().map(|a| a.edges.len()).sum()
    }
}

/// Mapping `StateId -> StateRecord`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateTable {
    records: FxHashMap<StateId, StateRecord>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &StateId) -> bool {
        self.records.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &StateId) -> Option<&StateRecord> {
        self.records.get(id)
    }

    pub fn get_mut(&mut self, id: &StateId) -> Option<&mut StateRecord> {
        self.records.get_mut(id)
    }

    /// Register an unseen state. Returns false if it was already known.
    pub fn insert_new(&mut self, id: StateId) -> bool {
        if self.records.contains_key(&id) {
            return false;
        }
        self.records.insert(id, StateRecord::new());
        true
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, id: StateId, record: StateRecord) {
        self.records.insert(id, record);
    }

    /// Record an edge for `(state, action)`.
    ///
    /// Returns true if a new edge was stored; false for duplicates and for
    /// unknown source states.
    pub fn record_transition(
        &mut self,
        state: &StateId,
        action: Action,
        edge: TransitionEdge,
    ) -> bool {
        self.records
            .get_mut(state)
            .map_or(false, |record| record.add_edge(action, edge))
    }

    /// Iterate over all records.
    pub fn iter(&self) -> impl Iterator<Item = (&StateId, &StateRecord)> {
        self.records.iter()
    }

    /// All ids in sorted order, for deterministic traversal.
    #[must_use]
    pub fn sorted_ids(&self) -> Vec<StateId> {
        let mut ids: Vec<StateId> = self.records.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }

    /// Total number of edges in the table.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.records.values().map(StateRecord::edge_count).sum()
    }

    /// Number of records with a computed value.
    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.records.values().filter(|r| r.solved).count()
    }

    /// Mark every value as unsolved, e.g. before re-solving with a new discount.
    pub fn clear_values(&mut self) {
        for record in self.records.values_mut() {
            record.value = 0.0;
            record.solved = false;
        }
    }

    /// Check every id, and every edge target, decodes into a `rows` x `cols` board.
    pub fn validate_shape(&self, rows: usize, cols: usize) -> Result<(), BoardError> {
        for (id, record) in &self.records {
            id.decode(rows, cols)?;
            for edge in record.all_edges() {
                edge.next.decode(rows, cols)?;
            }
        }
        Ok(())
    }
}

/// Serialize the four edge lists as a map keyed by action index.
mod action_map {
    use super::*;
    use serde::de::Error as _;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        actions: &[ActionEdges; 4],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<u8, &ActionEdges> = actions
            .iter()
            .enumerate()
            .map(|(i, edges)| (i as u8, edges))
            .collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[ActionEdges; 4], D::Error> {
        let map = BTreeMap::<u8, ActionEdges>::deserialize(deserializer)?;
        let mut actions: [ActionEdges; 4] = Default::default();
        for (index, edges) in map {
            let slot = actions
                .get_mut(index as usize)
                .ok_or_else(|| D::Error::custom(format!("action index {} out of range", index)))?;
            *slot = edges;
        }
        Ok(actions)
    }
}
