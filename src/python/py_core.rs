//! Core type bindings for Python.

use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;

use crate::core::{Action, GameConfig};
use crate::error::Error;
use crate::store::StoreError;

/// Map a crate error onto the closest Python exception.
pub(crate) fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::Store(StoreError::Io(e)) => PyIOError::new_err(e.to_string()),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// Parse an action index coming from Python.
pub(crate) fn action_from_index(index: usize) -> PyResult<Action> {
    Action::from_index(index)
        .ok_or_else(|| PyValueError::new_err(format!("action index {} out of range 0..4", index)))
}

/// Arrow glyph for an action index (0=Left, 1=Up, 2=Right, 3=Down).
#[pyfunction]
pub fn action_arrow(index: usize) -> PyResult<String> {
    Ok(action_from_index(index)?.arrow().to_string())
}

/// Python wrapper for GameConfig.
#[pyclass(name = "GameConfig")]
#[derive(Clone, Debug)]
pub struct PyGameConfig(pub GameConfig);

#[pymethods]
impl PyGameConfig {
    #[new]
    #[pyo3(signature = (
        rows = 2,
        cols = 2,
        target = 32,
        win_reward = 100.0,
        gamma = 0.9,
        prob_of_2 = 0.9,
        prob_of_4 = 0.1,
        seed = 42
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        rows: usize,
        cols: usize,
        target: u32,
        win_reward: f64,
        gamma: f64,
        prob_of_2: f64,
        prob_of_4: f64,
        seed: u64,
    ) -> PyResult<Self> {
        let config = GameConfig::default()
            .with_dims(rows, cols)
            .with_target(target)
            .with_win_reward(win_reward)
            .with_gamma(gamma)
            .with_spawn_probabilities(prob_of_2, prob_of_4)
            .with_seed(seed);
        config
            .validate()
            .map_err(|e| to_py_err(e.into()))?;
        Ok(Self(config))
    }

    #[getter]
    fn rows(&self) -> usize {
        self.0.rows
    }

    #[getter]
    fn cols(&self) -> usize {
        self.0.cols
    }

    #[getter]
    fn target(&self) -> u32 {
        self.0.target
    }

    #[getter]
    fn win_reward(&self) -> f64 {
        self.0.win_reward
    }

    #[getter]
    fn gamma(&self) -> f64 {
        self.0.gamma
    }

    #[getter]
    fn seed(&self) -> u64 {
        self.0.seed
    }

    fn __repr__(&self) -> String {
        format!(
            "GameConfig(rows={}, cols={}, target={}, gamma={})",
            self.0.rows, self.0.cols, self.0.target, self.0.gamma
        )
    }
}
