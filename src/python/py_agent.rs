//! Agent bindings for Python.

use pyo3::prelude::*;

use crate::agent::Agent;
use crate::board::{Environment, StateId};
use crate::core::GameConfig;
use crate::store::{Format, PolicyStore};

use super::py_core::{to_py_err, PyGameConfig};
use super::py_games::PyGame2048;

/// Python wrapper for Agent.
#[pyclass(name = "Agent")]
pub struct PyAgent {
    inner: Agent,
}

#[pymethods]
impl PyAgent {
    #[new]
    #[pyo3(signature = (rows = 2, cols = 2, target = 32, config = None))]
    fn new(rows: usize, cols: usize, target: u32, config: Option<PyGameConfig>) -> PyResult<Self> {
        let config = match config {
            Some(c) => c.0,
            None => GameConfig::default().with_dims(rows, cols).with_target(target),
        };
        let inner = Agent::new(config).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Explore until `bound` states are known. Returns the episode count.
    #[pyo3(signature = (game, bound = 400))]
    fn train(&mut self, game: &mut PyGame2048, bound: usize) -> PyResult<u64> {
        let stats = self
            .inner
            .train(&mut game.env, bound, &mut game.rng)
            .map_err(to_py_err)?;
        Ok(stats.episodes)
    }

    /// Solve every known state. Returns the number of states solved.
    fn create_policy(&mut self, game: &PyGame2048) -> PyResult<usize> {
        let stats = self.inner.create_policy(&game.env).map_err(to_py_err)?;
        Ok(stats.states_solved)
    }

    /// Best action index for an encoded state.
    fn forward(&self, state: &str) -> PyResult<usize> {
        let action = self
            .inner
            .forward(&StateId::new(state))
            .map_err(to_py_err)?;
        Ok(action.index())
    }

    /// Solved value of an encoded state.
    fn state_value(&self, state: &str) -> PyResult<f64> {
        self.inner
            .state_value(&StateId::new(state))
            .map_err(to_py_err)
    }

    /// (action index, state value) for the game's current board.
    fn decide(&self, game: &PyGame2048) -> PyResult<(usize, f64)> {
        let (action, value) = self.inner.decide(game.env.board()).map_err(to_py_err)?;
        Ok((action.index(), value))
    }

    /// Save into `dir`; `format` is "json" or "bin". Returns the file path.
    #[pyo3(signature = (dir = ".", format = "json"))]
    fn save(&self, dir: &str, format: &str) -> PyResult<String> {
        let format = match format {
            "json" => Format::Json,
            "bin" => Format::Bincode,
            other => {
                return Err(PyErr::new::<pyo3::exceptions::PyValueError, _>(format!(
                    "unknown format {:?}, expected \"json\" or \"bin\"",
                    other
                )))
            }
        };
        let store = PolicyStore::new(dir).with_format(format);
        let path = self.inner.save(&store).map_err(to_py_err)?;
        Ok(path.display().to_string())
    }

    /// Replace the table with a saved policy file.
    fn load(&mut self, path: &str) -> PyResult<()> {
        let store = PolicyStore::new(".");
        self.inner.load(&store, path).map_err(to_py_err)
    }

    #[getter]
    fn state_count(&self) -> usize {
        self.inner.state_count()
    }

    fn __repr__(&self) -> String {
        let config = self.inner.config();
        format!(
            "Agent({}x{}, target={}, states={}, solved={})",
            config.rows,
            config.cols,
            config.target,
            self.inner.state_count(),
            self.inner.table().solved_count()
        )
    }
}
