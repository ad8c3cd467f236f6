//! Game bindings for Python.

use numpy::{PyArray1, PyArray2, PyArrayMethods};
use pyo3::prelude::*;

use crate::board::{Environment, Game2048, StateId};
use crate::core::GameRng;

use super::py_core::{action_from_index, to_py_err, PyGameConfig};

/// Python wrapper for Game2048.
///
/// Owns its own RNG so Python callers never handle one.
#[pyclass(name = "Game2048")]
pub struct PyGame2048 {
    pub(crate) env: Game2048,
    pub(crate) rng: GameRng,
}

#[pymethods]
impl PyGame2048 {
    /// Create a new game.
    ///
    /// Pass `config` to override the keyword defaults.
    #[new]
    #[pyo3(signature = (rows = 2, cols = 2, target = 32, seed = 42, config = None))]
    fn new(
        rows: usize,
        cols: usize,
        target: u32,
        seed: u64,
        config: Option<PyGameConfig>,
    ) -> PyResult<Self> {
        let config = match config {
            Some(c) => c.0,
            None => crate::core::GameConfig::default()
                .with_dims(rows, cols)
                .with_target(target)
                .with_seed(seed),
        };
        let rng = GameRng::new(config.seed);
        let env = Game2048::new(config).map_err(|e| to_py_err(e.into()))?;
        Ok(Self { env, rng })
    }

    /// Start an episode: fresh if `state` is None, else from the encoded state.
    #[pyo3(signature = (state = None))]
    fn reset(&mut self, state: Option<String>) -> PyResult<()> {
        let start = state.map(StateId::new);
        self.env
            .reset(start.as_ref(), &mut self.rng)
            .map_err(|e| to_py_err(e.into()))
    }

    /// Apply an action index (0=Left, 1=Up, 2=Right, 3=Down).
    fn apply(&mut self, action: usize) -> PyResult<()> {
        let action = action_from_index(action)?;
        self.env.apply(action, &mut self.rng);
        Ok(())
    }

    /// Board as a [rows, cols] uint32 array.
    fn board<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<u32>>> {
        let board = self.env.board();
        PyArray1::from_slice_bound(py, board.cells())
            .reshape([board.rows(), board.cols()])
            .map_err(|e| PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}", e)))
    }

    /// Encoded id of the current board.
    fn state_id(&self) -> PyResult<String> {
        self.env
            .encoded_state()
            .map(|id| id.as_str().to_string())
            .map_err(|e| to_py_err(e.into()))
    }

    /// Encoded id of the canonical start state, if any.
    fn start_state(&self) -> Option<String> {
        self.env
            .canonical_start_state()
            .map(|id| id.as_str().to_string())
    }

    fn is_terminal(&self) -> bool {
        self.env.is_terminal()
    }

    fn is_win(&self) -> bool {
        self.env.is_win()
    }

    fn free_tile_count(&self) -> usize {
        self.env.free_tile_count()
    }

    fn board_value(&self) -> u64 {
        self.env.board_value()
    }

    fn max_tile_value(&self) -> u32 {
        self.env.max_tile_value()
    }

    fn __repr__(&self) -> String {
        format!("Game2048(\n{})", self.env.board())
    }
}
