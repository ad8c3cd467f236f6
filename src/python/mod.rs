//! Python bindings for rust-2048.
//!
//! This is the host boundary: a host renders the board it gets from
//! `Game2048.board()` and asks the `Agent` for the move and the value to
//! display.
//!
//! # Quick Start
//!
//! ```python
//! import rust_2048 as r2048
//!
//! game = r2048.Game2048(rows=2, cols=2, target=32, seed=42)
//! agent = r2048.Agent(rows=2, cols=2, target=32)
//!
//! agent.train(game, bound=400)
//! agent.create_policy(game)
//!
//! game.reset()
//! while not game.is_terminal() and not game.is_win():
//!     action, value = agent.decide(game)
//!     game.apply(action)
//! ```

use pyo3::prelude::*;

mod py_agent;
mod py_core;
mod py_games;

pub use py_agent::*;
pub use py_core::*;
pub use py_games::*;

/// rust-2048: exact planning for small 2048 boards.
#[pymodule]
fn rust_2048(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyGameConfig>()?;
    m.add_class::<PyGame2048>()?;
    m.add_class::<PyAgent>()?;

    m.add_function(wrap_pyfunction!(action_arrow, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
