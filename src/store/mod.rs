//! Persistence of the discovered-state table.
//!
//! A policy file holds the whole `StateTable`. Its name encodes the board
//! shape, the number of states and the win target, e.g.
//! `policy2x2st400m32.json`. Loading replaces a table wholesale.

pub mod policy_file;

pub use policy_file::{Format, PolicyStore, StoreError};
