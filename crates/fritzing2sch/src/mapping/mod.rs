//! Mapping utilities for Fritzing → design model translation

mod geometry;
mod nets;

pub use geometry::{get_length, get_x, get_y, make_length, make_x, make_y, rotation_from_matrix};
pub use nets::{resolve_nets, TerminalId};
