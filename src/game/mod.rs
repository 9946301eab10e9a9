//! Gameplay on top of the tessellation: levels, boards, moves, and the
//! random room generator.

pub mod board;
pub mod generator;
pub mod level;
pub mod moves;
