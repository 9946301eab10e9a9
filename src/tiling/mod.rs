//! The {4,5} tessellation: graph structure, lazy growth, and the path
//! codec.

pub mod builder;
pub mod codec;
pub mod graph;
