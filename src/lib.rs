//! Sokoban on the hyperbolic plane.
//!
//! The playing field is the regular {4,5} tessellation: square tiles, five
//! meeting at every vertex, so the plane opens up exponentially in every
//! direction. There is no coordinate system anywhere in this crate — the
//! field is a combinatorial graph of corner-nodes grown lazily, tile by
//! tile, while a local invariant (exactly five tiles around every vertex)
//! is maintained purely by link rewiring. Rendering, projections and input
//! are host concerns; consumers walk the graph and draw it however they
//! like.
//!
//! - [`tiling`] holds the graph arena, the incremental builder with its
//!   vertex-completion sweeps, and the breadth-first path codec.
//! - [`game`] holds level records, the playable [`Board`], the move/undo
//!   engine, and a random room generator.

pub mod game;
pub mod tiling;

pub use game::board::Board;
pub use game::generator::{generate_board, GeneratorParams};
pub use game::level::{Level, LevelMeta, TileRecord};
pub use game::moves::{Direction, MoveOutcome, ALL_DIRECTIONS};
pub use tiling::builder::{add_tile, build_graph, ensure_neighbor, walk_path, wall_in, BuildError};
pub use tiling::codec::{decode, encode};
pub use tiling::graph::{Agent, CornerKey, Tessellation, Tile, TileType};
