use log::debug;

use super::level::{Level, LevelMeta};
use crate::tiling::builder::{build_graph, walk_path, BuildError};
use crate::tiling::codec::encode;
use crate::tiling::graph::{Agent, CornerKey, Tessellation, TileType};

/// A playable board: the grown tessellation graph, the player's position
/// (a corner-node, i.e. a tile plus a facing), the move history, and the
/// count of boxes still off target.
///
/// All mutation goes through [`perform_move`](Board::perform_move) and
/// [`unperform_move`](Board::unperform_move); everything else is read-only.
pub struct Board {
    pub(crate) graph: Tessellation,
    pub(crate) position: CornerKey,
    pub(crate) moves: String,
    pub(crate) unsolved: usize,
    pub meta: LevelMeta,
}

impl Board {
    /// Builds the graph from a level and places the player. Fails if any
    /// record path is malformed or out of order, or if the start path
    /// walks off the built region.
    pub fn assemble(level: &Level) -> Result<Self, BuildError> {
        let (graph, origin) = build_graph(&level.tiles)?;
        let position = match &level.start {
            Some(path) => walk_path(&graph, origin, path)?,
            None => origin,
        };
        let board = Self::from_graph(graph, position, level.meta.clone());
        debug!(
            "assembled board: {} tiles, {} unsolved",
            board.graph.tile_count(),
            board.unsolved
        );
        Ok(board)
    }

    /// Wraps an already-grown graph as a board. The unsolved count is taken
    /// from the graph itself: one per box sitting on a non-Target tile.
    pub fn from_graph(graph: Tessellation, position: CornerKey, meta: LevelMeta) -> Self {
        let unsolved = graph
            .tiles()
            .filter(|tile| tile.agent == Agent::Box && tile.tile_type != TileType::Target)
            .count();
        Self {
            graph,
            position,
            moves: String::new(),
            unsolved,
            meta,
        }
    }

    /// Boxes not yet sitting on a target.
    pub fn unsolved(&self) -> usize {
        self.unsolved
    }

    pub fn is_solved(&self) -> bool {
        self.unsolved == 0
    }

    /// Moves played so far, one letter each: `u/r/d/l` for walks, the
    /// uppercase letter for pushes.
    pub fn moves(&self) -> &str {
        &self.moves
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// The player's corner-node: the tile stood on plus the facing frame
    /// moves are interpreted in.
    pub fn position(&self) -> CornerKey {
        self.position
    }

    pub fn graph(&self) -> &Tessellation {
        &self.graph
    }

    /// Re-derives a record list for the current graph state, with paths
    /// relative to the player's position. Feeding the result back through
    /// [`Board::assemble`] reproduces the same playable state.
    pub fn save(&mut self) -> Vec<super::level::TileRecord> {
        encode(&mut self.graph, self.position)
    }
}
