use serde::{Deserialize, Serialize};

use super::board::Board;
use crate::tiling::graph::{Agent, TileType};

/// A move direction, interpreted in the player's current facing frame:
/// `Up` crosses the faced edge, the others rotate first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

pub const ALL_DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Right,
    Direction::Down,
    Direction::Left,
];

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Clockwise quarter-turns from the faced edge.
    fn turns(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    fn walk_letter(self) -> char {
        match self {
            Self::Up => 'u',
            Self::Right => 'r',
            Self::Down => 'd',
            Self::Left => 'l',
        }
    }

    fn push_letter(self) -> char {
        self.walk_letter().to_ascii_uppercase()
    }

    /// Decodes a history letter back into (direction, was_push).
    fn from_letter(letter: char) -> Option<(Self, bool)> {
        let direction = match letter.to_ascii_lowercase() {
            'u' => Self::Up,
            'r' => Self::Right,
            'd' => Self::Down,
            'l' => Self::Left,
            _ => return None,
        };
        Some((direction, letter.is_ascii_uppercase()))
    }
}

/// What a call to [`Board::perform_move`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Blocked; nothing changed and nothing was recorded.
    NoMove,
    Walk,
    Push,
}

impl Board {
    /// Attempts to move the player one tile in `direction`.
    ///
    /// Walks onto empty non-Wall tiles; pushes a box if the tile behind it
    /// is free; refuses (without mutating anything) if the way is blocked.
    /// Successful moves append one history letter and keep the facing frame
    /// stable, so a repeated direction keeps heading the same way.
    pub fn perform_move(&mut self, direction: Direction) -> MoveOutcome {
        let turns = direction.turns();
        let facing = self.graph.rotate_n(self.position, turns);
        // tiles the player can stand on are always walled in, so this only
        // trips on a raw, never-walled graph
        let Some(entry) = self.graph.cross(facing) else {
            return MoveOutcome::NoMove;
        };
        let target = self.graph.opposite(entry);

        if self.graph.tile(target).tile_type == TileType::Wall {
            return MoveOutcome::NoMove;
        }

        if self.graph.tile(target).agent == Agent::None {
            self.position = self.graph.rotate_n(target, 4 - turns);
            self.moves.push(direction.walk_letter());
            return MoveOutcome::Walk;
        }

        // a box: look at the tile behind it, in the same direction
        let Some(behind_entry) = self.graph.cross(target) else {
            return MoveOutcome::NoMove;
        };
        let behind = self.graph.opposite(behind_entry);
        let behind_tile = self.graph.tile(behind);
        if behind_tile.tile_type == TileType::Wall || behind_tile.agent == Agent::Box {
            return MoveOutcome::NoMove;
        }

        self.graph.tile_mut(target).agent = Agent::None;
        self.graph.tile_mut(behind).agent = Agent::Box;
        if self.graph.tile(target).tile_type == TileType::Target {
            self.unsolved += 1;
        }
        if self.graph.tile(behind).tile_type == TileType::Target {
            self.unsolved -= 1;
        }
        self.position = self.graph.rotate_n(target, 4 - turns);
        self.moves.push(direction.push_letter());
        MoveOutcome::Push
    }

    /// Undoes the most recent move, restoring position, unsolved count and
    /// history exactly, and returns that move's direction.
    ///
    /// Returns `None` without mutating anything if there is no history, the
    /// last history letter is unrecognized, or the board no longer matches
    /// what the letter claims (missing back edge, missing box) — an undo can
    /// never panic the engine.
    pub fn unperform_move(&mut self) -> Option<Direction> {
        let letter = self.moves.chars().next_back()?;
        let (direction, was_push) = Direction::from_letter(letter)?;
        let turns = direction.turns();

        let ahead_edge = self.graph.rotate_n(self.position, turns);
        let back_edge = self.graph.opposite(ahead_edge);
        // the wall-in invariant guarantees this edge, but never trust a
        // history string over the graph
        let back_entry = self.graph.cross(back_edge)?;

        if was_push {
            let box_entry = self.graph.cross(ahead_edge)?;
            if self.graph.tile(box_entry).agent != Agent::Box {
                return None;
            }
            self.graph.tile_mut(box_entry).agent = Agent::None;
            self.graph.tile_mut(self.position).agent = Agent::Box;
            if self.graph.tile(box_entry).tile_type == TileType::Target {
                self.unsolved += 1;
            }
            if self.graph.tile(self.position).tile_type == TileType::Target {
                self.unsolved -= 1;
            }
        }

        self.position = self.graph.rotate_n(back_entry, 4 - turns);
        self.moves.pop();
        Some(direction)
    }
}
