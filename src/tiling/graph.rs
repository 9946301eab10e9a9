use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable handle to one corner-node. Generational index via SlotMap —
    /// safe to hold across insertions and removals.
    pub struct CornerKey;
    /// Stable handle to one tile payload (shared by its four corner-nodes).
    pub struct TileKey;
}

/// What a tile is made of.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Space,
    /// Freshly materialized tiles start as walls until a level record says
    /// otherwise.
    #[default]
    Wall,
    Target,
}

/// What currently sits on a tile. The player is not an agent; the board
/// tracks it separately as a corner-node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Agent {
    #[default]
    None,
    Box,
}

impl TryFrom<u8> for TileType {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        match code {
            0 => Ok(Self::Space),
            1 => Ok(Self::Wall),
            2 => Ok(Self::Target),
            other => Err(other),
        }
    }
}

impl From<TileType> for u8 {
    fn from(tile_type: TileType) -> u8 {
        match tile_type {
            TileType::Space => 0,
            TileType::Wall => 1,
            TileType::Target => 2,
        }
    }
}

impl TryFrom<u8> for Agent {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Box),
            other => Err(other),
        }
    }
}

impl From<Agent> for u8 {
    fn from(agent: Agent) -> u8 {
        match agent {
            Agent::None => 0,
            Agent::Box => 1,
        }
    }
}

/// Payload of one square cell, shared by the four corner-nodes of its ring.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tile {
    pub tile_type: TileType,
    pub agent: Agent,
    /// Transient traversal marker. Meaningless between traversals; every
    /// graph-wide walk clears it before and after use.
    pub(crate) visited: bool,
}

/// One of the four structural records per tile. `rotate` closes a 4-cycle
/// through the tile's own corners (clockwise); `across` pairs this corner
/// with the matching corner of the neighbor sharing the edge, if that
/// neighbor has been materialized.
#[derive(Clone, Copy, Debug)]
struct Corner {
    rotate: CornerKey,
    across: Option<CornerKey>,
    tile: TileKey,
}

/// The {4,5} tessellation graph: squares, five around every vertex, grown
/// lazily tile by tile.
///
/// There is no coordinate system. Adjacency lives entirely in the
/// `rotate`/`across` links, and both relations are arena-key lookups, so the
/// heavily cyclic structure (4-cycles per tile, 5-cycles per vertex) needs no
/// owning references.
#[derive(Debug, Default)]
pub struct Tessellation {
    corners: SlotMap<CornerKey, Corner>,
    tiles: SlotMap<TileKey, Tile>,
}

impl Tessellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates one fresh tile (default Wall, no agent) with its 4-corner
    /// ring and returns one of its corners. No links to the rest of the
    /// graph are made.
    pub fn make_tile(&mut self) -> CornerKey {
        let tile = self.tiles.insert(Tile::default());
        let mut ring = [CornerKey::default(); 4];
        for corner in ring.iter_mut() {
            *corner = self.corners.insert(Corner {
                rotate: CornerKey::default(),
                across: None,
                tile,
            });
        }
        for i in 0..4 {
            self.corners[ring[i]].rotate = ring[(i + 1) % 4];
        }
        ring[0]
    }

    /// The next corner clockwise in `corner`'s ring.
    pub fn rotate(&self, corner: CornerKey) -> CornerKey {
        self.corners[corner].rotate
    }

    /// `rotate` applied `turns` times.
    pub fn rotate_n(&self, corner: CornerKey, turns: usize) -> CornerKey {
        let mut out = corner;
        for _ in 0..turns % 4 {
            out = self.rotate(out);
        }
        out
    }

    /// The corner two steps around the ring. Crossing an edge lands on the
    /// matching corner of the neighbor; composing `opposite` afterwards
    /// realigns to "keep going the same way".
    pub fn opposite(&self, corner: CornerKey) -> CornerKey {
        self.rotate(self.rotate(corner))
    }

    /// The next corner counter-clockwise, i.e. `rotate` three times.
    pub fn rotate_ccw(&self, corner: CornerKey) -> CornerKey {
        self.rotate(self.opposite(corner))
    }

    /// The matching corner across the edge leaving `corner`, or `None` if
    /// that neighbor has not been materialized yet.
    pub fn cross(&self, corner: CornerKey) -> Option<CornerKey> {
        self.corners[corner].across
    }

    /// Pairs `a` and `b` across a shared edge, symmetrically. Callers pass
    /// the two edge corners directly; orientation is realigned at traversal
    /// time with [`opposite`](Self::opposite), never baked into the link.
    pub fn link(&mut self, a: CornerKey, b: CornerKey) {
        debug_assert!(self.corners[a].across.map_or(true, |prev| prev == b));
        debug_assert!(self.corners[b].across.map_or(true, |prev| prev == a));
        self.corners[a].across = Some(b);
        self.corners[b].across = Some(a);
    }

    /// The payload of the tile owning `corner`.
    pub fn tile(&self, corner: CornerKey) -> &Tile {
        &self.tiles[self.corners[corner].tile]
    }

    pub fn tile_mut(&mut self, corner: CornerKey) -> &mut Tile {
        &mut self.tiles[self.corners[corner].tile]
    }

    /// Whether two corners belong to the same tile's ring.
    pub fn same_tile(&self, a: CornerKey, b: CornerKey) -> bool {
        self.corners[a].tile == self.corners[b].tile
    }

    /// All four corners of `corner`'s ring, starting from `corner`.
    pub fn ring(&self, corner: CornerKey) -> [CornerKey; 4] {
        let a = corner;
        let b = self.rotate(a);
        let c = self.rotate(b);
        let d = self.rotate(c);
        [a, b, c, d]
    }

    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn corner_keys(&self) -> impl Iterator<Item = CornerKey> + '_ {
        self.corners.keys()
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.values()
    }

    /// Frees every corner-node and tile reachable from `root` through
    /// `rotate`/`across` links. Work-list traversal; the visited flag
    /// guarantees each tile is handled exactly once despite the many short
    /// cycles around faces and vertices. Unreachable tiles (from other
    /// graphs sharing this arena) are untouched.
    pub fn teardown(&mut self, root: CornerKey) {
        let mut stack = vec![root];
        let mut doomed_corners = Vec::new();
        let mut doomed_tiles = Vec::new();

        while let Some(corner) = stack.pop() {
            let Some(record) = self.corners.get(corner) else {
                continue;
            };
            let tile = record.tile;
            if self.tiles[tile].visited {
                continue;
            }
            self.tiles[tile].visited = true;
            doomed_tiles.push(tile);
            for ring_corner in self.ring(corner) {
                doomed_corners.push(ring_corner);
                if let Some(adjacent) = self.corners[ring_corner].across {
                    stack.push(adjacent);
                }
            }
        }

        for corner in doomed_corners {
            self.corners.remove(corner);
        }
        for tile in doomed_tiles {
            self.tiles.remove(tile);
        }
    }

    /// Clears the transient visited flag on every tile in the arena.
    pub(crate) fn reset_visited(&mut self) {
        for tile in self.tiles.values_mut() {
            tile.visited = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_closes_in_four() {
        let mut graph = Tessellation::new();
        let corner = graph.make_tile();
        assert_eq!(graph.rotate_n(corner, 4), corner);
        assert_ne!(graph.rotate(corner), corner);
        assert_eq!(graph.opposite(graph.opposite(corner)), corner);
        assert_eq!(graph.rotate(graph.rotate_ccw(corner)), corner);
    }

    #[test]
    fn fresh_tile_defaults_to_wall() {
        let mut graph = Tessellation::new();
        let corner = graph.make_tile();
        assert_eq!(graph.tile(corner).tile_type, TileType::Wall);
        assert_eq!(graph.tile(corner).agent, Agent::None);
        assert_eq!(graph.tile_count(), 1);
        assert_eq!(graph.corner_count(), 4);
    }

    #[test]
    fn link_is_symmetric() {
        let mut graph = Tessellation::new();
        let a = graph.make_tile();
        let b = graph.make_tile();
        assert_eq!(graph.cross(a), None);
        graph.link(a, b);
        assert_eq!(graph.cross(a), Some(b));
        assert_eq!(graph.cross(b), Some(a));
        // the other ring corners stay open
        assert_eq!(graph.cross(graph.rotate(a)), None);
    }

    #[test]
    fn teardown_handles_cycles() {
        let mut graph = Tessellation::new();
        // two tiles linked across two different edges form a 2-cycle of
        // across links; traversal must still terminate
        let a = graph.make_tile();
        let b = graph.make_tile();
        graph.link(a, b);
        graph.link(graph.rotate(a), graph.rotate_ccw(b));
        graph.teardown(a);
        assert_eq!(graph.tile_count(), 0);
        assert_eq!(graph.corner_count(), 0);
    }

    #[test]
    fn teardown_spares_unreachable_tiles() {
        let mut graph = Tessellation::new();
        let a = graph.make_tile();
        let island = graph.make_tile();
        graph.teardown(a);
        assert_eq!(graph.tile_count(), 1);
        assert_eq!(graph.corner_count(), 4);
        assert_eq!(graph.rotate_n(island, 4), island);
    }

    #[test]
    fn wire_codes_round_trip() {
        for tile_type in [TileType::Space, TileType::Wall, TileType::Target] {
            assert_eq!(TileType::try_from(u8::from(tile_type)), Ok(tile_type));
        }
        for agent in [Agent::None, Agent::Box] {
            assert_eq!(Agent::try_from(u8::from(agent)), Ok(agent));
        }
        assert_eq!(TileType::try_from(3), Err(3));
        assert_eq!(Agent::try_from(9), Err(9));
    }
}
