use std::fmt;

use log::debug;
use smallvec::SmallVec;

use super::graph::{CornerKey, Tessellation, TileType};
use crate::game::level::TileRecord;

/// Why a level refused to build. Any error aborts the whole build; no
/// partially grown graph is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// A path byte outside `{F, L, B, R}` (either case).
    BadPathByte { byte: char, index: usize },
    /// A non-final `F` tried to cross an edge whose far tile has not been
    /// placed yet — the level records are out of order.
    ForwardOffGraph { index: usize },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadPathByte { byte, index } => {
                write!(f, "invalid path byte {byte:?} at offset {index}")
            }
            Self::ForwardOffGraph { index } => {
                write!(f, "path crosses an unbuilt edge at offset {index}")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// One step of the `F/L/B/R` path language. Turns are clockwise
/// quarter-turns of the cursor corner: `L` one, `B` two, `R` three.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PathStep {
    Forward,
    Left,
    Back,
    Right,
}

pub(crate) type ParsedPath = SmallVec<[PathStep; 24]>;

pub(crate) fn parse_path(path: &str) -> Result<ParsedPath, BuildError> {
    path.chars()
        .enumerate()
        .map(|(index, byte)| match byte {
            'F' | 'f' => Ok(PathStep::Forward),
            'L' | 'l' => Ok(PathStep::Left),
            'B' | 'b' => Ok(PathStep::Back),
            'R' | 'r' => Ok(PathStep::Right),
            _ => Err(BuildError::BadPathByte { byte, index }),
        })
        .collect()
}

/// Returns the tile across the edge leaving `corner`, materializing it (and
/// completing the vertices at both ends of the new edge) if absent.
pub fn ensure_neighbor(graph: &mut Tessellation, corner: CornerKey) -> CornerKey {
    if let Some(existing) = graph.cross(corner) {
        return existing;
    }
    let fresh = graph.make_tile();
    graph.link(corner, fresh);
    enforce_convexity_left(graph, corner);
    enforce_convexity_right(graph, corner);
    fresh
}

/// Completes the vertex counter-clockwise of `corner`'s edge, then chases
/// the perimeter counter-clockwise.
///
/// At a vertex where the tile clockwise of `corner` and the tile
/// counter-clockwise of it both exist, three of the five tiles the vertex
/// needs are present; the two missing ones are allocated (or reused if the
/// sweep from the other direction got there first) and the 5-cycle is
/// closed. With fewer than three tiles present there is nothing to do —
/// that vertex is still open boundary.
fn enforce_convexity_left(graph: &mut Tessellation, corner: CornerKey) {
    let clockwise_edge = graph.rotate(corner);
    let (Some(clockwise), Some(ccwise)) = (graph.cross(clockwise_edge), graph.cross(corner)) else {
        return;
    };

    let clock_edge = graph.rotate(clockwise);
    let newclock = match graph.cross(clock_edge) {
        Some(existing) => existing,
        None => {
            let fresh = graph.make_tile();
            graph.link(clock_edge, fresh);
            fresh
        }
    };

    let cc_edge = graph.rotate_ccw(ccwise);
    let newcc = match graph.cross(cc_edge) {
        Some(existing) => existing,
        None => {
            let fresh = graph.make_tile();
            graph.link(cc_edge, fresh);
            fresh
        }
    };

    // close the 5-cycle around the vertex
    let a = graph.rotate(newclock);
    let b = graph.rotate_ccw(newcc);
    graph.link(a, b);

    enforce_convexity_left(graph, graph.rotate(clockwise));
}

/// Mirror image of [`enforce_convexity_left`], chasing the perimeter
/// clockwise. Both sweeps run after every edge materialization; completing
/// one vertex can leave the next vertex along the boundary with three tiles,
/// so each sweep keeps going until it reaches an open vertex.
fn enforce_convexity_right(graph: &mut Tessellation, corner: CornerKey) {
    let ccwise_edge = graph.rotate_ccw(corner);
    let (Some(clockwise), Some(ccwise)) = (graph.cross(corner), graph.cross(ccwise_edge)) else {
        return;
    };

    let clock_edge = graph.rotate(clockwise);
    let newclock = match graph.cross(clock_edge) {
        Some(existing) => existing,
        None => {
            let fresh = graph.make_tile();
            graph.link(clock_edge, fresh);
            fresh
        }
    };

    let cc_edge = graph.rotate_ccw(ccwise);
    let newcc = match graph.cross(cc_edge) {
        Some(existing) => existing,
        None => {
            let fresh = graph.make_tile();
            graph.link(cc_edge, fresh);
            fresh
        }
    };

    let a = graph.rotate(newclock);
    let b = graph.rotate_ccw(newcc);
    graph.link(a, b);

    enforce_convexity_right(graph, graph.rotate_ccw(ccwise));
}

/// Surrounds the tile at `corner` completely: every missing neighbor is
/// materialized as a default Wall and every touched vertex is completed.
/// Two passes around the ring, because the first pass's completions expose
/// vertices the second pass must still close. After this, gameplay can step
/// off the tile in any direction without finding an unbuilt edge.
pub fn wall_in(graph: &mut Tessellation, corner: CornerKey) {
    let mut cursor = corner;
    for _ in 0..8 {
        if graph.cross(cursor).is_none() {
            let fresh = graph.make_tile();
            graph.link(cursor, fresh);
        }
        enforce_convexity_left(graph, cursor);
        enforce_convexity_right(graph, cursor);
        cursor = graph.rotate(cursor);
    }
}

/// Walks `path` from `root` without growing the graph. Fails if an `F`
/// would cross an unmaterialized edge. Used for start-position records.
pub fn walk_path(
    graph: &Tessellation,
    root: CornerKey,
    path: &str,
) -> Result<CornerKey, BuildError> {
    let steps = parse_path(path)?;
    let mut cursor = root;
    for (index, step) in steps.iter().enumerate() {
        cursor = match step {
            PathStep::Left => graph.rotate(cursor),
            PathStep::Back => graph.opposite(cursor),
            PathStep::Right => graph.rotate_ccw(cursor),
            PathStep::Forward => {
                let entry = graph
                    .cross(cursor)
                    .ok_or(BuildError::ForwardOffGraph { index })?;
                graph.opposite(entry)
            }
        };
    }
    Ok(cursor)
}

/// Places one tile record: walks its path from `root`, sets the addressed
/// tile's type and agent, and walls in anything the player could stand on.
///
/// The record list contract is that every path prefix resolves through
/// tiles placed by earlier records; only the final `F` of a path may land on
/// a tile that does not exist yet. A non-final `F` over an unbuilt edge is
/// rejected rather than silently grown into.
pub fn add_tile(
    graph: &mut Tessellation,
    root: CornerKey,
    record: &TileRecord,
) -> Result<CornerKey, BuildError> {
    let steps = parse_path(&record.path)?;
    let last_forward = steps.iter().rposition(|step| *step == PathStep::Forward);

    let mut cursor = root;
    for (index, step) in steps.iter().enumerate() {
        cursor = match step {
            PathStep::Left => graph.rotate(cursor),
            PathStep::Back => graph.opposite(cursor),
            PathStep::Right => graph.rotate_ccw(cursor),
            PathStep::Forward => {
                if graph.cross(cursor).is_none() && Some(index) != last_forward {
                    return Err(BuildError::ForwardOffGraph { index });
                }
                let entry = ensure_neighbor(graph, cursor);
                graph.opposite(entry)
            }
        };
    }

    let tile = graph.tile_mut(cursor);
    tile.tile_type = record.tile_type;
    tile.agent = record.agent;
    if record.tile_type != TileType::Wall {
        wall_in(graph, cursor);
    }
    Ok(cursor)
}

/// Builds a whole graph from an ordered record list: one walled-in Space
/// origin, then every record in sequence. Returns the graph and the
/// origin corner all record paths are relative to.
pub fn build_graph(records: &[TileRecord]) -> Result<(Tessellation, CornerKey), BuildError> {
    let mut graph = Tessellation::new();
    let origin = graph.make_tile();
    wall_in(&mut graph, origin);
    graph.tile_mut(origin).tile_type = TileType::Space;

    for record in records {
        add_tile(&mut graph, origin, record)?;
    }

    debug!(
        "built graph: {} tiles from {} records",
        graph.tile_count(),
        records.len()
    );
    Ok((graph, origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::level::TileRecord;
    use crate::tiling::graph::Agent;

    fn space(path: &str) -> TileRecord {
        TileRecord {
            path: path.to_string(),
            tile_type: TileType::Space,
            agent: Agent::None,
        }
    }

    /// Steps clockwise around the vertex sitting between `corner`'s edge and
    /// the next edge of its ring.
    fn vertex_step(graph: &Tessellation, corner: CornerKey) -> Option<CornerKey> {
        graph.cross(graph.rotate(corner))
    }

    fn assert_vertices_complete(graph: &Tessellation, corner: CornerKey) {
        for ring_corner in graph.ring(corner) {
            let mut walker = ring_corner;
            for _ in 0..5 {
                walker = vertex_step(graph, walker).expect("vertex left incomplete");
            }
            assert_eq!(walker, ring_corner, "vertex cycle does not close in 5");
        }
    }

    #[test]
    fn wall_in_completes_all_vertices() {
        let mut graph = Tessellation::new();
        let origin = graph.make_tile();
        wall_in(&mut graph, origin);

        // origin + 4 edge neighbors + 2 fills per vertex
        assert_eq!(graph.tile_count(), 13);
        for corner in graph.ring(origin) {
            assert!(graph.cross(corner).is_some());
        }
        assert_vertices_complete(&graph, origin);
    }

    #[test]
    fn wall_in_is_idempotent() {
        let mut graph = Tessellation::new();
        let origin = graph.make_tile();
        wall_in(&mut graph, origin);
        let tiles = graph.tile_count();
        let corners = graph.corner_count();
        wall_in(&mut graph, origin);
        assert_eq!(graph.tile_count(), tiles);
        assert_eq!(graph.corner_count(), corners);
    }

    #[test]
    fn ensure_neighbor_reuses_existing() {
        let mut graph = Tessellation::new();
        let origin = graph.make_tile();
        let first = ensure_neighbor(&mut graph, origin);
        let second = ensure_neighbor(&mut graph, origin);
        assert_eq!(first, second);
    }

    #[test]
    fn add_tile_grows_and_walls_in() {
        let (mut graph, origin) = build_graph(&[]).unwrap();
        let placed = add_tile(&mut graph, origin, &space("F")).unwrap();
        assert_eq!(graph.tile(placed).tile_type, TileType::Space);
        assert!(!graph.same_tile(placed, origin));
        // crossing back from the placed tile lands on the origin
        let back = graph.opposite(graph.cross(graph.opposite(placed)).unwrap());
        assert!(graph.same_tile(back, origin));
        assert_vertices_complete(&graph, placed);
    }

    #[test]
    fn build_rejects_bad_path_byte() {
        let err = build_graph(&[space("FXF")]).unwrap_err();
        assert_eq!(
            err,
            BuildError::BadPathByte {
                byte: 'X',
                index: 1
            }
        );
    }

    #[test]
    fn build_rejects_out_of_order_records() {
        // second F must pass through a tile nothing has placed
        let err = build_graph(&[space("FFF")]).unwrap_err();
        assert_eq!(err, BuildError::ForwardOffGraph { index: 1 });
    }

    #[test]
    fn final_forward_may_allocate() {
        let (mut graph, origin) = build_graph(&[]).unwrap();
        // the origin is walled in, so "F" reuses a wall; "FF" from a placed
        // space reaches exactly one step past it
        let near = add_tile(&mut graph, origin, &space("F")).unwrap();
        let far = add_tile(&mut graph, origin, &space("FF")).unwrap();
        assert!(!graph.same_tile(near, far));
    }

    #[test]
    fn turns_compose_with_crossings() {
        let (mut graph, origin) = build_graph(&[]).unwrap();
        let left = add_tile(&mut graph, origin, &space("LF")).unwrap();
        let right = add_tile(&mut graph, origin, &space("RF")).unwrap();
        let back = add_tile(&mut graph, origin, &space("BF")).unwrap();
        let forward = add_tile(&mut graph, origin, &space("F")).unwrap();
        let tiles = [left, right, back, forward];
        for (i, a) in tiles.iter().enumerate() {
            for b in &tiles[i + 1..] {
                assert!(!graph.same_tile(*a, *b));
            }
        }
    }

    #[test]
    fn walk_path_does_not_grow() {
        let (graph, origin) = build_graph(&[]).unwrap();
        // neighbors exist, but tiles beyond them do not
        assert!(walk_path(&graph, origin, "F").is_ok());
        assert_eq!(
            walk_path(&graph, origin, "FF"),
            Err(BuildError::ForwardOffGraph { index: 1 })
        );
    }

    #[test]
    fn convexity_fill_meets_from_both_sides() {
        // placing a ring of spaces around the origin exercises the reuse
        // branch: completions sweeping left and right reach the same
        // vertices and must not double-allocate
        let records = [space("F"), space("LF"), space("BF"), space("RF")];
        let (graph, origin) = build_graph(&records).unwrap();
        assert_vertices_complete(&graph, origin);

        for corner in graph.corner_keys() {
            if let Some(there) = graph.cross(corner) {
                assert_eq!(graph.cross(there), Some(corner));
            }
        }
    }
}
