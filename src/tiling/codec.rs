use std::collections::VecDeque;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use super::builder::{build_graph, BuildError};
use super::graph::{CornerKey, Tessellation, TileType};
use crate::game::level::TileRecord;

new_key_type! {
    struct CrumbKey;
}

/// One node of the breadcrumb forest: which tile the parent was and which
/// turn letter led here. Reference-counted so that a prefix is dropped the
/// moment its last dependent leaf has been emitted — live bookkeeping stays
/// proportional to the search depth, not to the explored graph.
struct Crumb {
    parent: Option<CrumbKey>,
    turn: Option<char>,
    refs: u32,
}

/// Turn letters by rotation count from a tile's entry corner. The across
/// edge itself needs no letter.
const TURNS: [Option<char>; 4] = [None, Some('L'), Some('B'), Some('R')];

/// Encodes every tile reachable from `origin` back into the path language:
/// a breadth-first walk that assigns each non-Wall tile the shortest
/// discovered path (ties broken across-first, then `L`, `B`, `R`) and emits
/// one record per tile, in an order that always satisfies the builder's
/// record-ordering contract.
///
/// The walk expands only through non-Wall tiles; rooms sealed off behind
/// walls are not part of the playable graph and are not emitted. The origin
/// is the one exception: its record is always emitted, even when a later
/// record re-typed it to a Wall, so rebuilding reproduces the root tile
/// exactly instead of reverting it to the default Space origin.
pub fn encode(graph: &mut Tessellation, origin: CornerKey) -> Vec<TileRecord> {
    graph.reset_visited();

    let mut crumbs: SlotMap<CrumbKey, Crumb> = SlotMap::with_key();
    let mut queue: VecDeque<(CornerKey, CrumbKey)> = VecDeque::new();
    let mut records = Vec::new();

    let root = crumbs.insert(Crumb {
        parent: None,
        turn: None,
        refs: 0,
    });
    graph.tile_mut(origin).visited = true;
    queue.push_back((origin, root));

    while let Some((corner, crumb)) = queue.pop_front() {
        let tile = *graph.tile(corner);
        if tile.tile_type != TileType::Wall || corner == origin {
            records.push(TileRecord {
                path: path_of(&crumbs, crumb),
                tile_type: tile.tile_type,
                agent: tile.agent,
            });
        }

        if tile.tile_type != TileType::Wall {
            let mut edge = corner;
            for turn in TURNS {
                if let Some(entry) = graph.cross(edge) {
                    if !graph.tile(entry).visited {
                        graph.tile_mut(entry).visited = true;
                        if graph.tile(entry).tile_type != TileType::Wall {
                            let child = crumbs.insert(Crumb {
                                parent: Some(crumb),
                                turn,
                                refs: 0,
                            });
                            crumbs[crumb].refs += 1;
                            queue.push_back((graph.opposite(entry), child));
                        }
                    }
                }
                edge = graph.rotate(edge);
            }
        }
        release(&mut crumbs, crumb);
    }

    graph.reset_visited();
    debug_assert!(crumbs.is_empty());
    records
}

/// Rebuilds a graph from encoded records. Inverse of [`encode`] up to
/// graph isomorphism over non-Wall tiles.
pub fn decode(records: &[TileRecord]) -> Result<(Tessellation, CornerKey), BuildError> {
    build_graph(records)
}

/// Reconstructs the path string for a breadcrumb chain: every link
/// contributes its turn letter (if any) followed by `F`; the root
/// contributes nothing, so the origin encodes as the empty path.
fn path_of(crumbs: &SlotMap<CrumbKey, Crumb>, leaf: CrumbKey) -> String {
    let mut turns: SmallVec<[Option<char>; 24]> = SmallVec::new();
    let mut cursor = Some(leaf);
    while let Some(key) = cursor {
        let crumb = &crumbs[key];
        if crumb.parent.is_some() {
            turns.push(crumb.turn);
        }
        cursor = crumb.parent;
    }

    let mut path = String::with_capacity(turns.len() * 2);
    for turn in turns.iter().rev() {
        if let Some(letter) = turn {
            path.push(*letter);
        }
        path.push('F');
    }
    path
}

/// Drops `crumb` if nothing depends on it any more, then walks up the chain
/// releasing every ancestor that just lost its last dependent.
fn release(crumbs: &mut SlotMap<CrumbKey, Crumb>, crumb: CrumbKey) {
    let mut cursor = crumb;
    while crumbs[cursor].refs == 0 {
        let parent = crumbs.remove(cursor).and_then(|dead| dead.parent);
        match parent {
            Some(up) => {
                crumbs[up].refs -= 1;
                cursor = up;
            }
            None => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::level::TileRecord;
    use crate::tiling::graph::Agent;

    fn record(path: &str, tile_type: TileType, agent: Agent) -> TileRecord {
        TileRecord {
            path: path.to_string(),
            tile_type,
            agent,
        }
    }

    fn space(path: &str) -> TileRecord {
        record(path, TileType::Space, Agent::None)
    }

    #[test]
    fn lone_origin_encodes_as_empty_path() {
        let (mut graph, origin) = build_graph(&[]).unwrap();
        let records = encode(&mut graph, origin);
        assert_eq!(records, vec![space("")]);
    }

    #[test]
    fn nearer_tiles_get_shorter_paths() {
        let level = [space("F"), space("FF")];
        let (mut graph, origin) = build_graph(&level).unwrap();
        let records = encode(&mut graph, origin);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].path, "");
        assert_eq!(records[1].path, "F");
        assert_eq!(records[2].path, "FF");
    }

    #[test]
    fn walls_are_not_emitted_or_crossed() {
        let level = [
            space("F"),
            record("FLF", TileType::Wall, Agent::None),
            record("FF", TileType::Target, Agent::Box),
        ];
        let (mut graph, origin) = build_graph(&level).unwrap();
        let records = encode(&mut graph, origin);
        assert_eq!(records.len(), 3);
        assert!(records
            .iter()
            .all(|r| r.tile_type != TileType::Wall));
        assert!(records
            .iter()
            .any(|r| r.tile_type == TileType::Target && r.agent == Agent::Box));
    }

    #[test]
    fn round_trip_reaches_fixed_point() {
        let level = [
            space("F"),
            space("LF"),
            space("LFF"),
            record("BF", TileType::Target, Agent::None),
            record("RF", TileType::Space, Agent::Box),
        ];
        let (mut graph, origin) = build_graph(&level).unwrap();
        let first = encode(&mut graph, origin);
        let (mut rebuilt, rebuilt_origin) = decode(&first).unwrap();
        let second = encode(&mut rebuilt, rebuilt_origin);
        assert_eq!(first, second);
    }

    #[test]
    fn retyped_wall_origin_round_trips() {
        // a path may alias an already-placed tile; "FBF" walks out, turns
        // around, and re-types the origin itself to a wall, sealing off
        // everything else
        let level = [
            record("F", TileType::Target, Agent::None),
            space("F"),
            record("FBF", TileType::Wall, Agent::None),
        ];
        let (mut graph, origin) = build_graph(&level).unwrap();
        let first = encode(&mut graph, origin);
        // only the origin survives, and it keeps its wall type
        assert_eq!(first, vec![record("", TileType::Wall, Agent::None)]);
        let (mut rebuilt, rebuilt_origin) = decode(&first).unwrap();
        let second = encode(&mut rebuilt, rebuilt_origin);
        assert_eq!(first, second);
    }

    #[test]
    fn encode_is_repeatable() {
        // visited flags must be clean after a walk
        let level = [space("F"), space("LF")];
        let (mut graph, origin) = build_graph(&level).unwrap();
        let first = encode(&mut graph, origin);
        let second = encode(&mut graph, origin);
        assert_eq!(first, second);
    }
}
