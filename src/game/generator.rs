use log::{debug, warn};
use rand::Rng;

use super::board::Board;
use super::level::LevelMeta;
use crate::tiling::builder::wall_in;
use crate::tiling::graph::{Agent, CornerKey, Tessellation, TileType};

/// Knobs for random room growth.
#[derive(Clone, Copy, Debug)]
pub struct GeneratorParams {
    /// Fewest floor tiles a room may have.
    pub min_size: usize,
    /// Random extra floor tiles on top of `min_size`.
    pub size_range: usize,
    /// Rooms with more single-exit floor tiles than this are rerolled.
    pub max_dead_ends: usize,
    /// Target tiles to sprinkle into the room.
    pub num_goals: usize,
}

impl Default for GeneratorParams {
    fn default() -> Self {
        Self {
            min_size: 10,
            size_range: 5,
            max_dead_ends: 0,
            num_goals: 2,
        }
    }
}

/// Rerolls before giving up on the dead-end constraint and returning the
/// last room as-is.
const MAX_ATTEMPTS: usize = 256;

/// Grows a random open room on the tessellation and wraps it as a board,
/// with the player on the first carved tile. Boxes are not placed; callers
/// decide how to populate the room.
///
/// Growth works over a frontier of candidate wall tiles, like the
/// tessellation's own lazy expansion: pick a random frontier tile, turn it
/// into floor (sometimes a target), wall it in, and add its still-walled
/// neighbors to the frontier. Rooms whose dead-end count exceeds the
/// parameter are thrown away and regrown.
pub fn generate_board(params: &GeneratorParams, rng: &mut impl Rng) -> Board {
    for attempt in 1..=MAX_ATTEMPTS {
        let (graph, start, dead_ends) = grow_room(params, rng);
        if dead_ends <= params.max_dead_ends {
            debug!(
                "generated room: {} tiles after {} attempt(s)",
                graph.tile_count(),
                attempt
            );
            return Board::from_graph(graph, start, LevelMeta::default());
        }
    }
    warn!("dead-end constraint unsatisfied after {MAX_ATTEMPTS} rerolls; keeping the last room");
    let (graph, start, _) = grow_room(params, rng);
    Board::from_graph(graph, start, LevelMeta::default())
}

fn grow_room(params: &GeneratorParams, rng: &mut impl Rng) -> (Tessellation, CornerKey, usize) {
    let mut graph = Tessellation::new();
    let start = graph.make_tile();

    // frontier of wall tiles eligible to become floor; the visited flag
    // doubles as the membership marker
    let mut frontier = vec![start];
    graph.tile_mut(start).visited = true;

    let mut floors: Vec<CornerKey> = Vec::new();
    let goal_size = params.min_size + rng.gen_range(0..params.size_range.max(1)) + params.num_goals;
    let mut targets_placed = 0;

    for carved in 0..goal_size {
        let index = rng.gen_range(0..frontier.len());
        let corner = frontier.swap_remove(index);

        // spread the remaining targets uniformly over the remaining picks
        let remaining = goal_size - carved;
        if rng.gen_range(0..remaining) < params.num_goals - targets_placed {
            graph.tile_mut(corner).tile_type = TileType::Target;
            targets_placed += 1;
        } else {
            graph.tile_mut(corner).tile_type = TileType::Space;
        }
        graph.tile_mut(corner).agent = Agent::None;
        floors.push(corner);

        wall_in(&mut graph, corner);
        graph.tile_mut(corner).visited = false;

        for edge in graph.ring(corner) {
            // the tile was just walled in, so every edge has a far side
            let Some(neighbor) = graph.cross(edge) else {
                continue;
            };
            if !graph.tile(neighbor).visited && graph.tile(neighbor).tile_type == TileType::Wall {
                graph.tile_mut(neighbor).visited = true;
                frontier.push(neighbor);
            }
        }
    }

    for corner in frontier {
        graph.tile_mut(corner).visited = false;
    }

    let dead_ends = floors
        .iter()
        .filter(|&&corner| {
            let open_exits = graph
                .ring(corner)
                .into_iter()
                .filter(|&edge| {
                    graph
                        .cross(edge)
                        .is_some_and(|neighbor| graph.tile(neighbor).tile_type != TileType::Wall)
                })
                .count();
            open_exits == 1
        })
        .count();

    (graph, start, dead_ends)
}
