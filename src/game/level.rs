use serde::{Deserialize, Serialize};

use crate::tiling::graph::{Agent, TileType};

/// One tile of a level description: where it is (a path in the `F/L/B/R`
/// language, relative to the origin), what it is, and what sits on it.
///
/// Records are ordered: every prefix of a record's path must resolve
/// through tiles placed by earlier records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileRecord {
    pub path: String,
    pub tile_type: TileType,
    pub agent: Agent,
}

impl TileRecord {
    pub fn new(path: impl Into<String>, tile_type: TileType, agent: Agent) -> Self {
        Self {
            path: path.into(),
            tile_type,
            agent,
        }
    }
}

/// Presentation metadata carried alongside a level. None of it affects the
/// graph or the rules.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMeta {
    pub title: Option<String>,
    pub collection: Option<String>,
    pub difficulty: Option<u32>,
    pub number: Option<u32>,
    pub filename: Option<String>,
}

/// A complete level: tile records, an optional start-position path for the
/// player (origin if absent), and display metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub tiles: Vec<TileRecord>,
    pub start: Option<String>,
    pub meta: LevelMeta,
}

impl Level {
    pub fn new(tiles: Vec<TileRecord>) -> Self {
        Self {
            tiles,
            start: None,
            meta: LevelMeta::default(),
        }
    }
}
