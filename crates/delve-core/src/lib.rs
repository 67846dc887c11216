//! delve-core: spatial core of a tile dungeon game
//!
//! This crate generates level geometry, tracks where entities and items
//! are, and answers the placement, movement and visibility questions the
//! rest of the game asks every turn. It has no I/O and no rendering; hosts
//! read snapshots through the query methods on [`Level`].
//!
//! - [`bsp`] splits a level into a tree of regions and carves rooms
//! - [`spatial_map`] is the positional index used for entities and items
//! - [`level`] owns the tiles and both indexes and enforces the rules

pub mod bsp;
pub mod geom;
pub mod grid;
pub mod ids;
pub mod level;
pub mod spatial_map;
pub mod tile;

mod consts;
mod error;
mod rng;

pub use bsp::{BspGenerator, BspParams, RegionNode};
pub use consts::*;
pub use error::GenError;
pub use geom::{Point, Rect, Vec2};
pub use ids::{EntityId, ItemId, UniqueEntity, UniqueItem};
pub use level::{
    ItemPile, Level, LevelObject, LevelParams, Movable, MoveItemsResult, PlacementError,
    PlacementResult, RegionInfo,
};
pub use rng::GameRng;
pub use spatial_map::SpatialMap;
pub use tile::{TileDataSet, TileFlags, TileId, TileType, TileView};
