//! Tile identifiers, types and flags

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Bit set in a wall mask for each orthogonal neighbour that is also a wall
pub mod wall_mask {
    pub const NORTH: u8 = 0b0001;
    pub const EAST: u8 = 0b0010;
    pub const SOUTH: u8 = 0b0100;
    pub const WEST: u8 = 0b1000;
}

/// What a tile looks like; drives the renderer's texture choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
pub enum TileId {
    Invalid,
    /// Solid rock
    #[default]
    Empty,
    Floor,
    /// Floor dug between rooms
    Tunnel,
    /// Wall, auto-tiled from its neighbours (see [`wall_mask`])
    Wall(u8),
    DoorOpen,
    DoorClosed,
    StairUp,
    StairDown,
}

/// What a tile is, independent of how it is drawn
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u16)]
pub enum TileType {
    #[default]
    Empty = 0,
    Wall = 1,
    Floor = 2,
    Door = 3,
    Stair = 4,
}

impl TileType {
    /// Does this type take part in wall auto-tiling
    pub const fn joins_walls(&self) -> bool {
        matches!(self, TileType::Wall | TileType::Door)
    }
}

bitflags! {
    /// Tile property flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TileFlags: u32 {
        const BLOCKS_MOVEMENT = 0x01;
    }
}

// Serialized as raw bits
impl Serialize for TileFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TileFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(TileFlags::from_bits_truncate(bits))
    }
}

/// Everything needed to (re)write one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDataSet {
    pub id: TileId,
    pub kind: TileType,
    pub flags: TileFlags,
    /// New region, or `None` to keep the tile's current one
    pub region_id: Option<u16>,
}

impl TileDataSet {
    pub const fn new(id: TileId, kind: TileType, flags: TileFlags) -> Self {
        Self {
            id,
            kind,
            flags,
            region_id: None,
        }
    }

    /// Solid rock
    pub const fn rock() -> Self {
        Self::new(TileId::Empty, TileType::Empty, TileFlags::BLOCKS_MOVEMENT)
    }

    pub const fn floor() -> Self {
        Self::new(TileId::Floor, TileType::Floor, TileFlags::empty())
    }

    pub const fn tunnel() -> Self {
        Self::new(TileId::Tunnel, TileType::Floor, TileFlags::empty())
    }

    /// A wall; its mask is recomputed when it lands on the map
    pub const fn wall() -> Self {
        Self::new(TileId::Wall(0), TileType::Wall, TileFlags::BLOCKS_MOVEMENT)
    }

    pub const fn open_door() -> Self {
        Self::new(TileId::DoorOpen, TileType::Door, TileFlags::empty())
    }

    pub const fn closed_door() -> Self {
        Self::new(TileId::DoorClosed, TileType::Door, TileFlags::BLOCKS_MOVEMENT)
    }

    pub const fn stair_up() -> Self {
        Self::new(TileId::StairUp, TileType::Stair, TileFlags::empty())
    }

    pub const fn stair_down() -> Self {
        Self::new(TileId::StairDown, TileType::Stair, TileFlags::empty())
    }

    /// Also move the tile to region `region_id`
    pub const fn in_region(mut self, region_id: u16) -> Self {
        self.region_id = Some(region_id);
        self
    }
}

/// Read-only copy of one tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileView {
    pub id: TileId,
    pub kind: TileType,
    pub flags: TileFlags,
    pub region_id: u16,
}

impl TileView {
    pub fn blocks_movement(&self) -> bool {
        self.flags.contains(TileFlags::BLOCKS_MOVEMENT)
    }
}
