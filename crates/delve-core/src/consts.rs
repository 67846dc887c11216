//! Default generation parameters

/// Default level width in tiles
pub const DEFAULT_WIDTH: i32 = 100;

/// Default level height in tiles
pub const DEFAULT_HEIGHT: i32 = 100;

/// Smallest side a region may be split down to
pub const DEFAULT_MIN_REGION_SIZE: i32 = 3;

/// Regions larger than this along either axis are always split
pub const DEFAULT_MAX_REGION_SIZE: i32 = 20;

/// Room size bounds, walls included
pub const DEFAULT_MIN_ROOM_SIZE: i32 = 3;
pub const DEFAULT_MAX_ROOM_SIZE: i32 = 20;

/// Chance that a leaf region gets a room
pub const DEFAULT_ROOM_CHANCE_NUM: u32 = 60;
pub const DEFAULT_ROOM_CHANCE_DEN: u32 = 100;

/// Chance that a region small enough to stop splitting actually stops
pub const DEFAULT_STOP_CHANCE_NUM: u32 = 1;
pub const DEFAULT_STOP_CHANCE_DEN: u32 = 4;

/// Standard deviation of the split point around the midpoint
pub const DEFAULT_SPLIT_VARIANCE: f64 = 5.0;

/// Upper bound on generated regions; node links are 16 bit
pub const MAX_REGIONS: usize = u16::MAX as usize;

/// Search radius used when scattering stairs near a room's centre
pub const STAIR_PLACEMENT_RADIUS: i32 = 5;

/// Number of staircases of each direction placed on a generated level
pub const STAIRS_PER_DIRECTION: usize = 1;

/// One in this many doors generated on a tunnel is closed
pub const CLOSED_DOOR_ONE_IN: u32 = 3;
