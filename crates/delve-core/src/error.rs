//! Errors for malformed generation parameters
//!
//! Placement and movement never fail with an error: they report a
//! [`PlacementResult`](crate::level::PlacementResult). The only values
//! rejected with `Err` are generation parameters that break the generator's
//! preconditions, caught once at construction.

use thiserror::Error;

/// Rejected generation parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenError {
    #[error("minimum region size {min} exceeds maximum region size {max}")]
    RegionSizeOrder { min: i32, max: i32 },

    #[error("maximum region size {max} is below 2 * {min} - 1, so it cannot always be split")]
    MaxRegionTooSmall { min: i32, max: i32 },

    #[error("minimum room size {min} exceeds maximum room size {max}")]
    RoomSizeOrder { min: i32, max: i32 },

    #[error("region and room sizes must be at least 1 (got region {region}, room {room})")]
    NonPositiveSize { region: i32, room: i32 },

    #[error("level of {width}x{height} cannot hold a region of minimum size {min}")]
    RegionTooSmall { width: i32, height: i32, min: i32 },

    #[error("room chance {num}/{den} is not a probability")]
    BadRoomChance { num: u32, den: u32 },

    #[error("stop chance {num}/{den} is not a probability")]
    BadStopChance { num: u32, den: u32 },

    #[error("split variance {0} must be finite and non-negative")]
    BadVariance(f64),

    #[error("a {width}x{height} level split down to size {min} needs more than {limit} regions")]
    TooLarge {
        width: i32,
        height: i32,
        min: i32,
        limit: usize,
    },
}
