//! Placement rules and the nearest-free-cell search

use core::fmt;

use log::trace;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use thiserror::Error;

use super::Level;
use crate::geom::{distance_range, points_around, Point, Vec2};
use crate::ids::{EntityId, ItemId, UniqueEntity, UniqueItem};
use crate::rng::GameRng;

/// Outcome of every placement or movement attempt
///
/// Failures are ordinary values: the caller branches on them to start a
/// fight (`FailedEntity`), interact with the obstacle (`FailedObstacle`) or
/// tell the player they can't go there.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum PlacementResult {
    Ok,
    /// The tile blocks movement
    FailedObstacle,
    /// Another entity already stands there
    FailedEntity,
    /// Outside the level
    FailedBounds,
    /// The identifier does not name anything on this level
    FailedBadId,
}

impl PlacementResult {
    pub fn is_ok(self) -> bool {
        self == PlacementResult::Ok
    }
}

/// A rejected placement; the object is handed back to the caller untouched
#[derive(Error, Debug, PartialEq, Eq)]
#[error("cannot place {object:?}: {reason}")]
pub struct PlacementError<O: fmt::Debug> {
    pub object: O,
    pub reason: PlacementResult,
}

/// An owned object a level can take in
pub trait LevelObject: Sized + fmt::Debug {
    /// The bare id the level keeps once the object is placed
    type Id: Copy;

    /// Placement check for this kind of object
    fn can_place(level: &Level, p: Point) -> PlacementResult;

    /// Hand the object to `level` at `p`; the position was already checked
    fn place(self, level: &mut Level, p: Point) -> Self::Id;
}

impl LevelObject for UniqueEntity {
    type Id = EntityId;

    fn can_place(level: &Level, p: Point) -> PlacementResult {
        level.can_place_entity_at(p)
    }

    fn place(self, level: &mut Level, p: Point) -> EntityId {
        level.insert_entity(self.release(), p)
    }
}

impl LevelObject for UniqueItem {
    type Id = ItemId;

    fn can_place(level: &Level, p: Point) -> PlacementResult {
        level.can_place_item_at(p)
    }

    fn place(self, level: &mut Level, p: Point) -> ItemId {
        level.insert_item(self.release(), p)
    }
}

/// An id whose object can be moved around a level
pub trait Movable: Copy {
    fn move_within(self, level: &mut Level, v: Vec2) -> PlacementResult;
}

impl Movable for EntityId {
    fn move_within(self, level: &mut Level, v: Vec2) -> PlacementResult {
        level.move_entity_by(self, v)
    }
}

impl Movable for ItemId {
    fn move_within(self, level: &mut Level, v: Vec2) -> PlacementResult {
        level.move_item_by(self, v)
    }
}

impl Level {
    /// Can an entity stand at `p`
    ///
    /// Checked in order: bounds, obstacle, another entity.
    pub fn can_place_entity_at(&self, p: Point) -> PlacementResult {
        match self.can_place_item_at(p) {
            PlacementResult::Ok if self.entity_at(p).is_some() => PlacementResult::FailedEntity,
            r => r,
        }
    }

    /// Can an item lie at `p`
    ///
    /// Items stack into piles and may lie under entities, so only bounds and
    /// obstacles matter.
    pub fn can_place_item_at(&self, p: Point) -> PlacementResult {
        match self.at(p) {
            None => PlacementResult::FailedBounds,
            Some(tile) if tile.blocks_movement() => PlacementResult::FailedObstacle,
            Some(_) => PlacementResult::Ok,
        }
    }

    /// Place `object` at `p`
    ///
    /// The caller is expected to have checked `p`; it is checked again so an
    /// occupied or blocked cell hands the object back instead of losing it.
    pub fn add_object_at<O: LevelObject>(
        &mut self,
        object: O,
        p: Point,
    ) -> Result<O::Id, PlacementError<O>> {
        let reason = O::can_place(self, p);
        if !reason.is_ok() {
            return Err(PlacementError { object, reason });
        }
        Ok(object.place(self, p))
    }

    /// Place `object` at `p`, or at a random valid cell near it
    ///
    /// Rings at Chebyshev distance 1, 2, ... `max_distance` around `p` are
    /// searched in turn, each in random order. On failure the object comes back
    /// with the reason `p` itself was rejected.
    pub fn add_object_nearest_random<O: LevelObject>(
        &mut self,
        rng: &mut GameRng,
        object: O,
        p: Point,
        max_distance: i32,
    ) -> Result<(Point, O::Id), PlacementError<O>> {
        match self.find_nearest_random(rng, p, max_distance, O::can_place) {
            Ok(q) => {
                trace!("placed {object:?} at {q:?} (asked for {p:?})");
                Ok((q, object.place(self, q)))
            }
            Err(reason) => Err(PlacementError { object, reason }),
        }
    }

    /// The cell [`add_object_nearest_random`](Self::add_object_nearest_random)
    /// would choose for an entity, without placing anything
    pub fn find_valid_entity_placement_nearest(
        &self,
        rng: &mut GameRng,
        p: Point,
        max_distance: i32,
    ) -> Result<Point, PlacementResult> {
        self.find_nearest_random(rng, p, max_distance, Level::can_place_entity_at)
    }

    /// As [`find_valid_entity_placement_nearest`], for items
    ///
    /// [`find_valid_entity_placement_nearest`]: Self::find_valid_entity_placement_nearest
    pub fn find_valid_item_placement_nearest(
        &self,
        rng: &mut GameRng,
        p: Point,
        max_distance: i32,
    ) -> Result<Point, PlacementResult> {
        self.find_nearest_random(rng, p, max_distance, Level::can_place_item_at)
    }

    /// Ring search shared by every "nearest" placement
    pub(crate) fn find_nearest_random<F>(
        &self,
        rng: &mut GameRng,
        p: Point,
        max_distance: i32,
        check: F,
    ) -> Result<Point, PlacementResult>
    where
        F: Fn(&Level, Point) -> PlacementResult,
    {
        let first = check(self, p);
        if first.is_ok() {
            return Ok(p);
        }

        let bounds = self.bounds();
        if bounds.is_empty() {
            return Err(first);
        }
        // Only rings that touch the map can hold a valid cell
        let (near, far) = distance_range(p, &bounds);
        for d in near.max(1)..=max_distance.min(far) {
            let mut ring = points_around(p, d, &bounds);
            rng.shuffle(&mut ring);
            if let Some(q) = ring.into_iter().find(|&q| check(self, q).is_ok()) {
                return Ok(q);
            }
        }

        Err(first)
    }

    /// Move an entity or item by `v`
    ///
    /// The destination is validated exactly like a placement. Only an `Ok`
    /// result changes anything; on failure the level is left as it was and
    /// the reason tells the caller what was in the way.
    pub fn move_by<M: Movable>(&mut self, id: M, v: Vec2) -> PlacementResult {
        id.move_within(self, v)
    }
}
