//! Level engine
//!
//! A level owns its tile grid, the per-tile region ids and two positional
//! indexes, one for entities and one for item piles. Everything other
//! systems do to the map each turn goes through here: placement checks,
//! adding and removing objects, movement, nearest-free-cell search, path
//! finding and line of sight.
//!
//! Entities and items are owned by the world registry; a level only keeps
//! their ids and positions.

mod generate;
mod path;
mod pile;
mod placement;

pub use generate::LevelParams;
pub use pile::{ItemPile, MoveItemsResult, PileId};
pub use placement::{LevelObject, Movable, PlacementError, PlacementResult};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::geom::{Point, Rect, Vec2};
use crate::grid::{Grid, SubRegion};
use crate::ids::{EntityId, ItemId, UniqueEntity, UniqueItem};
use crate::spatial_map::{identity, SpatialMap};
use crate::tile::{wall_mask, TileDataSet, TileFlags, TileId, TileType, TileView};

/// Aggregate description of one region, for tool-tips and debug views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub bounds: Rect,
    /// The room carved in this region at generation, if any
    pub room: Option<Rect>,
    pub entity_count: i32,
    pub item_count: i32,
    pub tile_count: i32,
    pub id: u16,
}

/// The parts of a region that only change when tiles do
#[derive(Debug, Clone, Copy, Default)]
struct RegionShape {
    bounds: Rect,
    room: Option<Rect>,
    tile_count: i32,
}

/// One dungeon level
#[derive(Debug, Clone)]
pub struct Level {
    id: usize,
    tile_ids: Grid<TileId>,
    tile_types: Grid<TileType>,
    tile_flags: Grid<TileFlags>,
    region_ids: Grid<u16>,
    regions: Vec<RegionShape>,
    entities: SpatialMap<EntityId, EntityId>,
    items: SpatialMap<ItemPile, PileId>,
    stairs_up: Vec<Point>,
    stairs_down: Vec<Point>,
    next_pile_id: u32,
}

impl Level {
    /// Create a level of solid rock forming a single region
    pub fn new(width: i32, height: i32, id: usize) -> Self {
        debug_assert!(width > 0 && height > 0, "level must have an area");
        let rock = TileDataSet::rock();
        let bounds = Rect::with_size(0, 0, width, height);
        Self {
            id,
            tile_ids: Grid::new(width, height, rock.id),
            tile_types: Grid::new(width, height, rock.kind),
            tile_flags: Grid::new(width, height, rock.flags),
            region_ids: Grid::new(width, height, 0),
            regions: vec![RegionShape {
                bounds,
                room: None,
                tile_count: bounds.area(),
            }],
            entities: SpatialMap::new(width, height, identity),
            items: SpatialMap::new(width, height, pile::pile_id),
            stairs_up: Vec::new(),
            stairs_down: Vec::new(),
            next_pile_id: 1,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Width in tiles
    pub fn width(&self) -> i32 {
        self.tile_ids.width()
    }

    /// Height in tiles
    pub fn height(&self) -> i32 {
        self.tile_ids.height()
    }

    pub fn bounds(&self) -> Rect {
        self.tile_ids.bounds()
    }

    /// Identifier of this level
    pub fn id(&self) -> usize {
        self.id
    }

    /// Position of the entity `id`, if it is on this level
    pub fn find(&self, id: EntityId) -> Option<Point> {
        self.entities.find_key(id).map(|(_, p)| p)
    }

    /// The entity standing at `p`
    pub fn entity_at(&self, p: Point) -> Option<EntityId> {
        self.entities.find(p).copied()
    }

    /// [`entity_at`](Self::entity_at) for several points at once
    pub fn entities_at<const N: usize>(&self, points: [Point; N]) -> [Option<EntityId>; N] {
        points.map(|p| self.entity_at(p))
    }

    /// The pile lying at `p`
    pub fn item_at(&self, p: Point) -> Option<&ItemPile> {
        self.items.find(p)
    }

    /// The pile holding `item`, and where it lies
    pub fn find_item(&self, item: ItemId) -> Option<(&ItemPile, Point)> {
        self.items
            .iter()
            .find(|(_, pile)| pile.contains(item))
            .map(|(p, pile)| (pile, p))
    }

    /// Everything about the tile at `p`
    pub fn at(&self, p: Point) -> Option<TileView> {
        let i = self.tile_ids.index_of(p)?;
        Some(TileView {
            id: self.tile_ids.as_slice()[i],
            kind: self.tile_types.as_slice()[i],
            flags: self.tile_flags.as_slice()[i],
            region_id: self.region_ids.as_slice()[i],
        })
    }

    /// Number of regions
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Summary of region `i`
    pub fn region(&self, i: usize) -> Option<RegionInfo> {
        let shape = self.regions.get(i)?;
        let in_region = |p: Point| self.region_ids.get(p).is_some_and(|&r| r as usize == i);

        let entity_count = self.entities.positions().iter().filter(|&&p| in_region(p)).count();
        let item_count: usize = self
            .items
            .iter()
            .filter(|&(p, _)| in_region(p))
            .map(|(_, pile)| pile.len())
            .sum();

        Some(RegionInfo {
            bounds: shape.bounds,
            room: shape.room,
            entity_count: entity_count as i32,
            item_count: item_count as i32,
            tile_count: shape.tile_count,
            id: i as u16,
        })
    }

    /// Location of the `i`th up staircase
    pub fn stair_up(&self, i: usize) -> Option<Point> {
        self.stairs_up.get(i).copied()
    }

    /// Location of the `i`th down staircase
    pub fn stair_down(&self, i: usize) -> Option<Point> {
        self.stairs_down.get(i).copied()
    }

    /// Number of entities on the level
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of item piles on the level
    pub fn pile_count(&self) -> usize {
        self.items.len()
    }

    pub fn for_each_entity<F: FnMut(EntityId, Point)>(&self, mut f: F) {
        self.entities.for_each(|&id, p| f(id, p));
    }

    /// Visit entities until `f` returns false
    pub fn for_each_entity_while<F: FnMut(EntityId, Point) -> bool>(&self, mut f: F) {
        self.entities.for_each_while(|&id, p| f(id, p));
    }

    pub fn for_each_pile<F: FnMut(&ItemPile, Point)>(&self, f: F) {
        self.items.for_each(f);
    }

    /// Visit piles until `f` returns false
    pub fn for_each_pile_while<F: FnMut(&ItemPile, Point) -> bool>(&self, f: F) {
        self.items.for_each_while(f);
    }

    /// Entities within Chebyshev distance `distance` of `p`
    pub fn entities_near(
        &self,
        p: Point,
        distance: i32,
    ) -> impl Iterator<Item = (Point, EntityId)> + '_ {
        self.entities
            .iter()
            .filter(move |&(q, _)| q.chebyshev(p) <= distance)
            .map(|(q, &id)| (q, id))
    }

    pub fn for_each_entity_near<F: FnMut(EntityId, Point)>(
        &self,
        p: Point,
        distance: i32,
        mut f: F,
    ) {
        for (q, id) in self.entities_near(p, distance) {
            f(id, q);
        }
    }

    /// Visit nearby entities until `f` returns false
    pub fn for_each_entity_near_while<F: FnMut(EntityId, Point) -> bool>(
        &self,
        p: Point,
        distance: i32,
        mut f: F,
    ) {
        for (q, id) in self.entities_near(p, distance) {
            if !f(id, q) {
                break;
            }
        }
    }

    /// Tile ids covering `area` (clipped to the level), for partial redraws
    pub fn tile_ids(&self, area: Rect) -> SubRegion<'_, TileId> {
        self.tile_ids.sub_region(area)
    }

    /// Region ids covering `area` (clipped to the level)
    pub fn region_ids(&self, area: Rect) -> SubRegion<'_, u16> {
        self.region_ids.sub_region(area)
    }

    // ========================================================================
    // Objects
    // ========================================================================

    pub(crate) fn insert_entity(&mut self, id: EntityId, p: Point) -> EntityId {
        let (_, inserted) = self.entities.insert(p, id);
        debug_assert!(inserted, "{p:?} already holds an entity");
        trace!("level {}: {id} placed at {p:?}", self.id);
        id
    }

    /// Drop `item` onto the pile at `p`, starting a pile if there is none
    pub(crate) fn insert_item(&mut self, item: ItemId, p: Point) -> ItemId {
        match self.items.find_mut(p) {
            Some(pile) => pile.push(item),
            None => {
                let pile = ItemPile::new(PileId(self.next_pile_id), item);
                self.next_pile_id += 1;
                self.items.insert(p, pile);
            }
        }
        trace!("level {}: {item} dropped at {p:?}", self.id);
        item
    }

    /// Take the entity at `p` off the level
    pub fn remove_entity_at(&mut self, p: Point) -> Option<UniqueEntity> {
        self.entities.erase(p).map(UniqueEntity::new)
    }

    /// Take entity `id` off the level
    pub fn remove_entity(&mut self, id: EntityId) -> Option<UniqueEntity> {
        self.entities
            .erase_key(id)
            .map(|(id, _)| UniqueEntity::new(id))
    }

    /// Take item `item` off the level; an emptied pile disappears
    pub fn remove_item(&mut self, item: ItemId) -> Option<UniqueItem> {
        let (_, p) = self.find_item(item)?;
        self.take_item_from(p, item).then(|| UniqueItem::new(item))
    }

    /// Run `f` on the entity at `p`; if it returns false the entity leaves
    /// the level and is handed back
    pub fn with_entity_at<F>(&mut self, p: Point, f: F) -> Option<UniqueEntity>
    where
        F: FnOnce(EntityId) -> bool,
    {
        let id = self.entity_at(p)?;
        if f(id) {
            return None;
        }
        self.remove_entity_at(p)
    }

    /// Hand items from the pile at `from` to `sink`
    ///
    /// With `indices` of `None` every item goes, otherwise the items at those
    /// pile indices, in that order. `sink` receives each item with the index
    /// it had in the pile. Returns what happened and how many items moved.
    pub fn move_items<F>(
        &mut self,
        from: Point,
        indices: Option<&[usize]>,
        mut sink: F,
    ) -> (MoveItemsResult, usize)
    where
        F: FnMut(UniqueItem, usize),
    {
        let Some(pile) = self.items.find_mut(from) else {
            return (MoveItemsResult::NoPile, 0);
        };

        let taken: Vec<(usize, ItemId)> = match indices {
            None => pile.take_all().into_iter().enumerate().collect(),
            Some(indices) => match pile.take_indices(indices) {
                Some(items) => indices.iter().copied().zip(items).collect(),
                None => return (MoveItemsResult::BadIndex, 0),
            },
        };

        let emptied = pile.is_empty();
        if emptied {
            self.items.erase(from);
        }

        let count = taken.len();
        for (i, item) in taken {
            sink(UniqueItem::new(item), i);
        }

        let result = if emptied {
            MoveItemsResult::MovedAll
        } else {
            MoveItemsResult::MovedSome
        };
        (result, count)
    }

    /// Remove `item` from the pile at `p`, dropping the pile if it empties
    fn take_item_from(&mut self, p: Point, item: ItemId) -> bool {
        let Some(pile) = self.items.find_mut(p) else {
            return false;
        };
        if !pile.remove(item) {
            return false;
        }
        if pile.is_empty() {
            self.items.erase(p);
        }
        true
    }

    pub(crate) fn move_entity_by(&mut self, id: EntityId, v: Vec2) -> PlacementResult {
        let Some(from) = self.find(id) else {
            warn!("level {}: move of unknown {id}", self.id);
            return PlacementResult::FailedBadId;
        };
        let Some(to) = from.checked_add(v) else {
            return PlacementResult::FailedBounds;
        };
        if to == from {
            return PlacementResult::Ok;
        }

        let result = self.can_place_entity_at(to);
        if result.is_ok() {
            self.entities.move_key_to(id, to);
            trace!("level {}: {id} {from:?} -> {to:?}", self.id);
        }
        result
    }

    pub(crate) fn move_item_by(&mut self, item: ItemId, v: Vec2) -> PlacementResult {
        let Some((pile, from)) = self.find_item(item) else {
            warn!("level {}: move of unknown {item}", self.id);
            return PlacementResult::FailedBadId;
        };
        let (pile_id, alone) = (pile.id(), pile.len() == 1);
        let Some(to) = from.checked_add(v) else {
            return PlacementResult::FailedBounds;
        };
        if to == from {
            return PlacementResult::Ok;
        }

        let result = self.can_place_item_at(to);
        if !result.is_ok() {
            return result;
        }

        if alone && self.items.find(to).is_none() {
            // A lone item carries its pile along
            self.items.move_key_to(pile_id, to);
        } else {
            self.take_item_from(from, item);
            self.insert_item(item, to);
        }
        trace!("level {}: {item} {from:?} -> {to:?}", self.id);
        result
    }

    /// Batch move for the whole entity population
    ///
    /// `transform` proposes a new position for each entity from its id and
    /// current position and must not have side effects. Each proposal is
    /// validated like [`move_by`](Self::move_by); entities are processed in
    /// index order, so later entities see earlier moves. `on_move` is called
    /// with the old and new position of every entity that actually moved.
    pub fn transform_entities<T, C>(&mut self, mut transform: T, mut on_move: C)
    where
        T: FnMut(EntityId, Point) -> Point,
        C: FnMut(EntityId, Point, Point),
    {
        let snapshot: Vec<(EntityId, Point)> =
            self.entities.iter().map(|(p, &id)| (id, p)).collect();

        for (id, from) in snapshot {
            let to = transform(id, from);
            if to == from || !self.can_place_entity_at(to).is_ok() {
                continue;
            }

            let moved = self
                .entities
                .move_key_to_if(id, |_, current| (current == from).then_some(to));
            // Nothing else mutates the index during the pass
            assert!(moved, "{id} left {from:?} during transform_entities");

            on_move(id, from, to);
        }
    }

    // ========================================================================
    // Tiles
    // ========================================================================

    /// Rewrite the tile at `p`
    ///
    /// Neighbouring walls are re-tiled to match. Returns the tile ids of the
    /// area that changed so the renderer can update just that part; the view
    /// is empty if `p` is off the map.
    pub fn update_tile_at(&mut self, p: Point, data: &TileDataSet) -> SubRegion<'_, TileId> {
        if !self.set_tile(p, data) {
            warn!("level {}: tile update outside the map at {p:?}", self.id);
            return self.tile_ids(Rect::default());
        }
        let area = Rect::with_size(p.x, p.y, 1, 1).inflate(1);
        self.retile_walls(area);
        self.tile_ids(area)
    }

    /// Rewrite every tile in `area`, returning the (clipped) area affected
    pub fn fill_tiles(&mut self, area: Rect, data: &TileDataSet) -> Rect {
        let area = area.clamped_to(&self.bounds());
        for p in area.points() {
            self.set_tile(p, data);
        }
        let affected = area.inflate(1).clamped_to(&self.bounds());
        self.retile_walls(affected);
        affected
    }

    /// Write one tile and keep the region summaries in step
    fn set_tile(&mut self, p: Point, data: &TileDataSet) -> bool {
        let Some(i) = self.tile_ids.index_of(p) else {
            return false;
        };
        if let Some(id) = self.tile_ids.get_mut(p) {
            *id = data.id;
        }
        if let Some(kind) = self.tile_types.get_mut(p) {
            *kind = data.kind;
        }
        if let Some(flags) = self.tile_flags.get_mut(p) {
            *flags = data.flags;
        }

        let old = self.region_ids.as_slice()[i];
        let new = data.region_id.unwrap_or(old);
        if new != old {
            if let Some(r) = self.region_ids.get_mut(p) {
                *r = new;
            }
            self.regions[old as usize].tile_count -= 1;
            if self.regions.len() <= new as usize {
                self.regions.resize(new as usize + 1, RegionShape::default());
            }
            let shape = &mut self.regions[new as usize];
            shape.tile_count += 1;
            shape.bounds = shape.bounds.including(p);
        }
        true
    }

    /// Recompute the neighbour masks of every wall in `area`
    fn retile_walls(&mut self, area: Rect) {
        let area = area.clamped_to(&self.bounds());
        for p in area.points() {
            if self.tile_types.get(p) != Some(&TileType::Wall) {
                continue;
            }
            let mask = self.wall_mask(p);
            if let Some(id) = self.tile_ids.get_mut(p) {
                *id = TileId::Wall(mask);
            }
        }
    }

    fn wall_mask(&self, p: Point) -> u8 {
        let joins = |v: Vec2| self.tile_types.get(p + v).is_some_and(TileType::joins_walls);
        let mut mask = 0;
        if joins(Vec2::new(0, -1)) {
            mask |= wall_mask::NORTH;
        }
        if joins(Vec2::new(1, 0)) {
            mask |= wall_mask::EAST;
        }
        if joins(Vec2::new(0, 1)) {
            mask |= wall_mask::SOUTH;
        }
        if joins(Vec2::new(-1, 0)) {
            mask |= wall_mask::WEST;
        }
        mask
    }

    fn log_summary(&self) {
        debug!(
            "level {}: {}x{}, {} regions, {} up / {} down stairs",
            self.id,
            self.width(),
            self.height(),
            self.regions.len(),
            self.stairs_up.len(),
            self.stairs_down.len()
        );
    }
}
