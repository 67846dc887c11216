//! Level generation: regions, rooms, tunnels, doors and stairs

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use super::{Level, PlacementResult, RegionShape};
use crate::bsp::{BspGenerator, BspParams};
use crate::consts::{CLOSED_DOOR_ONE_IN, STAIRS_PER_DIRECTION, STAIR_PLACEMENT_RADIUS};
use crate::error::GenError;
use crate::geom::{Point, Rect};
use crate::rng::GameRng;
use crate::tile::{TileDataSet, TileType};

/// Everything [`Level::generate`] needs besides the random source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    pub bsp: BspParams,
    /// One in this many tunnel doors is generated closed
    pub closed_door_one_in: u32,
    pub stairs_up: usize,
    pub stairs_down: usize,
    /// How far from a room's centre a staircase may land
    pub stair_radius: i32,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            bsp: BspParams::default(),
            closed_door_one_in: CLOSED_DOOR_ONE_IN,
            stairs_up: STAIRS_PER_DIRECTION,
            stairs_down: STAIRS_PER_DIRECTION,
            stair_radius: STAIR_PLACEMENT_RADIUS,
        }
    }
}

impl LevelParams {
    /// Parameters for a `width` x `height` level, everything else default
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            bsp: BspParams::with_size(width, height),
            ..Self::default()
        }
    }
}

impl Level {
    /// Generate a complete level
    ///
    /// Every leaf region of a fresh subdivision becomes a level region,
    /// numbered in the generator's "biggest first" order. Rooms are carved
    /// as a wall ring around a floor, sibling subtrees are joined with
    /// tunnels (a door wherever a tunnel breaks through a wall), walls are
    /// auto-tiled and stairs are put in the biggest rooms.
    pub fn generate(rng: &mut GameRng, params: &LevelParams, id: usize) -> Result<Level, GenError> {
        let mut bsp = BspGenerator::new(params.bsp.clone())?;
        bsp.generate(rng);

        let mut level = Level::new(params.bsp.width, params.bsp.height, id);
        level.label_regions(&bsp);

        for room in bsp.iter().filter_map(|leaf| leaf.room) {
            level.carve_room(room);
        }
        level.connect_subtrees(rng, &bsp, params.closed_door_one_in);
        level.retile_walls(level.bounds());
        level.place_stairs(rng, &bsp, params);

        level.log_summary();
        Ok(level)
    }

    /// Number every tile after the sorted leaf that covers it
    fn label_regions(&mut self, bsp: &BspGenerator) {
        self.regions = bsp
            .iter()
            .map(|leaf| RegionShape {
                bounds: leaf.rect,
                room: leaf.room,
                tile_count: leaf.rect.area(),
            })
            .collect();

        for (i, leaf) in bsp.iter().enumerate() {
            for p in leaf.rect.points() {
                if let Some(r) = self.region_ids.get_mut(p) {
                    *r = i as u16;
                }
            }
        }
    }

    fn carve_room(&mut self, room: Rect) {
        let wall = TileDataSet::wall();
        let floor = TileDataSet::floor();
        for p in room.points() {
            let data = if room.on_edge(p) { &wall } else { &floor };
            self.set_tile(p, data);
        }
    }

    /// Join the two halves of every split with a tunnel
    fn connect_subtrees(&mut self, rng: &mut GameRng, bsp: &BspGenerator, closed_one_in: u32) {
        let nodes = bsp.nodes();
        for i in (0..nodes.len()).rev() {
            let Some(first) = nodes[i].first_child else {
                continue;
            };
            let first = first as usize;
            let a = tunnel_end(rng, bsp, first);
            let b = tunnel_end(rng, bsp, first + 1);
            trace!("level {}: tunnel {a:?} -> {b:?}", self.id);
            self.dig_tunnel(rng, a, b, closed_one_in);
        }
    }

    /// Dig from `from` to `to` one orthogonal step at a time
    ///
    /// Each step goes along the axis with more distance left, now and then
    /// taking the other one so tunnels wander a little.
    fn dig_tunnel(&mut self, rng: &mut GameRng, from: Point, to: Point, closed_one_in: u32) {
        let mut p = from;
        self.dig(rng, p, closed_one_in);
        while p != to {
            let (dx, dy) = (to.x - p.x, to.y - p.y);
            let step_x = if dx == 0 {
                false
            } else if dy == 0 {
                true
            } else if dx.abs() == dy.abs() {
                rng.coin_flip()
            } else if dx.abs() > dy.abs() {
                rng.rn2(dx.unsigned_abs() + 1) > 0
            } else {
                rng.rn2(dy.unsigned_abs() + 1) == 0
            };

            if step_x {
                p.x += dx.signum();
            } else {
                p.y += dy.signum();
            }
            self.dig(rng, p, closed_one_in);
        }
    }

    /// Open up one tunnel tile; walls become doors, open floor is left alone
    fn dig(&mut self, rng: &mut GameRng, p: Point, closed_one_in: u32) {
        let data = match self.tile_types.get(p) {
            Some(TileType::Empty) => TileDataSet::tunnel(),
            Some(TileType::Wall) if closed_one_in > 0 && rng.one_in(closed_one_in) => {
                TileDataSet::closed_door()
            }
            Some(TileType::Wall) => TileDataSet::open_door(),
            _ => return,
        };
        self.set_tile(p, &data);
    }

    /// Put the up stairs in the biggest rooms, then the down stairs
    ///
    /// Without enough rooms the remaining stairs go near leaf centres, which
    /// tunnels always reach. Stairs only replace floor.
    fn place_stairs(&mut self, rng: &mut GameRng, bsp: &BspGenerator, params: &LevelParams) {
        let rooms = bsp.iter().filter_map(|leaf| leaf.room.map(|r| r.center()));
        let leaves = bsp.iter().map(|leaf| leaf.rect.center());
        let anchors: Vec<Point> = rooms.chain(leaves).collect();

        let on_floor = |level: &Level, p: Point| match level.can_place_item_at(p) {
            PlacementResult::Ok if level.at(p).is_some_and(|t| t.kind != TileType::Floor) => {
                PlacementResult::FailedObstacle
            }
            r => r,
        };

        let wanted = [
            (params.stairs_up, TileDataSet::stair_up(), true),
            (params.stairs_down, TileDataSet::stair_down(), false),
        ];
        let mut cursor = 0;
        for (count, data, up) in wanted {
            for _ in 0..count {
                let found = (0..anchors.len()).find_map(|k| {
                    let anchor = anchors[(cursor + k) % anchors.len()];
                    self.find_nearest_random(rng, anchor, params.stair_radius, on_floor)
                        .ok()
                        .map(|p| (k, p))
                });
                let Some((k, p)) = found else {
                    warn!("level {}: no floor left for {:?}", self.id, data.id);
                    continue;
                };
                cursor += k + 1;
                self.set_tile(p, &data);
                if up {
                    self.stairs_up.push(p);
                } else {
                    self.stairs_down.push(p);
                }
            }
        }
    }
}

/// A point inside the subtree rooted at arena node `i` for a tunnel to end
///
/// A random room's interior if the subtree has rooms, otherwise the centre
/// of a random leaf.
fn tunnel_end(rng: &mut GameRng, bsp: &BspGenerator, i: usize) -> Point {
    let mut leaves = Vec::new();
    let mut stack = vec![i];
    while let Some(n) = stack.pop() {
        let node = &bsp.nodes()[n];
        match node.first_child {
            Some(first) => stack.extend([first as usize, first as usize + 1]),
            None => leaves.push(node),
        }
    }

    let rooms: Vec<Rect> = leaves.iter().filter_map(|leaf| leaf.room).collect();
    if let Some(room) = rng.choose(&rooms) {
        let inside = room.inflate(-1);
        if inside.is_empty() {
            return room.center();
        }
        return Point::new(
            rng.range(inside.x0, inside.x1 - 1),
            rng.range(inside.y0, inside.y1 - 1),
        );
    }
    match rng.choose(&leaves) {
        Some(leaf) => leaf.rect.center(),
        None => bsp.nodes()[i].rect.center(),
    }
}
