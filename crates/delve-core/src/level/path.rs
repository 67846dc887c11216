//! Path finding and line of sight over the static tile grid
//!
//! Both ignore entities: a path may lead through a monster and a monster
//! never hides what stands behind it.

use core::cmp::Reverse;
use std::collections::BinaryHeap;

use log::trace;

use super::Level;
use crate::geom::{Point, Vec2};
use crate::grid::Grid;

/// The eight king moves
const NEIGHBOURS: [Vec2; 8] = [
    Vec2::new(-1, -1),
    Vec2::new(0, -1),
    Vec2::new(1, -1),
    Vec2::new(-1, 0),
    Vec2::new(1, 0),
    Vec2::new(-1, 1),
    Vec2::new(0, 1),
    Vec2::new(1, 1),
];

impl Level {
    fn passable(&self, p: Point) -> bool {
        self.at(p).is_some_and(|t| !t.blocks_movement())
    }

    /// Shortest walking route from `from` to `to`
    ///
    /// On success `path` holds every step after `from`, ending with `to`,
    /// and true is returned. `path` is cleared first so one buffer can be
    /// reused turn after turn; on failure it is left empty. A target that is
    /// off the map or blocked is unreachable.
    pub fn find_path(&self, from: Point, to: Point, path: &mut Vec<Point>) -> bool {
        path.clear();
        if !self.bounds().contains(from) || !self.passable(to) {
            return false;
        }
        if from == to {
            return true;
        }

        let (w, h) = (self.width(), self.height());
        let mut cost: Grid<i32> = Grid::new(w, h, i32::MAX);
        let mut came_from: Grid<Option<Point>> = Grid::new(w, h, None);
        let mut open = BinaryHeap::new();

        if let Some(c) = cost.get_mut(from) {
            *c = 0;
        }
        // Ties on f go to the entry closer to the target
        open.push(Reverse((from.chebyshev(to), from.chebyshev(to), from.y, from.x)));

        let mut expanded = 0usize;
        while let Some(Reverse((_, _, y, x))) = open.pop() {
            let current = Point::new(x, y);
            if current == to {
                break;
            }
            let Some(&g) = cost.get(current) else {
                continue;
            };
            expanded += 1;

            for v in NEIGHBOURS {
                let next = current + v;
                if !self.passable(next) {
                    continue;
                }
                let g_next = g + 1;
                let Some(c) = cost.get_mut(next) else {
                    continue;
                };
                if g_next >= *c {
                    continue;
                }
                *c = g_next;
                if let Some(prev) = came_from.get_mut(next) {
                    *prev = Some(current);
                }
                let h = next.chebyshev(to);
                open.push(Reverse((g_next + h, h, next.y, next.x)));
            }
        }

        if came_from.get(to).is_none_or(Option::is_none) {
            trace!("level {}: no path {from:?} -> {to:?} ({expanded} expanded)", self.id);
            return false;
        }

        let mut p = to;
        while p != from {
            path.push(p);
            match came_from.get(p).copied().flatten() {
                Some(prev) => p = prev,
                None => break,
            }
        }
        path.reverse();
        true
    }

    /// Can something at `from` see `to`
    ///
    /// Traces a Bresenham line; any tile on it that blocks movement blocks
    /// sight, except that the blocking tile at the very end is itself
    /// visible. Points off the map are never visible.
    pub fn has_line_of_sight(&self, from: Point, to: Point) -> bool {
        let bounds = self.bounds();
        if !bounds.contains(from) || !bounds.contains(to) {
            return false;
        }

        let (mut x, mut y) = (from.x, from.y);
        let dx = (to.x - x).abs();
        let dy = -(to.y - y).abs();
        let sx = if x < to.x { 1 } else { -1 };
        let sy = if y < to.y { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            let here = Point::new(x, y);
            if here == to {
                return true;
            }
            if here != from && !self.passable(here) {
                return false;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}
