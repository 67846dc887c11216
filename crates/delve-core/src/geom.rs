//! Integer geometry: points, offsets and half-open rectangles

use core::ops::{Add, AddAssign, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A tile coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king move) distance, saturating at `i32::MAX`
    pub fn chebyshev(self, other: Point) -> i32 {
        let d = self.x.abs_diff(other.x).max(self.y.abs_diff(other.y));
        i32::try_from(d).unwrap_or(i32::MAX)
    }

    /// `self + v`, or `None` if either coordinate overflows
    pub fn checked_add(self, v: Vec2) -> Option<Point> {
        Some(Point::new(self.x.checked_add(v.x)?, self.y.checked_add(v.y)?))
    }
}

/// A displacement between two points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const ZERO: Vec2 = Vec2::new(0, 0);
}

impl Add<Vec2> for Point {
    type Output = Point;

    fn add(self, v: Vec2) -> Point {
        Point::new(self.x + v.x, self.y + v.y)
    }
}

impl AddAssign<Vec2> for Point {
    fn add_assign(&mut self, v: Vec2) {
        self.x += v.x;
        self.y += v.y;
    }
}

impl Sub for Point {
    type Output = Vec2;

    fn sub(self, other: Point) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis aligned rectangle covering `x0..x1` by `y0..y1` (upper bounds exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Rect {
    /// Create a rectangle from its corners
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle from an origin and a size
    pub const fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub const fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub const fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    pub const fn area(&self) -> i32 {
        self.width() * self.height()
    }

    /// The smaller of the two dimensions
    pub fn min_dimension(&self) -> i32 {
        self.width().min(self.height())
    }

    pub const fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Integer centroid, rounded toward the top left
    pub const fn center(&self) -> Point {
        Point::new(self.x0 + self.width() / 2, self.y0 + self.height() / 2)
    }

    /// Check if a point lies inside this rectangle
    pub const fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x < self.x1 && p.y >= self.y0 && p.y < self.y1
    }

    /// Check if this rectangle fully contains another
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    /// Check if the two rectangles share at least one cell
    pub const fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Clip this rectangle to `bounds`; the result may be empty
    pub fn clamped_to(&self, bounds: &Rect) -> Rect {
        Rect::new(
            self.x0.clamp(bounds.x0, bounds.x1),
            self.y0.clamp(bounds.y0, bounds.y1),
            self.x1.clamp(bounds.x0, bounds.x1),
            self.y1.clamp(bounds.y0, bounds.y1),
        )
    }

    /// Grow (or shrink, for negative `n`) by `n` on every side
    pub const fn inflate(&self, n: i32) -> Rect {
        Rect::new(self.x0 - n, self.y0 - n, self.x1 + n, self.y1 + n)
    }

    /// Smallest rectangle covering this one and `p`; an empty rectangle becomes just `p`
    pub fn including(&self, p: Point) -> Rect {
        if self.is_empty() {
            return Rect::with_size(p.x, p.y, 1, 1);
        }
        Rect::new(
            self.x0.min(p.x),
            self.y0.min(p.y),
            self.x1.max(p.x + 1),
            self.y1.max(p.y + 1),
        )
    }

    /// Is `p` on the outermost ring of cells
    pub const fn on_edge(&self, p: Point) -> bool {
        self.contains(p)
            && (p.x == self.x0 || p.x == self.x1 - 1 || p.y == self.y0 || p.y == self.y1 - 1)
    }

    /// Every point in row-major order
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let r = *self;
        (r.y0..r.y1).flat_map(move |y| (r.x0..r.x1).map(move |x| Point::new(x, y)))
    }
}

/// Points at exactly Chebyshev distance `distance` from `p` that lie in `bounds`
///
/// A distance of zero yields `p` itself. Only the part of the ring inside
/// `bounds` is built, so a huge ring around a point far off the map costs
/// no more than one that hugs it.
pub fn points_around(p: Point, distance: i32, bounds: &Rect) -> Vec<Point> {
    let d = i64::from(distance.max(0));
    let (px, py) = (i64::from(p.x), i64::from(p.y));
    let (bx0, by0) = (i64::from(bounds.x0), i64::from(bounds.y0));
    let (bx1, by1) = (i64::from(bounds.x1), i64::from(bounds.y1));
    let inside_x = |x: i64| x >= bx0 && x < bx1;
    let inside_y = |y: i64| y >= by0 && y < by1;
    // In bounds, so always representable
    let point = |x: i64, y: i64| Point::new(x as i32, y as i32);

    if d == 0 {
        return if bounds.contains(p) { vec![p] } else { Vec::new() };
    }

    let mut out = Vec::new();
    for y in [py - d, py + d] {
        if inside_y(y) {
            out.extend(((px - d).max(bx0)..=(px + d).min(bx1 - 1)).map(|x| point(x, y)));
        }
    }
    for x in [px - d, px + d] {
        if inside_x(x) {
            out.extend(((py - d + 1).max(by0)..=(py + d - 1).min(by1 - 1)).map(|y| point(x, y)));
        }
    }
    out
}

/// Chebyshev distance from `p` to the nearest and to the farthest cell of
/// `bounds` (which must not be empty), saturating at `i32::MAX`
pub fn distance_range(p: Point, bounds: &Rect) -> (i32, i32) {
    let (px, py) = (i64::from(p.x), i64::from(p.y));
    let (x0, x1) = (i64::from(bounds.x0), i64::from(bounds.x1) - 1);
    let (y0, y1) = (i64::from(bounds.y0), i64::from(bounds.y1) - 1);

    let near_x = (x0 - px).max(px - x1).max(0);
    let near_y = (y0 - py).max(py - y1).max(0);
    let far_x = (px - x0).abs().max((px - x1).abs());
    let far_y = (py - y0).abs().max((py - y1).abs());

    let clamp = |d: i64| i32::try_from(d).unwrap_or(i32::MAX);
    (clamp(near_x.max(near_y)), clamp(far_x.max(far_y)))
}
