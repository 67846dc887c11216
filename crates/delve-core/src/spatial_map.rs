//! Positional index
//!
//! Maps tile positions to values, with a second lookup path through each
//! value's identity key. Storage is a pair of parallel vectors scanned
//! linearly: a level holds at most a few hundred entities or item piles,
//! so a scan over contiguous memory beats any tree or hash structure here.
//!
//! The map keeps positions unique. Key uniqueness is the caller's
//! responsibility; lookups by a duplicated key resolve to the first match.

use crate::geom::Point;

/// Keyed-by-position container with an auxiliary lookup by identity key
///
/// `key_of` projects a value onto its identity key. For maps whose values
/// are their own keys, pass [`identity`].
#[derive(Debug, Clone)]
pub struct SpatialMap<V, K> {
    key_of: fn(&V) -> K,
    positions: Vec<Point>,
    values: Vec<V>,
    width: i32,
    height: i32,
}

/// Key projection for values that are their own key
pub fn identity<V: Copy>(v: &V) -> V {
    *v
}

impl<V, K: PartialEq> SpatialMap<V, K> {
    /// Create an empty map covering a `width` x `height` area
    pub fn new(width: i32, height: i32, key_of: fn(&V) -> K) -> Self {
        Self {
            key_of,
            positions: Vec::new(),
            values: Vec::new(),
            width,
            height,
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add `value` at `p` unless `p` is already occupied
    ///
    /// Returns the entry now at `p` and whether it was newly inserted. When
    /// `p` is occupied the existing entry is returned and `value` is dropped.
    pub fn insert(&mut self, p: Point, value: V) -> (&mut V, bool) {
        match self.offset_of_point(p) {
            Some(i) => (&mut self.values[i], false),
            None => (self.push(p, value), true),
        }
    }

    /// Add `value` at `p`, overwriting any existing entry there
    ///
    /// Returns the entry and whether it was newly inserted.
    pub fn insert_or_replace(&mut self, p: Point, value: V) -> (&mut V, bool) {
        match self.offset_of_point(p) {
            Some(i) => {
                self.values[i] = value;
                (&mut self.values[i], false)
            }
            None => (self.push(p, value), true),
        }
    }

    /// Value at `p`
    pub fn find(&self, p: Point) -> Option<&V> {
        self.offset_of_point(p).map(|i| &self.values[i])
    }

    /// Mutable value at `p`
    pub fn find_mut(&mut self, p: Point) -> Option<&mut V> {
        self.offset_of_point(p).map(|i| &mut self.values[i])
    }

    /// Value with identity key `k`, and its position
    pub fn find_key(&self, k: K) -> Option<(&V, Point)> {
        self.offset_of_key(&k)
            .map(|i| (&self.values[i], self.positions[i]))
    }

    /// Relocate the entry at `from` to `to`
    ///
    /// Returns false if nothing is at `from`. The map does not check whether
    /// `to` is already occupied; callers that care must check first.
    pub fn move_to(&mut self, from: Point, to: Point) -> bool {
        self.move_to_if(from, |_, _| Some(to))
    }

    /// Relocate the entry with key `k` to `to`
    pub fn move_key_to(&mut self, k: K, to: Point) -> bool {
        self.move_key_to_if(k, |_, _| Some(to))
    }

    /// Relocate the entry at `from` to the position chosen by `f`
    ///
    /// `f` sees the current value and position and returns the new
    /// position, or `None` to veto the move.
    pub fn move_to_if<F>(&mut self, from: Point, f: F) -> bool
    where
        F: FnOnce(&V, Point) -> Option<Point>,
    {
        match self.offset_of_point(from) {
            Some(i) => self.move_offset_if(i, f),
            None => false,
        }
    }

    /// Relocate the entry with key `k` to the position chosen by `f`
    pub fn move_key_to_if<F>(&mut self, k: K, f: F) -> bool
    where
        F: FnOnce(&V, Point) -> Option<Point>,
    {
        match self.offset_of_key(&k) {
            Some(i) => self.move_offset_if(i, f),
            None => false,
        }
    }

    /// Remove and return the entry at `p`
    pub fn erase(&mut self, p: Point) -> Option<V> {
        let i = self.offset_of_point(p)?;
        Some(self.remove_offset(i))
    }

    /// Remove and return the entry with key `k`, with its position
    pub fn erase_key(&mut self, k: K) -> Option<(V, Point)> {
        let i = self.offset_of_key(&k)?;
        let p = self.positions[i];
        Some((self.remove_offset(i), p))
    }

    /// Every occupied position, in storage order
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Every value, in the same order as [`positions`](Self::positions)
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Iterate over `(position, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (Point, &V)> + '_ {
        self.positions.iter().copied().zip(self.values.iter())
    }

    /// Visit every entry
    pub fn for_each<F: FnMut(&V, Point)>(&self, mut f: F) {
        for (p, v) in self.iter() {
            f(v, p);
        }
    }

    /// Visit entries until `f` returns false
    pub fn for_each_while<F: FnMut(&V, Point) -> bool>(&self, mut f: F) {
        for (p, v) in self.iter() {
            if !f(v, p) {
                break;
            }
        }
    }

    fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    fn push(&mut self, p: Point, value: V) -> &mut V {
        debug_assert!(self.in_bounds(p), "insert outside map at {p:?}");
        self.positions.push(p);
        self.values.push(value);
        let last = self.values.len() - 1;
        &mut self.values[last]
    }

    fn move_offset_if<F>(&mut self, i: usize, f: F) -> bool
    where
        F: FnOnce(&V, Point) -> Option<Point>,
    {
        match f(&self.values[i], self.positions[i]) {
            Some(to) => {
                debug_assert!(self.in_bounds(to), "move outside map to {to:?}");
                self.positions[i] = to;
                true
            }
            None => false,
        }
    }

    fn remove_offset(&mut self, i: usize) -> V {
        self.positions.remove(i);
        self.values.remove(i)
    }

    fn offset_of_point(&self, p: Point) -> Option<usize> {
        self.positions.iter().position(|&q| q == p)
    }

    fn offset_of_key(&self, k: &K) -> Option<usize> {
        self.values.iter().position(|v| (self.key_of)(v) == *k)
    }
}
