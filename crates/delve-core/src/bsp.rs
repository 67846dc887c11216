//! Region generator (binary space partitioning)
//!
//! Recursively splits the level bounds into a tree of non-overlapping
//! regions, then optionally carves a room rectangle inside each leaf.
//!
//! The tree is an arena: nodes live in a flat vector and refer to each
//! other by index. The two children of a split are pushed together, so a
//! node's children are always a contiguous slice starting at
//! `first_child`.
//!
//! Leaves are also exposed as a separate sequence sorted by descending
//! `min(width, height)` then descending area, so callers placing special
//! features (stairs) can walk the biggest, squarest rooms first. Keeping
//! that ordering separate from the arena leaves every parent and child
//! index valid.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GenError;
use crate::geom::Rect;
use crate::rng::GameRng;

/// Generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspParams {
    pub width: i32,
    pub height: i32,
    pub min_region_size: i32,
    pub max_region_size: i32,
    pub min_room_size: i32,
    pub max_room_size: i32,
    pub room_chance_num: u32,
    pub room_chance_den: u32,
    /// Chance that a region already within `max_region_size` stops splitting
    pub stop_chance_num: u32,
    pub stop_chance_den: u32,
    /// Standard deviation of the split offset around the midpoint
    pub split_variance: f64,
}

impl Default for BspParams {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            min_region_size: DEFAULT_MIN_REGION_SIZE,
            max_region_size: DEFAULT_MAX_REGION_SIZE,
            min_room_size: DEFAULT_MIN_ROOM_SIZE,
            max_room_size: DEFAULT_MAX_ROOM_SIZE,
            room_chance_num: DEFAULT_ROOM_CHANCE_NUM,
            room_chance_den: DEFAULT_ROOM_CHANCE_DEN,
            stop_chance_num: DEFAULT_STOP_CHANCE_NUM,
            stop_chance_den: DEFAULT_STOP_CHANCE_DEN,
            split_variance: DEFAULT_SPLIT_VARIANCE,
        }
    }
}

impl BspParams {
    /// Parameters for a `width` x `height` area, everything else default
    pub fn with_size(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Check every precondition the generator relies on
    pub fn validate(&self) -> Result<(), GenError> {
        if self.min_region_size < 1 || self.min_room_size < 1 {
            return Err(GenError::NonPositiveSize {
                region: self.min_region_size,
                room: self.min_room_size,
            });
        }
        if self.min_region_size > self.max_region_size {
            return Err(GenError::RegionSizeOrder {
                min: self.min_region_size,
                max: self.max_region_size,
            });
        }
        // Anything longer than the maximum must still split into two minimums
        if i64::from(self.max_region_size) < 2 * i64::from(self.min_region_size) - 1 {
            return Err(GenError::MaxRegionTooSmall {
                min: self.min_region_size,
                max: self.max_region_size,
            });
        }
        if self.min_room_size > self.max_room_size {
            return Err(GenError::RoomSizeOrder {
                min: self.min_room_size,
                max: self.max_room_size,
            });
        }
        if self.width < self.min_region_size || self.height < self.min_region_size {
            return Err(GenError::RegionTooSmall {
                width: self.width,
                height: self.height,
                min: self.min_region_size,
            });
        }
        if self.room_chance_den == 0 || self.room_chance_num > self.room_chance_den {
            return Err(GenError::BadRoomChance {
                num: self.room_chance_num,
                den: self.room_chance_den,
            });
        }
        if self.stop_chance_den == 0 || self.stop_chance_num > self.stop_chance_den {
            return Err(GenError::BadStopChance {
                num: self.stop_chance_num,
                den: self.stop_chance_den,
            });
        }
        if !self.split_variance.is_finite() || self.split_variance < 0.0 {
            return Err(GenError::BadVariance(self.split_variance));
        }

        // Worst case: every leaf at minimum size, plus one internal node per leaf
        let cols = (self.width / self.min_region_size) as usize;
        let rows = (self.height / self.min_region_size) as usize;
        if cols.saturating_mul(rows).saturating_mul(2) > MAX_REGIONS {
            return Err(GenError::TooLarge {
                width: self.width,
                height: self.height,
                min: self.min_region_size,
                limit: MAX_REGIONS,
            });
        }

        Ok(())
    }

    pub fn bounds(&self) -> Rect {
        Rect::with_size(0, 0, self.width, self.height)
    }
}

/// A node of the region tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionNode {
    /// Area covered by this region
    pub rect: Rect,
    /// Room carved inside a leaf, if any
    pub room: Option<Rect>,
    /// Arena index of the parent; `None` for the root
    pub parent: Option<u16>,
    /// Arena index of the first of two contiguous children; `None` for a leaf
    pub first_child: Option<u16>,
    /// Distance from the root
    pub depth: u16,
}

impl RegionNode {
    fn root(rect: Rect) -> Self {
        Self {
            rect,
            room: None,
            parent: None,
            first_child: None,
            depth: 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }
}

/// Number of children produced by one split
const CHILDREN_PER_SPLIT: usize = 2;

/// Recursive subdivision generator
#[derive(Debug, Clone)]
pub struct BspGenerator {
    params: BspParams,
    nodes: Vec<RegionNode>,
    /// Arena indices of the leaves, in "biggest room first" order
    leaves: Vec<u16>,
}

impl BspGenerator {
    /// Create a generator, rejecting inconsistent parameters
    pub fn new(params: BspParams) -> Result<Self, GenError> {
        params.validate()?;
        Ok(Self {
            params,
            nodes: Vec::new(),
            leaves: Vec::new(),
        })
    }

    pub fn params(&self) -> &BspParams {
        &self.params
    }

    /// Build a fresh tree, discarding any previous one
    pub fn generate(&mut self, rng: &mut GameRng) {
        self.clear();
        self.nodes.push(RegionNode::root(self.params.bounds()));

        // Breadth first: children appended at the end keep siblings adjacent
        let mut i = 0;
        while i < self.nodes.len() {
            let node = self.nodes[i];
            if let Some((a, b)) = self.split(rng, &node.rect) {
                let first = self.nodes.len() as u16;
                self.nodes[i].first_child = Some(first);
                for rect in [a, b] {
                    self.nodes.push(RegionNode {
                        rect,
                        room: None,
                        parent: Some(i as u16),
                        first_child: None,
                        depth: node.depth + 1,
                    });
                }
            }
            i += 1;
        }

        for node in self.nodes.iter_mut().filter(|n| n.is_leaf()) {
            if rng.chance(self.params.room_chance_num, self.params.room_chance_den) {
                node.room = random_room(rng, &self.params, &node.rect);
            }
        }

        self.leaves = (0..self.nodes.len())
            .filter(|&i| self.nodes[i].is_leaf())
            .map(|i| i as u16)
            .collect();
        let nodes = &self.nodes;
        // Stable: equal leaves keep generation order
        self.leaves.sort_by(|&a, &b| {
            let (a, b) = (&nodes[a as usize].rect, &nodes[b as usize].rect);
            b.min_dimension()
                .cmp(&a.min_dimension())
                .then(b.area().cmp(&a.area()))
        });

        debug!(
            "bsp: {} nodes, {} leaves, {} rooms over {}x{}",
            self.nodes.len(),
            self.leaves.len(),
            self.iter().filter(|n| n.room.is_some()).count(),
            self.params.width,
            self.params.height
        );
    }

    /// Decide whether and where to split `r`
    fn split(&self, rng: &mut GameRng, r: &Rect) -> Option<(Rect, Rect)> {
        let p = &self.params;
        let (w, h) = (r.width(), r.height());

        // Split across the longer axis; a square is cut into left and right halves
        let split_x = w >= h;
        let len = if split_x { w } else { h };

        if len < 2 * p.min_region_size {
            return None;
        }
        let oversized = w > p.max_region_size || h > p.max_region_size;
        if !oversized && rng.chance(p.stop_chance_num, p.stop_chance_den) {
            return None;
        }

        let mid = f64::from(len) / 2.0;
        let at = (rng.normal(mid, p.split_variance).round() as i32)
            .clamp(p.min_region_size, len - p.min_region_size);

        Some(if split_x {
            (
                Rect::new(r.x0, r.y0, r.x0 + at, r.y1),
                Rect::new(r.x0 + at, r.y0, r.x1, r.y1),
            )
        } else {
            (
                Rect::new(r.x0, r.y0, r.x1, r.y0 + at),
                Rect::new(r.x0, r.y0 + at, r.x1, r.y1),
            )
        })
    }

    /// Drop the current tree
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.leaves.clear();
    }

    /// Number of leaves
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// The `i`th leaf in sorted order
    pub fn get(&self, i: usize) -> Option<&RegionNode> {
        self.leaves.get(i).map(|&n| &self.nodes[n as usize])
    }

    /// Leaves, biggest first
    pub fn iter(&self) -> impl Iterator<Item = &RegionNode> + '_ {
        self.leaves.iter().map(|&n| &self.nodes[n as usize])
    }

    /// Arena indices of the leaves, in the same order as [`iter`](Self::iter)
    pub fn leaf_indices(&self) -> &[u16] {
        &self.leaves
    }

    /// Every node of the tree in generation order; the root is index 0
    pub fn nodes(&self) -> &[RegionNode] {
        &self.nodes
    }

    /// The children of arena node `i`; empty for a leaf
    pub fn children(&self, i: usize) -> &[RegionNode] {
        match self.nodes.get(i).and_then(|n| n.first_child) {
            Some(first) => {
                let first = first as usize;
                &self.nodes[first..first + CHILDREN_PER_SPLIT]
            }
            None => &[],
        }
    }
}

/// Pick a room rectangle inside `leaf`, or `None` if no room fits
fn random_room(rng: &mut GameRng, p: &BspParams, leaf: &Rect) -> Option<Rect> {
    let max_w = p.max_room_size.min(leaf.width());
    let max_h = p.max_room_size.min(leaf.height());
    if max_w < p.min_room_size || max_h < p.min_room_size {
        return None;
    }

    let w = rng.range(p.min_room_size, max_w);
    let h = rng.range(p.min_room_size, max_h);
    let x = leaf.x0 + rng.range(0, leaf.width() - w);
    let y = leaf.y0 + rng.range(0, leaf.height() - h);

    Some(Rect::with_size(x, y, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(params: BspParams, seed: u64) -> BspGenerator {
        let mut bsp = BspGenerator::new(params).unwrap();
        bsp.generate(&mut GameRng::new(seed));
        bsp
    }

    #[test]
    fn test_rejects_inverted_sizes() {
        let params = BspParams {
            min_region_size: 10,
            max_region_size: 5,
            ..BspParams::default()
        };
        assert_eq!(
            BspGenerator::new(params).unwrap_err(),
            GenError::RegionSizeOrder { min: 10, max: 5 }
        );

        let params = BspParams {
            min_room_size: 8,
            max_room_size: 4,
            ..BspParams::default()
        };
        assert!(matches!(
            BspGenerator::new(params),
            Err(GenError::RoomSizeOrder { .. })
        ));
    }

    #[test]
    fn test_rejects_unsplittable_maximum() {
        let params = BspParams {
            min_region_size: 8,
            max_region_size: 10,
            ..BspParams::with_size(50, 40)
        };
        assert_eq!(
            params.validate(),
            Err(GenError::MaxRegionTooSmall { min: 8, max: 10 })
        );

        // 15 is the smallest maximum a minimum of 8 allows
        let params = BspParams {
            max_region_size: 15,
            ..params
        };
        let bsp = generated(params.clone(), 11);
        for leaf in bsp.iter() {
            assert!(leaf.rect.width() <= 15 && leaf.rect.height() <= 15);
            assert!(leaf.rect.width() >= 8 && leaf.rect.height() >= 8);
        }
    }

    #[test]
    fn test_rejects_bad_chances() {
        let params = BspParams {
            room_chance_den: 0,
            ..BspParams::default()
        };
        assert!(matches!(params.validate(), Err(GenError::BadRoomChance { .. })));

        let params = BspParams {
            stop_chance_num: 5,
            stop_chance_den: 4,
            ..BspParams::default()
        };
        assert!(matches!(params.validate(), Err(GenError::BadStopChance { .. })));

        let params = BspParams {
            split_variance: f64::NAN,
            ..BspParams::default()
        };
        assert!(matches!(params.validate(), Err(GenError::BadVariance(_))));
    }

    #[test]
    fn test_rejects_tiny_level() {
        let params = BspParams::with_size(2, 50);
        assert!(matches!(params.validate(), Err(GenError::RegionTooSmall { .. })));
    }

    #[test]
    fn test_rejects_huge_level() {
        let params = BspParams {
            min_region_size: 1,
            ..BspParams::with_size(1000, 1000)
        };
        assert!(matches!(params.validate(), Err(GenError::TooLarge { .. })));
    }

    #[test]
    fn test_root_covers_bounds() {
        let bsp = generated(BspParams::with_size(50, 40), 1);
        let root = bsp.nodes()[0];
        assert_eq!(root.rect, Rect::new(0, 0, 50, 40));
        assert_eq!(root.parent, None);
        assert_eq!(root.depth, 0);
        assert!(!root.is_leaf());
    }

    #[test]
    fn test_children_are_contiguous_and_linked() {
        let bsp = generated(BspParams::with_size(60, 45), 2);
        for (i, node) in bsp.nodes().iter().enumerate() {
            let children = bsp.children(i);
            if node.is_leaf() {
                assert!(children.is_empty());
                continue;
            }
            assert_eq!(children.len(), 2);
            for child in children {
                assert_eq!(child.parent, Some(i as u16));
                assert_eq!(child.depth, node.depth + 1);
            }
            // The two halves tile the parent exactly
            assert_eq!(children[0].rect.area() + children[1].rect.area(), node.rect.area());
        }
    }

    #[test]
    fn test_leaves_partition_bounds() {
        let params = BspParams::with_size(50, 40);
        let bsp = generated(params.clone(), 3);
        let total: i32 = bsp.iter().map(|n| n.rect.area()).sum();
        assert_eq!(total, params.width * params.height);
        for leaf in bsp.iter() {
            assert!(leaf.rect.width() >= params.min_region_size);
            assert!(leaf.rect.height() >= params.min_region_size);
        }
    }

    #[test]
    fn test_oversized_regions_always_split() {
        let params = BspParams {
            stop_chance_num: 1,
            stop_chance_den: 1,
            ..BspParams::with_size(80, 60)
        };
        let bsp = generated(params.clone(), 4);
        for leaf in bsp.iter() {
            assert!(leaf.rect.width() <= params.max_region_size);
            assert!(leaf.rect.height() <= params.max_region_size);
        }
    }

    #[test]
    fn test_rooms_inside_leaves() {
        let params = BspParams::with_size(70, 50);
        let bsp = generated(params.clone(), 5);
        let mut rooms = 0;
        for leaf in bsp.iter() {
            if let Some(room) = leaf.room {
                rooms += 1;
                assert!(leaf.rect.contains_rect(&room));
                assert!(room.width() >= params.min_room_size);
                assert!(room.height() >= params.min_room_size);
            }
        }
        assert!(rooms > 0);

        for node in bsp.nodes().iter().filter(|n| !n.is_leaf()) {
            assert!(node.room.is_none());
        }
    }

    #[test]
    fn test_no_rooms_at_zero_chance() {
        let params = BspParams {
            room_chance_num: 0,
            ..BspParams::with_size(50, 40)
        };
        let bsp = generated(params, 6);
        assert!(bsp.iter().all(|n| n.room.is_none()));
    }

    #[test]
    fn test_same_seed_same_tree() {
        let a = generated(BspParams::with_size(50, 40), 77);
        let b = generated(BspParams::with_size(50, 40), 77);
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.leaf_indices(), b.leaf_indices());
    }

    #[test]
    fn test_generate_resets() {
        let mut bsp = BspGenerator::new(BspParams::with_size(50, 40)).unwrap();
        let mut rng = GameRng::new(8);
        bsp.generate(&mut rng);
        bsp.generate(&mut rng);
        let total: i32 = bsp.iter().map(|n| n.rect.area()).sum();
        assert_eq!(total, 50 * 40);

        bsp.clear();
        assert!(bsp.is_empty());
        assert!(bsp.nodes().is_empty());
        assert!(bsp.get(0).is_none());
    }
}
