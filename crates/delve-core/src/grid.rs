//! Dense row-major grids and strided sub-views over them

use crate::geom::{Point, Rect};

/// A `width` x `height` array stored row by row
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    width: i32,
    height: i32,
    cells: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Create a grid with every cell set to `fill`
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            cells: vec![fill; len],
        }
    }
}

impl<T> Grid<T> {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::with_size(0, 0, self.width, self.height)
    }

    /// Storage offset of `p`, if it lies on the grid
    pub fn index_of(&self, p: Point) -> Option<usize> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        Some((p.y * self.width + p.x) as usize)
    }

    pub fn get(&self, p: Point) -> Option<&T> {
        self.index_of(p).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, p: Point) -> Option<&mut T> {
        self.index_of(p).map(|i| &mut self.cells[i])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// A view of `area`, clipped to the grid
    pub fn sub_region(&self, area: Rect) -> SubRegion<'_, T> {
        SubRegion {
            cells: &self.cells,
            stride: self.width.max(0) as usize,
            area: area.clamped_to(&self.bounds()),
        }
    }
}

/// A rectangular window into a [`Grid`], read row by row without copying
#[derive(Debug)]
pub struct SubRegion<'a, T> {
    cells: &'a [T],
    stride: usize,
    area: Rect,
}

// Manual impls: a view is copyable whatever `T` is
impl<T> Clone for SubRegion<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SubRegion<'_, T> {}

impl<'a, T> SubRegion<'a, T> {
    /// The covered area, in grid coordinates
    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn width(&self) -> i32 {
        self.area.width().max(0)
    }

    pub fn height(&self) -> i32 {
        self.area.height().max(0)
    }

    /// Number of cells in the view
    pub fn len(&self) -> usize {
        (self.width() * self.height()) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell at `p`, in grid coordinates
    pub fn get(&self, p: Point) -> Option<&'a T> {
        if !self.area.contains(p) {
            return None;
        }
        self.cells.get(p.y as usize * self.stride + p.x as usize)
    }

    /// One slice per row, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &'a [T]> + use<'a, T> {
        let cells = self.cells;
        let stride = self.stride;
        let x0 = self.area.x0.max(0) as usize;
        let w = self.width() as usize;
        let rows = if w == 0 { 0..0 } else { self.area.y0..self.area.y1 };
        rows.map(move |y| {
            let start = y as usize * stride + x0;
            &cells[start..start + w]
        })
    }

    /// Every cell, row-major
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + use<'a, T> {
        self.rows().flatten()
    }
}
