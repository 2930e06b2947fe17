use serde::{Deserialize, Serialize};

/// 1-indexed grid coordinate of a widget's top-left (anchor) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub col: u32,
    pub row: u32,
}

impl GridPos {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl Default for GridPos {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Extent of a widget measured in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub x: u32,
    pub y: u32,
}

impl GridSize {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Rectangle of grid cells `[row, row + y) × [col, col + x)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridRect {
    pub pos: GridPos,
    pub size: GridSize,
}

impl GridRect {
    pub const fn new(pos: GridPos, size: GridSize) -> Self {
        Self { pos, size }
    }

    /// First column past the right edge.
    pub fn end_col(&self) -> u32 {
        self.pos.col.saturating_add(self.size.x)
    }

    /// First row past the bottom edge.
    pub fn end_row(&self) -> u32 {
        self.pos.row.saturating_add(self.size.y)
    }

    pub fn contains(&self, col: u32, row: u32) -> bool {
        col >= self.pos.col && col < self.end_col() && row >= self.pos.row && row < self.end_row()
    }

    pub fn intersects(&self, other: &GridRect) -> bool {
        self.pos.col < other.end_col()
            && other.pos.col < self.end_col()
            && self.pos.row < other.end_row()
            && other.pos.row < self.end_row()
    }

    /// Every cell of the rectangle in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (self.pos.row..self.end_row())
            .flat_map(move |row| (self.pos.col..self.end_col()).map(move |col| (row, col)))
    }
}

/// Pointer or element offset in pixels, relative to the container origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPos {
    pub left: f64,
    pub top: f64,
}

impl PixelPos {
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Rendered box of a widget: pixel offset, pixel dimensions and stacking order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
}

impl PixelRect {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}
