use crate::geometry::{GridPos, GridSize};

/// Maximum grid extent. Zero on an axis means that axis is unbounded.
///
/// A widget anchored in the first column (or row) is always considered
/// in bounds on that axis, so oversized widgets still have a home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub max_cols: u32,
    pub max_rows: u32,
}

impl Bounds {
    pub const fn new(max_cols: u32, max_rows: u32) -> Self {
        Self { max_cols, max_rows }
    }

    pub const fn unbounded() -> Self {
        Self::new(0, 0)
    }

    pub fn within_x(&self, pos: GridPos, size: GridSize) -> bool {
        self.max_cols == 0 || pos.col == 1 || last(pos.col, size.x) <= self.max_cols as u64
    }

    pub fn within_y(&self, pos: GridPos, size: GridSize) -> bool {
        self.max_rows == 0 || pos.row == 1 || last(pos.row, size.y) <= self.max_rows as u64
    }

    pub fn within(&self, pos: GridPos, size: GridSize) -> bool {
        self.within_x(pos, size) && self.within_y(pos, size)
    }

    /// Pull an overflowing anchor back to the right edge and bump it one row.
    pub fn fix_pos_x(&self, pos: GridPos, size: GridSize) -> GridPos {
        if self.within_x(pos, size) {
            return pos;
        }
        GridPos::new(fit(self.max_cols, size.x), pos.row.saturating_add(1))
    }

    /// Pull an overflowing anchor back to the bottom edge and bump it one column.
    pub fn fix_pos_y(&self, pos: GridPos, size: GridSize) -> GridPos {
        if self.within_y(pos, size) {
            return pos;
        }
        GridPos::new(pos.col.saturating_add(1), fit(self.max_rows, size.y))
    }

    pub fn fix_pos(&self, pos: GridPos, size: GridSize) -> GridPos {
        let pos = self.fix_pos_x(pos, size);
        self.fix_pos_y(pos, size)
    }

    /// Shrink an overflowing width to what is left of the row; the lost
    /// area is handed to the height.
    pub fn fix_size_x(&self, pos: GridPos, size: GridSize) -> GridSize {
        if self.within_x(pos, size) {
            return size;
        }
        GridSize::new(fit(self.max_cols, pos.col), size.y.saturating_add(1))
    }

    pub fn fix_size_y(&self, pos: GridPos, size: GridSize) -> GridSize {
        if self.within_y(pos, size) {
            return size;
        }
        GridSize::new(size.x.saturating_add(1), fit(self.max_rows, pos.row))
    }

    pub fn fix_size(&self, pos: GridPos, size: GridSize) -> GridSize {
        let size = self.fix_size_x(pos, size);
        self.fix_size_y(pos, size)
    }
}

fn last(start: u32, span: u32) -> u64 {
    (start as u64 + span as u64).saturating_sub(1)
}

/// `max - (n - 1)`, never below 1.
fn fit(max: u32, n: u32) -> u32 {
    (max as i64 - (n as i64 - 1)).max(1) as u32
}
