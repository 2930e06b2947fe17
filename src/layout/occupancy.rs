//! Sparse cell occupancy for the widget grid.
//!
//! Each occupied cell maps to the id of the widget covering it. Rows and
//! columns are kept in ordered maps so scans are deterministic: row-major
//! for collisions and vertical cascades, column-major for horizontal ones.
//!
//! # Example
//! ```
//! use cascade_grid::geometry::{GridPos, GridRect, GridSize};
//! use cascade_grid::layout::{OccupancyMap, RectLookup};
//! use cascade_grid::widget::WidgetId;
//!
//! struct One(GridRect);
//! impl RectLookup for One {
//!     fn rect_of(&self, _: &WidgetId) -> Option<GridRect> {
//!         Some(self.0)
//!     }
//! }
//!
//! let rect = GridRect::new(GridPos::new(1, 1), GridSize::new(2, 2));
//! let mut map = OccupancyMap::new();
//! map.add(&"a".to_string(), rect);
//!
//! let query = GridRect::new(GridPos::new(2, 2), GridSize::new(1, 1));
//! assert_eq!(map.collisions_in(query, &One(rect)), vec!["a".to_string()]);
//! ```

use std::collections::BTreeMap;

use crate::geometry::GridRect;
use crate::widget::WidgetId;

/// Resolves a widget id to its current grid rectangle.
pub trait RectLookup {
    fn rect_of(&self, id: &WidgetId) -> Option<GridRect>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyMap {
    rows: BTreeMap<u32, BTreeMap<u32, WidgetId>>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark every cell of `rect` as owned by `id`, replacing previous owners.
    pub fn add(&mut self, id: &WidgetId, rect: GridRect) {
        for (row, col) in rect.cells() {
            self.rows.entry(row).or_default().insert(col, id.clone());
        }
    }

    /// Clear every cell owned by `id`, wherever it sits. Returns the number
    /// of cells released.
    pub fn remove(&mut self, id: &WidgetId) -> usize {
        let mut released = 0;
        self.rows.retain(|_, cols| {
            let before = cols.len();
            cols.retain(|_, owner| owner != id);
            released += before - cols.len();
            !cols.is_empty()
        });
        released
    }

    pub fn get(&self, col: u32, row: u32) -> Option<&WidgetId> {
        self.rows.get(&row)?.get(&col)
    }

    /// Distinct owners of cells inside `rect`, in row-major order of first
    /// discovery. After a hit the scan jumps past the owner's known extent
    /// on that row.
    pub fn collisions_in(&self, rect: GridRect, lookup: &impl RectLookup) -> Vec<WidgetId> {
        let mut found: Vec<WidgetId> = Vec::new();
        let end_col = rect.end_col();

        for (_, cols) in self.rows.range(rect.pos.row..rect.end_row()) {
            let mut col = rect.pos.col;
            while col < end_col {
                let Some((&at, owner)) = cols.range(col..end_col).next() else {
                    break;
                };
                if !found.contains(owner) {
                    found.push(owner.clone());
                }
                col = match lookup.rect_of(owner) {
                    Some(owned) => owned.end_col().max(at + 1),
                    None => at + 1,
                };
            }
        }
        found
    }

    pub fn has_collision(&self, rect: GridRect) -> bool {
        self.rows
            .range(rect.pos.row..rect.end_row())
            .any(|(_, cols)| cols.range(rect.pos.col..rect.end_col()).next().is_some())
    }

    /// Drop cells whose owner no longer exists or no longer covers them,
    /// then prune empty rows.
    pub fn filter(&mut self, lookup: &impl RectLookup) {
        self.rows.retain(|&row, cols| {
            cols.retain(|&col, owner| {
                lookup
                    .rect_of(owner)
                    .is_some_and(|rect| rect.contains(col, row))
            });
            !cols.is_empty()
        });
    }

    /// First occupied cell in `row` at or right of `col`.
    pub fn next_in_row(&self, row: u32, col: u32) -> Option<(u32, &WidgetId)> {
        self.rows
            .get(&row)?
            .range(col..)
            .next()
            .map(|(&col, id)| (col, id))
    }

    /// First non-empty row at or below `row`.
    pub fn next_row(&self, row: u32) -> Option<u32> {
        self.rows.range(row..).next().map(|(&row, _)| row)
    }

    /// First occupied cell in `col` at or below `row`.
    pub fn next_in_col(&self, col: u32, row: u32) -> Option<(u32, &WidgetId)> {
        self.rows
            .range(row..)
            .find_map(|(&row, cols)| cols.get(&col).map(|id| (row, id)))
    }

    /// First non-empty column at or right of `col`.
    pub fn next_col(&self, col: u32) -> Option<u32> {
        self.rows
            .values()
            .filter_map(|cols| cols.range(col..).next().map(|(&col, _)| col))
            .min()
    }

    pub fn max_row(&self) -> u32 {
        self.rows.keys().next_back().copied().unwrap_or(0)
    }

    pub fn max_col(&self) -> u32 {
        self.rows
            .values()
            .filter_map(|cols| cols.keys().next_back().copied())
            .max()
            .unwrap_or(0)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Occupied cells as `(col, row, owner)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, &WidgetId)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, id)| (col, row, id)))
    }
}
