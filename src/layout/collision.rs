use crate::config::CascadeAxis;
use crate::error::Result;
use crate::geometry::{GridPos, GridRect};
use crate::widget::WidgetId;

use super::{GridState, LayoutNotice};

/// Clears space in the occupancy map by pushing colliding widgets along the
/// cascade axis.
pub struct CollisionResolver<'a> {
    state: &'a mut GridState,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(state: &'a mut GridState) -> Self {
        Self { state }
    }

    pub fn has_collision(&self, rect: GridRect) -> bool {
        !self.state.allow_overlap() && self.state.map.has_collision(rect)
    }

    pub fn collisions(&self, rect: GridRect) -> Vec<WidgetId> {
        if self.state.allow_overlap() {
            return Vec::new();
        }
        self.state.map.collisions_in(rect, &self.state.widgets)
    }

    /// Displace every widget overlapping `rect` until the area is free.
    ///
    /// The first collider is moved just past `rect` along the cascade axis;
    /// when that breaks the bounds it goes past `rect` on the other axis
    /// instead. Displaced widgets resolve their own collisions before they
    /// are written back.
    pub fn resolve(&mut self, rect: GridRect) {
        if self.state.allow_overlap() {
            return;
        }
        let bounds = self.state.bounds();
        let axis = self.state.axis();

        while let Some(id) = self.collisions(rect).into_iter().next() {
            let Some(current) = self.state.widgets.get(&id).map(|w| w.rect()) else {
                self.state.map.remove(&id);
                continue;
            };
            self.state.map.remove(&id);

            let mut pos = current.pos;
            match axis {
                CascadeAxis::Row => {
                    pos.row = rect.end_row();
                    if !bounds.within_y(pos, current.size) {
                        pos.col = rect.end_col();
                        pos.row = current.pos.row;
                    }
                }
                CascadeAxis::Column => {
                    pos.col = rect.end_col();
                    if !bounds.within_x(pos, current.size) {
                        pos.col = current.pos.col;
                        pos.row = rect.end_row();
                    }
                }
            }

            self.state.reposition(&id, pos);
            let moved = GridRect::new(pos, current.size);
            self.resolve(moved);
            self.state.map.add(&id, moved);
            self.state.notify(LayoutNotice::Displaced(id));
        }
    }

    /// Write a widget into the map at its current rectangle, displacing
    /// whatever is there. Every map insertion goes through here.
    pub fn place(&mut self, id: &WidgetId) -> Result<()> {
        let rect = self.state.widgets.require(id)?.rect();
        self.state.map.remove(id);
        self.resolve(rect);
        self.state.map.add(id, rect);
        Ok(())
    }

    /// Nearest free, in-bounds anchor for `rect`, searching along the
    /// cascade axis and wrapping to the next column or row at the bounds.
    /// Reads the map only.
    pub fn fix_grid_position(&self, rect: GridRect) -> GridPos {
        let bounds = self.state.bounds();
        let axis = self.state.axis();
        let size = rect.size;
        let mut pos = rect.pos;

        while self.has_collision(GridRect::new(pos, size)) || !bounds.within(pos, size) {
            let colliders = self.collisions(GridRect::new(pos, size));
            let rects: Vec<GridRect> = colliders
                .iter()
                .filter_map(|id| self.state.widgets.get(id).map(|w| w.rect()))
                .collect();
            if !colliders.is_empty() {
                match axis {
                    CascadeAxis::Row => {
                        pos.row = rects
                            .iter()
                            .map(GridRect::end_row)
                            .max()
                            .unwrap_or(pos.row + 1);
                    }
                    CascadeAxis::Column => {
                        pos.col = rects
                            .iter()
                            .map(GridRect::end_col)
                            .max()
                            .unwrap_or(pos.col + 1);
                    }
                }
            }
            if !bounds.within_y(pos, size) {
                pos.col += 1;
                pos.row = 1;
            }
            if !bounds.within_x(pos, size) {
                pos.row += 1;
                pos.col = 1;
            }
        }
        pos
    }
}
