use std::collections::HashMap;

use crate::config::CascadeAxis;
use crate::error::{GridError, Result};
use crate::geometry::{GridPos, GridRect, GridSize};
use crate::widget::WidgetId;

use super::{GridState, LayoutNotice, OccupancyMap};

/// A relocation made (or proposed) by a cascade pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub id: WidgetId,
    pub from: GridPos,
    pub to: GridPos,
}

/// Lowest free position per lane (column in row mode, row in column mode).
#[derive(Debug, Default)]
struct Frontier(HashMap<u32, u32>);

impl Frontier {
    fn at(&self, lane: u32) -> u32 {
        self.0.get(&lane).copied().unwrap_or(1)
    }

    fn lowest(&self, lanes: std::ops::Range<u32>) -> u32 {
        lanes.map(|lane| self.at(lane)).max().unwrap_or(1)
    }

    fn raise(&mut self, lanes: std::ops::Range<u32>, to: u32) {
        for lane in lanes {
            let slot = self.0.entry(lane).or_insert(1);
            *slot = (*slot).max(to);
        }
    }
}

/// Build a reservation from loose parts. A position without a size is a
/// caller error.
pub fn reservation(pos: Option<GridPos>, size: Option<GridSize>) -> Result<Option<GridRect>> {
    match (pos, size) {
        (Some(pos), Some(size)) => Ok(Some(GridRect::new(pos, size))),
        (Some(_), None) => Err(GridError::CascadeWithoutSize),
        (None, _) => Ok(None),
    }
}

/// Compacts widgets toward the cascade edge, keeping an optional
/// reservation rectangle clear.
pub struct CascadePacker<'a> {
    state: &'a mut GridState,
}

impl<'a> CascadePacker<'a> {
    pub fn new(state: &'a mut GridState) -> Self {
        Self { state }
    }

    /// Run the pass and apply it. Anchors are visited along the cascade
    /// axis first: row-major for up/down, column-major for left/right.
    /// Fixed widgets never move but still block the lanes they cover.
    pub fn cascade(&mut self, reserve: Option<GridRect>) -> Result<Vec<PlannedMove>> {
        if self.state.allow_overlap() || self.state.cascade().is_none() {
            return Ok(Vec::new());
        }
        let axis = self.state.axis();
        let bounds = self.state.bounds();
        let mut frontier = Frontier::default();
        let mut moves = Vec::new();

        let mut next_major = 1;
        while let Some(major) = next_line(&self.state.map, axis, next_major) {
            let mut next_minor = 1;
            while let Some((minor, id)) = next_cell(&self.state.map, axis, major, next_minor) {
                next_minor = minor + 1;
                let (col, row) = match axis {
                    CascadeAxis::Row => (minor, major),
                    CascadeAxis::Column => (major, minor),
                };

                let Some(widget) = self.state.widgets.get(&id) else {
                    continue;
                };
                let rect = widget.rect();
                let fixed = widget.is_fixed();
                if rect.pos != GridPos::new(col, row) {
                    continue;
                }

                let (lane, along, lanes, span) = match axis {
                    CascadeAxis::Row => (col, row, rect.pos.col..rect.end_col(), rect.size.y),
                    CascadeAxis::Column => (row, col, rect.pos.row..rect.end_row(), rect.size.x),
                };
                if along < frontier.at(lane) {
                    continue;
                }

                let mut target = rect.pos;
                if !fixed {
                    let mut lowest = frontier.lowest(lanes.clone());
                    if let Some(reserved) = reserve {
                        lowest = clear_of(reserved, rect, along, lowest, span, axis);
                    }
                    let candidate = match axis {
                        CascadeAxis::Row => GridPos::new(rect.pos.col, lowest),
                        CascadeAxis::Column => GridPos::new(lowest, rect.pos.row),
                    };
                    let within = match axis {
                        CascadeAxis::Row => bounds.within_y(candidate, rect.size),
                        CascadeAxis::Column => bounds.within_x(candidate, rect.size),
                    };
                    if candidate != rect.pos && within {
                        target = candidate;
                    }
                }

                if target != rect.pos {
                    self.state.map.remove(&id);
                    self.state.reposition(&id, target);
                    self.state.resolver().place(&id)?;
                    self.state.notify(LayoutNotice::Cascaded(id.clone()));
                    moves.push(PlannedMove {
                        id,
                        from: rect.pos,
                        to: target,
                    });
                }

                let settled = match axis {
                    CascadeAxis::Row => target.row,
                    CascadeAxis::Column => target.col,
                };
                frontier.raise(lanes, settled.saturating_add(span));
            }
            next_major = major + 1;
        }

        Ok(moves)
    }

    /// The moves `cascade` would make, computed on a scratch copy.
    pub fn preview(&self, reserve: Option<GridRect>) -> Result<Vec<PlannedMove>> {
        let mut scratch = self.state.clone();
        scratch.packer().cascade(reserve)
    }
}

/// Next non-empty row (row axis) or column (column axis) from `from`.
fn next_line(map: &OccupancyMap, axis: CascadeAxis, from: u32) -> Option<u32> {
    match axis {
        CascadeAxis::Row => map.next_row(from),
        CascadeAxis::Column => map.next_col(from),
    }
}

/// Next occupied cell on line `major`, at or after `minor`.
fn next_cell(
    map: &OccupancyMap,
    axis: CascadeAxis,
    major: u32,
    minor: u32,
) -> Option<(u32, WidgetId)> {
    let cell = match axis {
        CascadeAxis::Row => map.next_in_row(major, minor),
        CascadeAxis::Column => map.next_in_col(major, minor),
    };
    cell.map(|(at, id)| (at, id.clone()))
}

/// Push `lowest` past the reservation when the widget shares lanes with it
/// and would otherwise land inside or straddle it.
fn clear_of(
    reserved: GridRect,
    rect: GridRect,
    along: u32,
    lowest: u32,
    span: u32,
    axis: CascadeAxis,
) -> u32 {
    let (shares_lanes, start, end) = match axis {
        CascadeAxis::Row => (
            rect.pos.col < reserved.end_col() && reserved.pos.col < rect.end_col(),
            reserved.pos.row,
            reserved.end_row(),
        ),
        CascadeAxis::Column => (
            rect.pos.row < reserved.end_row() && reserved.pos.row < rect.end_row(),
            reserved.pos.col,
            reserved.end_col(),
        ),
    };
    if !shares_lanes {
        return lowest;
    }

    let inside = along >= start && along < end;
    let straddles =
        span as i64 > start as i64 - lowest as i64 && along >= end && lowest < end;
    if inside || straddles { end } else { lowest }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, GridOptions, Viewport};
    use crate::widget::{Widget, WidgetOptions};

    fn grid(cascade: &str) -> GridState {
        let options = GridOptions {
            cascade: Some(cascade.to_string()),
            ..GridOptions::default()
        };
        GridState::new(GridConfig::from_options(&options, Viewport::default()).unwrap())
    }

    fn add(state: &mut GridState, id: &str, options: WidgetOptions) {
        let widget = Widget::new(id, &options, state.config());
        state.widgets.insert(widget).unwrap();
        state.resolver().place(&id.to_string()).unwrap();
    }

    fn pos(state: &GridState, id: &str) -> GridPos {
        state.widgets.get(&id.to_string()).unwrap().position()
    }

    fn rect(col: u32, row: u32, x: u32, y: u32) -> GridRect {
        GridRect::new(GridPos::new(col, row), GridSize::new(x, y))
    }

    #[test]
    fn up_closes_vertical_gaps() {
        let mut state = grid("up");
        add(&mut state, "a", WidgetOptions::at(1, 1, 1, 1));
        add(&mut state, "b", WidgetOptions::at(1, 3, 1, 1));
        add(&mut state, "c", WidgetOptions::at(2, 4, 1, 2));

        let moves = state.packer().cascade(None).unwrap();
        assert_eq!(pos(&state, "b"), GridPos::new(1, 2));
        assert_eq!(pos(&state, "c"), GridPos::new(2, 1));
        assert_eq!(moves.len(), 2);
        assert_eq!(
            moves[0],
            PlannedMove {
                id: "b".to_string(),
                from: GridPos::new(1, 3),
                to: GridPos::new(1, 2),
            }
        );
    }

    #[test]
    fn wide_widget_rests_on_its_highest_lane() {
        let mut state = grid("up");
        add(&mut state, "a", WidgetOptions::at(1, 1, 1, 2));
        add(&mut state, "b", WidgetOptions::at(1, 5, 2, 1));
        state.packer().cascade(None).unwrap();
        assert_eq!(pos(&state, "b"), GridPos::new(1, 3));
    }

    #[test]
    fn fixed_widgets_stay_and_block() {
        let mut state = grid("up");
        add(&mut state, "pin", WidgetOptions::at(1, 3, 1, 1).fixed(true));
        add(&mut state, "b", WidgetOptions::at(1, 6, 1, 1));
        state.packer().cascade(None).unwrap();
        assert_eq!(pos(&state, "pin"), GridPos::new(1, 3));
        assert_eq!(pos(&state, "b"), GridPos::new(1, 4));
    }

    #[test]
    fn reservation_keeps_the_area_clear() {
        let mut state = grid("up");
        add(&mut state, "a", WidgetOptions::at(1, 1, 1, 1));
        add(&mut state, "b", WidgetOptions::at(1, 4, 1, 1));
        state.packer().cascade(Some(rect(1, 2, 1, 2))).unwrap();
        assert_eq!(pos(&state, "a"), GridPos::new(1, 1));
        assert_eq!(pos(&state, "b"), GridPos::new(1, 4));

        let mut state = grid("up");
        add(&mut state, "a", WidgetOptions::at(1, 2, 1, 1));
        state.packer().cascade(Some(rect(1, 1, 1, 1))).unwrap();
        assert_eq!(pos(&state, "a"), GridPos::new(1, 2));
    }

    #[test]
    fn left_compacts_columns() {
        let mut state = grid("left");
        add(&mut state, "a", WidgetOptions::at(3, 1, 1, 1));
        add(&mut state, "b", WidgetOptions::at(5, 2, 2, 1));
        state.packer().cascade(None).unwrap();
        assert_eq!(pos(&state, "a"), GridPos::new(1, 1));
        assert_eq!(pos(&state, "b"), GridPos::new(1, 2));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut state = grid("up");
        add(&mut state, "a", WidgetOptions::at(2, 3, 2, 1));
        add(&mut state, "b", WidgetOptions::at(1, 5, 1, 3));
        add(&mut state, "c", WidgetOptions::at(3, 7, 1, 1));
        state.packer().cascade(None).unwrap();
        assert!(state.packer().cascade(None).unwrap().is_empty());
    }

    #[test]
    fn left_pass_walks_columns_before_rows() {
        let mut state = grid("left");
        add(&mut state, "w1", WidgetOptions::at(1, 1, 1, 1));
        add(&mut state, "w0", WidgetOptions::at(2, 2, 1, 2));
        add(&mut state, "w2", WidgetOptions::at(1, 3, 1, 1));
        add(&mut state, "w3", WidgetOptions::at(4, 1, 1, 2));

        let moves = state.packer().cascade(None).unwrap();
        assert_eq!(moves.len(), 1);
        assert_eq!(pos(&state, "w0"), GridPos::new(2, 2));
        assert_eq!(pos(&state, "w3"), GridPos::new(3, 1));
        assert!(state.packer().cascade(None).unwrap().is_empty());
    }

    #[test]
    fn preview_leaves_state_untouched() {
        let mut state = grid("up");
        add(&mut state, "a", WidgetOptions::at(1, 4, 1, 1));
        let planned = state.packer().preview(None).unwrap();
        assert_eq!(planned[0].to, GridPos::new(1, 1));
        assert_eq!(pos(&state, "a"), GridPos::new(1, 4));
    }

    #[test]
    fn no_cascade_or_overlap_skips_the_pass() {
        let mut state = grid("none");
        add(&mut state, "a", WidgetOptions::at(1, 4, 1, 1));
        assert!(state.packer().cascade(None).unwrap().is_empty());
        assert_eq!(pos(&state, "a"), GridPos::new(1, 4));
    }

    #[test]
    fn position_without_size_is_rejected() {
        let err = reservation(Some(GridPos::new(1, 1)), None).unwrap_err();
        assert!(matches!(err, GridError::CascadeWithoutSize));
        assert_eq!(reservation(None, None).unwrap(), None);
    }
}
