use crate::error::{GridError, Result};
use crate::geometry::{GridPos, GridRect, PixelPos};
use crate::input::{Pointer, PointerEvent};
use crate::logging::LogLevel;
use crate::widget::{ResizeDirection, WidgetEvent, WidgetId};

use super::core::GridContainer;
use super::placeholder::Placeholder;

/// Extra pixels granted to the pointer while resizing so the edge tracks
/// slightly ahead of it.
const RESIZE_SLACK: f64 = 10.0;

/// Where the pointer-driven state machine stands.
///
/// A press on a widget arms a gesture; the first movement starts it and
/// release finishes it. At most one widget is ever in a gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    DragReady {
        id: WidgetId,
    },
    Dragging {
        id: WidgetId,
        /// Pointer offset from the widget's pixel origin at drag start.
        offset: PixelPos,
    },
    ResizeReady {
        id: WidgetId,
        direction: ResizeDirection,
    },
    Resizing {
        id: WidgetId,
        direction: ResizeDirection,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }

    /// Widget targeted by the armed or running gesture.
    pub fn target(&self) -> Option<&WidgetId> {
        match self {
            GestureState::Idle => None,
            GestureState::DragReady { id }
            | GestureState::Dragging { id, .. }
            | GestureState::ResizeReady { id, .. }
            | GestureState::Resizing { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GestureController {
    state: GestureState,
    z_index: i32,
    zoomed: bool,
}

impl GestureController {
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    /// Widget being dragged or resized. Armed gestures do not count.
    pub fn active_id(&self) -> Option<&WidgetId> {
        match &self.state {
            GestureState::Dragging { id, .. } | GestureState::Resizing { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    fn next_z_index(&mut self) -> i32 {
        self.z_index = self.z_index.saturating_add(1);
        self.z_index
    }
}

impl GridContainer {
    pub fn gesture(&self) -> &GestureState {
        self.gesture.state()
    }

    pub fn is_zoomed(&self) -> bool {
        self.gesture.is_zoomed()
    }

    /// Feed one pointer event through the state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        match event {
            PointerEvent::Down(pointer) => self.pointer_down(pointer),
            PointerEvent::Move(pointer) => self.pointer_move(pointer),
            PointerEvent::Up(pointer) => self.pointer_up(pointer),
        }
    }

    /// Arm a resize when the press lands on a widget's resize border,
    /// otherwise arm a drag if the widget allows one.
    pub fn pointer_down(&mut self, pointer: Pointer) -> Result<()> {
        if !self.gesture.is_idle() {
            return Ok(());
        }
        let pos = self.normalize(pointer.pos);
        let Some(widget) = self.widget_at(pos) else {
            return Ok(());
        };
        let id = widget.id().clone();

        let direction = if self.resize_enabled {
            widget.resize_direction(pos, pointer.on_resize_handle)
        } else {
            None
        };
        let can_drag = self.drag_enabled && widget.can_drag(pointer.on_drag_handle);

        self.gesture.state = match direction {
            Some(direction) => GestureState::ResizeReady { id, direction },
            None if can_drag => GestureState::DragReady { id },
            None => GestureState::Idle,
        };
        Ok(())
    }

    pub fn pointer_move(&mut self, pointer: Pointer) -> Result<()> {
        match self.gesture.state.clone() {
            GestureState::Idle => Ok(()),
            GestureState::DragReady { id } => {
                self.drag_start(&id, pointer)?;
                self.drag_move(pointer)
            }
            GestureState::ResizeReady { id, direction } => {
                self.resize_start(&id, direction)?;
                self.resize_move(pointer)
            }
            GestureState::Dragging { .. } => self.drag_move(pointer),
            GestureState::Resizing { .. } => self.resize_move(pointer),
        }
    }

    pub fn pointer_up(&mut self, _pointer: Pointer) -> Result<()> {
        match self.gesture.state {
            GestureState::Dragging { .. } => self.drag_stop(),
            GestureState::Resizing { .. } => self.resize_stop(),
            _ => {
                self.gesture.state = GestureState::Idle;
                Ok(())
            }
        }
    }

    /// Lift a widget out of the map and show a placeholder in its place.
    pub fn drag_start(&mut self, id: &str, pointer: Pointer) -> Result<()> {
        if self.gesture.active_id().is_some() {
            return Err(GridError::GestureInProgress);
        }
        let pos = self.normalize(pointer.pos);
        let z_index = self.gesture.next_z_index();
        let config = self.config().clone();

        let widget = self.state.widgets.require_mut(id)?;
        let pixel = widget.pixel_rect();
        let offset = PixelPos::new(pos.left - pixel.left, pos.top - pixel.top);
        widget.set_drag_start_position(widget.position());
        widget.start_moving(z_index);
        let placeholder = Placeholder::new(widget.position(), widget.size(), &config);
        let id = widget.id().clone();
        let event = widget.event();

        self.state.map.remove(&id);
        self.placeholder = Some(placeholder);
        self.gesture.state = GestureState::Dragging { id, offset };
        if config.zoom_on_drag {
            self.gesture.zoomed = true;
        }

        self.metrics.record_drag();
        self.sink.drag_start(&event);
        self.log_widget(LogLevel::Debug, "drag_start", &event);
        Ok(())
    }

    /// Follow the pointer. Crossing into a new cell moves the placeholder
    /// and re-packs the rest of the grid around it.
    pub fn drag_move(&mut self, pointer: Pointer) -> Result<()> {
        let GestureState::Dragging { id, offset } = self.gesture.state.clone() else {
            return Ok(());
        };
        let pos = self.normalize(pointer.pos);
        let config = self.config().clone();
        let bounds = config.bounds();

        let widget = self.state.widgets.require(&id)?;
        let size = widget.size();
        let origin = PixelPos::new(pos.left - offset.left, pos.top - offset.top);
        let mut candidate = config.grid_position_at(origin.left, origin.top);
        candidate = bounds.fix_pos_x(candidate, size);
        if !bounds.within_y(candidate, size) {
            candidate = bounds.fix_pos_y(candidate, size);
        }

        if candidate != widget.position() {
            self.move_active(&id, candidate)?;
        }

        let widget = self.state.widgets.require_mut(&id)?;
        if !config.fix_to_grid {
            widget.set_pixel_position(origin);
        }
        let event = widget.event();
        self.sink.drag_move(&event);
        self.log_widget(LogLevel::Debug, "drag_move", &event);
        Ok(())
    }

    fn move_active(&mut self, id: &WidgetId, pos: GridPos) -> Result<()> {
        let config = self.config().clone();
        let widget = self.state.widgets.require_mut(id)?;
        widget.set_grid_position(pos, &config, config.fix_to_grid);
        let rect = widget.rect();
        if let Some(placeholder) = self.placeholder.as_mut() {
            placeholder.set_grid_position(pos, &config);
        }
        self.reflow_around(rect)
    }

    fn reflow_around(&mut self, rect: GridRect) -> Result<()> {
        if self.config().cascade.is_none() {
            return Ok(());
        }
        self.state.resolver().resolve(rect);
        self.flush_notices();
        self.cascade(Some(rect))
    }

    /// Drop the widget at its current grid position.
    pub fn drag_stop(&mut self) -> Result<()> {
        let GestureState::Dragging { id, .. } = self.gesture.state.clone() else {
            return Ok(());
        };
        self.gesture.state = GestureState::Idle;
        let config = self.config().clone();

        let widget = self.state.widgets.require_mut(&id)?;
        widget.set_grid_position(widget.position(), &config, true);
        widget.stop_moving();

        self.finish_gesture(&id)?;
        self.gesture.zoomed = false;

        let event = self.state.widgets.require(&id)?.event();
        self.sink.drag_stop(&event);
        self.log_widget(LogLevel::Info, "drag_stop", &event);
        self.emit_items_changed();
        Ok(())
    }

    pub fn resize_start(&mut self, id: &str, direction: ResizeDirection) -> Result<()> {
        if self.gesture.active_id().is_some() {
            return Err(GridError::GestureInProgress);
        }
        let z_index = self.gesture.next_z_index();
        let config = self.config().clone();

        let widget = self.state.widgets.require_mut(id)?;
        widget.start_moving(z_index);
        let placeholder = Placeholder::new(widget.position(), widget.size(), &config);
        let id = widget.id().clone();
        let event = widget.event();

        self.state.map.remove(&id);
        self.placeholder = Some(placeholder);
        self.gesture.state = GestureState::Resizing { id, direction };

        self.metrics.record_resize();
        self.sink.resize_start(&event);
        self.log_widget(LogLevel::Debug, "resize_start", &event);
        Ok(())
    }

    /// Stretch the grabbed edge toward the pointer, snapping the logical
    /// size to whole cells.
    pub fn resize_move(&mut self, pointer: Pointer) -> Result<()> {
        let GestureState::Resizing { id, direction } = self.gesture.state.clone() else {
            return Ok(());
        };
        let pos = self.normalize(pointer.pos);
        let config = self.config().clone();
        let bounds = config.bounds();

        let widget = self.state.widgets.require(&id)?;
        let pixel = widget.pixel_rect();
        let limits = widget.constraints();
        let mut width = pixel.width;
        let mut height = pixel.height;
        if direction != ResizeDirection::Height {
            width = pos.left - pixel.left + RESIZE_SLACK;
        }
        if direction != ResizeDirection::Width {
            height = pos.top - pixel.top + RESIZE_SLACK;
        }
        width = width.max(config.min_width).max(limits.min_width);
        height = height.max(config.min_height).max(limits.min_height);

        let mut size = config.grid_size_for(width, height);
        size = bounds.fix_size(widget.position(), size);
        size = widget.fix_resize(size, &config);

        if size != widget.size() {
            let widget = self.state.widgets.require_mut(&id)?;
            widget.set_size(size, &config, config.fix_to_grid);
            let rect = widget.rect();
            if let Some(placeholder) = self.placeholder.as_mut() {
                placeholder.set_size(rect.size, &config);
            }
            self.reflow_around(rect)?;
        }

        let widget = self.state.widgets.require_mut(&id)?;
        if !config.fix_to_grid {
            widget.set_dimensions(width, height);
        }
        let event = widget.event();
        self.sink.resize_move(&event);
        self.log_widget(LogLevel::Debug, "resize_move", &event);
        Ok(())
    }

    pub fn resize_stop(&mut self) -> Result<()> {
        let GestureState::Resizing { id, .. } = self.gesture.state.clone() else {
            return Ok(());
        };
        self.gesture.state = GestureState::Idle;
        let config = self.config().clone();

        let widget = self.state.widgets.require_mut(&id)?;
        widget.set_size(widget.size(), &config, true);
        widget.stop_moving();

        self.finish_gesture(&id)?;

        let event = self.state.widgets.require(&id)?.event();
        self.sink.resize_stop(&event);
        self.log_widget(LogLevel::Info, "resize_stop", &event);
        self.emit_items_changed();
        Ok(())
    }

    /// Write the released widget back into the map and settle the grid.
    fn finish_gesture(&mut self, id: &WidgetId) -> Result<()> {
        self.state.resolver().place(id)?;
        self.flush_notices();
        self.cascade(None)?;
        self.update_extent();
        self.state.filter();
        self.placeholder = None;
        Ok(())
    }

    /// Snapshot of the widget under the active gesture.
    pub fn active_widget(&self) -> Option<WidgetEvent> {
        let id = self.gesture.active_id()?;
        self.widget(id).map(|widget| widget.event())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridOptions, Viewport};
    use crate::container::{EventBuffer, GridEvent};
    use crate::geometry::GridSize;
    use crate::widget::WidgetOptions;

    fn container(cascade: &str) -> (GridContainer, EventBuffer) {
        let options = GridOptions {
            cascade: Some(cascade.to_string()),
            max_cols: Some(6.0),
            col_width: Some(100.0),
            row_height: Some(100.0),
            margins: Some(vec![0.0]),
            min_width: Some(10.0),
            min_height: Some(10.0),
            ..GridOptions::default()
        };
        let events = EventBuffer::new();
        let grid = GridContainer::new(options, Viewport::new(600.0, 800.0))
            .unwrap()
            .with_sink(events.clone());
        (grid, events)
    }

    #[test]
    fn press_and_move_starts_a_drag() {
        let (mut grid, events) = container("up");
        grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
        events.take();

        grid.pointer_down(Pointer::at(50.0, 50.0)).unwrap();
        assert_eq!(
            grid.gesture(),
            &GestureState::DragReady { id: "a".to_string() }
        );

        grid.pointer_move(Pointer::at(60.0, 50.0)).unwrap();
        assert!(matches!(grid.gesture(), GestureState::Dragging { .. }));
        assert!(grid.placeholder().is_some());
        assert_eq!(grid.map().get(1, 1), None);

        grid.pointer_up(Pointer::at(60.0, 50.0)).unwrap();
        assert!(grid.gesture().is_idle());
        assert!(grid.placeholder().is_none());
        assert_eq!(grid.map().get(1, 1), Some(&"a".to_string()));
        assert_eq!(
            events.kinds(),
            vec!["drag_start", "drag_move", "drag_stop", "items_changed"]
        );
    }

    #[test]
    fn press_on_border_arms_a_resize() {
        let (mut grid, _) = container("up");
        grid.add_item("a", &WidgetOptions::at(1, 1, 2, 1)).unwrap();

        grid.pointer_down(Pointer::at(190.0, 50.0)).unwrap();
        assert_eq!(
            grid.gesture(),
            &GestureState::ResizeReady {
                id: "a".to_string(),
                direction: ResizeDirection::Width,
            }
        );
    }

    #[test]
    fn release_without_movement_disarms() {
        let (mut grid, events) = container("up");
        grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
        events.take();

        grid.pointer_down(Pointer::at(50.0, 50.0)).unwrap();
        grid.pointer_up(Pointer::at(50.0, 50.0)).unwrap();
        assert!(grid.gesture().is_idle());
        assert!(events.events().is_empty());
    }

    #[test]
    fn disabled_drag_ignores_presses() {
        let (mut grid, _) = container("up");
        grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
        grid.disable_drag();
        grid.pointer_down(Pointer::at(50.0, 50.0)).unwrap();
        assert!(grid.gesture().is_idle());
    }

    #[test]
    fn dragging_across_cells_moves_the_widget() {
        let (mut grid, events) = container("up");
        grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
        events.take();

        grid.pointer_down(Pointer::at(50.0, 50.0)).unwrap();
        grid.pointer_move(Pointer::at(250.0, 50.0)).unwrap();
        assert_eq!(grid.item_position("a").unwrap(), GridPos::new(3, 1));
        assert_eq!(
            grid.placeholder().map(Placeholder::position),
            Some(GridPos::new(3, 1))
        );
        grid.pointer_up(Pointer::at(250.0, 50.0)).unwrap();
        assert_eq!(grid.item_position("a").unwrap(), GridPos::new(3, 1));
        assert_eq!(grid.map().get(3, 1), Some(&"a".to_string()));
    }

    #[test]
    fn dragging_onto_a_widget_pushes_it_down() {
        let (mut grid, events) = container("up");
        grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
        grid.add_item("b", &WidgetOptions::at(2, 1, 1, 1)).unwrap();
        events.take();

        grid.pointer_down(Pointer::at(50.0, 50.0)).unwrap();
        grid.pointer_move(Pointer::at(150.0, 50.0)).unwrap();
        assert_eq!(grid.item_position("a").unwrap(), GridPos::new(2, 1));
        assert_eq!(grid.item_position("b").unwrap(), GridPos::new(2, 2));
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, GridEvent::Cascaded(w) if w.id == "b")));

        grid.pointer_up(Pointer::at(150.0, 50.0)).unwrap();
        assert_eq!(grid.map().get(2, 1), Some(&"a".to_string()));
        assert_eq!(grid.map().get(2, 2), Some(&"b".to_string()));
    }

    #[test]
    fn resize_snaps_to_cells_and_respects_bounds() {
        let (mut grid, _) = container("up");
        grid.add_item("a", &WidgetOptions::at(2, 1, 1, 1)).unwrap();

        grid.resize_start("a", ResizeDirection::Width).unwrap();
        grid.resize_move(Pointer::at(390.0, 50.0)).unwrap();
        assert_eq!(grid.item_size("a").unwrap(), GridSize::new(3, 1));

        // Overflowing width is cut at the last column and paid for in height.
        grid.resize_move(Pointer::at(2000.0, 50.0)).unwrap();
        assert_eq!(grid.item_size("a").unwrap(), GridSize::new(5, 2));

        grid.resize_stop().unwrap();
        assert!(grid.gesture().is_idle());
        assert_eq!(grid.map().get(6, 2), Some(&"a".to_string()));
    }

    #[test]
    fn second_gesture_is_rejected() {
        let (mut grid, _) = container("up");
        grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();
        grid.add_item("b", &WidgetOptions::at(2, 1, 1, 1)).unwrap();

        grid.drag_start("a", Pointer::at(50.0, 50.0)).unwrap();
        let err = grid.resize_start("b", ResizeDirection::Both).unwrap_err();
        assert!(matches!(err, GridError::GestureInProgress));
        assert!(matches!(
            grid.remove_item("a").unwrap_err(),
            GridError::GestureInProgress
        ));
    }

    #[test]
    fn zoom_on_drag_doubles_pointer_coordinates() {
        let options = GridOptions {
            zoom_on_drag: Some(true),
            col_width: Some(100.0),
            row_height: Some(100.0),
            margins: Some(vec![0.0]),
            ..GridOptions::default()
        };
        let mut grid = GridContainer::new(options, Viewport::new(1200.0, 800.0)).unwrap();
        grid.add_item("a", &WidgetOptions::at(1, 1, 1, 1)).unwrap();

        grid.drag_start("a", Pointer::at(50.0, 50.0)).unwrap();
        assert!(grid.is_zoomed());
        grid.drag_move(Pointer::at(125.0, 25.0)).unwrap();
        assert_eq!(grid.item_position("a").unwrap(), GridPos::new(3, 1));
        grid.drag_stop().unwrap();
        assert!(!grid.is_zoomed());
    }
}
