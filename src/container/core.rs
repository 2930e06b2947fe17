use std::time::Instant;

use crate::config::{CascadeDirection, GridConfig, GridOptions, Viewport};
use crate::error::{GridError, Result};
use crate::geometry::{GridPos, GridRect, GridSize, PixelPos};
use crate::layout::{GridState, LayoutNotice, OccupancyMap, PlannedMove, reservation};
use crate::logging::{
    CONTAINER_TARGET, LogLevel, Logger, METRICS_TARGET, event_with_fields, json_kv, json_str,
};
use crate::metrics::{GridMetrics, MetricSnapshot};
use crate::widget::{Widget, WidgetEvent, WidgetId, WidgetOptions};

use super::events::{GridEventSink, NullSink};
use super::gesture::GestureController;
use super::placeholder::Placeholder;

/// Columns and rows currently spanned by widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridExtent {
    pub cols: u32,
    pub rows: u32,
}

/// Owns the widgets and their occupancy, and is the only writer of either.
///
/// Every operation runs to completion synchronously: collisions are
/// resolved and the cascade pass has settled before control returns, and
/// observers are notified in the order the changes happened.
pub struct GridContainer {
    options: GridOptions,
    viewport: Viewport,
    pub(super) state: GridState,
    pub(super) gesture: GestureController,
    pub(super) placeholder: Option<Placeholder>,
    extent: GridExtent,
    pub(super) drag_enabled: bool,
    pub(super) resize_enabled: bool,
    pub(super) sink: Box<dyn GridEventSink>,
    logger: Option<Logger>,
    pub(super) metrics: GridMetrics,
    started: Instant,
}

impl std::fmt::Debug for GridContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridContainer")
            .field("options", &self.options)
            .field("viewport", &self.viewport)
            .field("state", &self.state)
            .field("extent", &self.extent)
            .finish_non_exhaustive()
    }
}

impl GridContainer {
    pub fn new(options: GridOptions, viewport: Viewport) -> Result<Self> {
        let config = GridConfig::from_options(&options, viewport)?;
        Ok(Self {
            drag_enabled: config.draggable,
            resize_enabled: config.resizable,
            options,
            viewport,
            state: GridState::new(config),
            gesture: GestureController::default(),
            placeholder: None,
            extent: GridExtent::default(),
            sink: Box::new(NullSink),
            logger: None,
            metrics: GridMetrics::new(),
            started: Instant::now(),
        })
    }

    pub fn with_sink(mut self, sink: impl GridEventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &GridConfig {
        self.state.config()
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn map(&self) -> &OccupancyMap {
        self.state.map()
    }

    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.state.widgets().get(id)
    }

    /// Widgets in insertion order.
    pub fn widgets(&self) -> impl Iterator<Item = &Widget> {
        self.state.widgets().iter()
    }

    pub fn len(&self) -> usize {
        self.state.widgets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.widgets().is_empty()
    }

    pub fn item_position(&self, id: &str) -> Result<GridPos> {
        Ok(self.state.widgets().require(id)?.position())
    }

    pub fn item_size(&self, id: &str) -> Result<GridSize> {
        Ok(self.state.widgets().require(id)?.size())
    }

    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Height the container needs to show every row.
    pub fn content_height_px(&self) -> f64 {
        self.extent.rows as f64 * self.config().row_pitch()
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        self.placeholder.as_ref()
    }

    pub fn enable_drag(&mut self) {
        self.drag_enabled = true;
    }

    pub fn disable_drag(&mut self) {
        self.drag_enabled = false;
    }

    pub fn enable_resize(&mut self) {
        self.resize_enabled = true;
    }

    pub fn disable_resize(&mut self) {
        self.resize_enabled = false;
    }

    pub fn drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    pub fn resize_enabled(&self) -> bool {
        self.resize_enabled
    }

    /// Widgets whose reported state changed since the last call.
    pub fn take_dirty(&mut self) -> Vec<WidgetEvent> {
        self.state.widgets.take_dirty()
    }

    pub fn metrics_snapshot(&self) -> MetricSnapshot {
        self.metrics.snapshot(self.started.elapsed(), self.len())
    }

    pub fn log_metrics(&self) {
        if let Some(logger) = self.logger.as_ref() {
            let _ = logger.log_event(self.metrics_snapshot().to_log_event(METRICS_TARGET));
        }
    }

    /// Insert a widget. Unless `prefer_new` is set it first moves to the
    /// nearest free in-bounds slot; otherwise it keeps its cell and
    /// displaces whatever is there.
    pub fn add_item(&mut self, id: impl Into<WidgetId>, options: &WidgetOptions) -> Result<WidgetEvent> {
        let id = id.into();
        if self.state.widgets().contains(&id) {
            return Err(GridError::DuplicateWidget(id));
        }
        let config = self.config().clone();
        let mut widget = Widget::new(id.clone(), options, &config);

        let pos = if config.prefer_new {
            config.bounds().fix_pos(widget.position(), widget.size())
        } else {
            self.state.resolver().fix_grid_position(widget.rect())
        };
        widget.set_grid_position(pos, &config, true);
        widget.mark_added();

        self.state.widgets.insert(widget)?;
        self.state.resolver().place(&id)?;
        self.flush_notices();
        self.cascade(None)?;
        self.update_extent();

        let widget = self.state.widgets.require_mut(&id)?;
        widget.recalculate(&config);
        let event = widget.event();

        self.metrics.record_added();
        self.sink.item_added(&event);
        self.log_widget(LogLevel::Info, "item_added", &event);
        self.emit_items_changed();
        Ok(event)
    }

    /// Remove a widget. Without overlap the rest of the grid re-packs.
    pub fn remove_item(&mut self, id: &str) -> Result<WidgetEvent> {
        if self.gesture.active_id().is_some_and(|active| active == id) {
            return Err(GridError::GestureInProgress);
        }
        self.state.map.remove(&id.to_string());
        let widget = self
            .state
            .widgets
            .remove(id)
            .ok_or_else(|| GridError::WidgetNotFound(id.to_string()))?;
        let event = widget.event();

        self.metrics.record_removed();
        self.sink.item_removed(&event);
        self.log_widget(LogLevel::Info, "item_removed", &event);

        if !self.config().allow_overlap {
            self.cascade(None)?;
            self.update_extent();
            let config = self.config().clone();
            self.state
                .widgets
                .iter_mut()
                .for_each(|widget| widget.recalculate(&config));
            self.emit_items_changed();
        }
        Ok(event)
    }

    /// Apply new options to an existing widget and re-seat it.
    pub fn update_widget(&mut self, id: &str, options: &WidgetOptions) -> Result<WidgetEvent> {
        if self.gesture.active_id().is_some_and(|active| active == id) {
            return Err(GridError::GestureInProgress);
        }
        let config = self.config().clone();
        let bounds = config.bounds();
        let widget = self.state.widgets.require_mut(id)?;
        widget.apply_options(options, &config);
        let fitted = bounds.fix_pos(widget.position(), widget.size());
        widget.set_grid_position(fitted, &config, true);

        let id = widget.id().clone();
        self.state.map.remove(&id);
        self.state.resolver().place(&id)?;
        self.flush_notices();
        self.cascade(None)?;
        self.update_extent();

        let event = self.state.widgets.require(&id)?.event();
        self.sink.item_changed(&event);
        self.emit_items_changed();
        Ok(event)
    }

    pub fn trigger_cascade(&mut self) -> Result<()> {
        self.cascade(None)?;
        self.update_extent();
        Ok(())
    }

    /// Cascade around an explicit reservation. A position without a size
    /// is rejected.
    pub fn cascade_at(&mut self, pos: Option<GridPos>, size: Option<GridSize>) -> Result<()> {
        let reserve = reservation(pos, size)?;
        self.cascade(reserve)?;
        self.update_extent();
        Ok(())
    }

    /// Moves the cascade would make around the active gesture, handed to
    /// the sink as a preview. Nothing is mutated.
    pub fn cascade_placeholder(&mut self) -> Result<Vec<PlannedMove>> {
        let reserve = self.active_rect();
        let moves = self.state.packer().preview(reserve)?;
        self.sink.cascade_preview(&moves);
        Ok(moves)
    }

    /// Re-validate `options` and re-seat every widget under the new rules.
    pub fn set_options(&mut self, options: GridOptions) -> Result<()> {
        self.apply_config(options, self.viewport)
    }

    /// The host element changed size; derived geometry and screen-limited
    /// bounds follow.
    pub fn resize_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.apply_config(self.options.clone(), viewport)
    }

    fn apply_config(&mut self, options: GridOptions, viewport: Viewport) -> Result<()> {
        if !self.gesture.is_idle() {
            return Err(GridError::GestureInProgress);
        }
        let config = GridConfig::from_options(&options, viewport)?;
        let previous = self.config();
        let bounds_changed = previous.bounds() != config.bounds();
        let toggles = (previous.draggable, previous.resizable);

        // Runtime toggles survive unless the options themselves flip them.
        if toggles.0 != config.draggable {
            self.drag_enabled = config.draggable;
        }
        if toggles.1 != config.resizable {
            self.resize_enabled = config.resizable;
        }

        self.options = options;
        self.viewport = viewport;
        self.state.set_config(config.clone());

        let ids = self.state.widgets.ids();
        for id in &ids {
            self.state.map.remove(id);
            if let Some(widget) = self.state.widgets.get_mut(id) {
                widget.recalculate(&config);
            }
        }
        if bounds_changed {
            self.update_positions_after_max_change()?;
        }
        for id in &ids {
            self.state.resolver().place(id)?;
        }
        self.flush_notices();
        self.cascade(None)?;
        self.state.filter();
        self.update_extent();

        self.metrics.record_config_change();
        if let Some(logger) = self.logger.as_ref() {
            let event = event_with_fields(
                LogLevel::Info,
                CONTAINER_TARGET,
                "config_applied",
                [
                    json_kv("max_cols", config.max_cols),
                    json_kv("max_rows", config.max_rows),
                    json_str(
                        "cascade",
                        config.cascade.map(CascadeDirection::as_str).unwrap_or("none"),
                    ),
                    json_kv("col_width", config.col_width),
                    json_kv("row_height", config.row_height),
                ],
            );
            let _ = logger.log_event(event);
        }
        self.emit_items_changed();
        Ok(())
    }

    /// Shrink widgets that no longer fit the bounds and re-fit their
    /// anchors. Widgets are placed back one at a time so later ones see the
    /// earlier ones in the map. Expects every widget to be out of the map.
    fn update_positions_after_max_change(&mut self) -> Result<()> {
        let config = self.config().clone();
        let bounds = config.bounds();

        for id in self.state.widgets.ids() {
            let widget = self.state.widgets.require(&id)?;
            let pos = widget.position();
            let mut size = widget.size();
            let fits = |n: u32, max: u32| max == 0 || n <= max;

            if !self.state.resolver().has_collision(GridRect::new(pos, size))
                && bounds.within(pos, size)
                && fits(size.x, config.max_cols)
                && fits(size.y, config.max_rows)
            {
                self.state.resolver().place(&id)?;
                continue;
            }

            if config.max_cols > 0 && size.x > config.max_cols {
                size.x = config.max_cols;
            } else if config.max_rows > 0 && size.y > config.max_rows {
                size.y = config.max_rows;
            }
            let widget = self.state.widgets.require_mut(&id)?;
            widget.set_size(size, &config, true);
            let size = widget.size();

            let rect = GridRect::new(pos, size);
            if self.state.resolver().has_collision(rect) || !bounds.within(pos, size) {
                let fitted = self.state.resolver().fix_grid_position(rect);
                self.state.reposition(&id, fitted);
            }
            self.state.resolver().place(&id)?;
        }
        Ok(())
    }

    /// Topmost widget whose box, shifted by the leading margins, contains `pos`.
    pub fn widget_at(&self, pos: PixelPos) -> Option<&Widget> {
        let margins = self.config().margins;
        self.widgets()
            .filter(|widget| {
                let rect = widget.pixel_rect();
                pos.left > rect.left + margins.left
                    && pos.left < rect.right() + margins.left
                    && pos.top > rect.top + margins.top
                    && pos.top < rect.bottom() + margins.top
            })
            .max_by_key(|widget| widget.pixel_rect().z_index)
    }

    /// Grid rectangle of the widget under an active drag or resize.
    pub(super) fn active_rect(&self) -> Option<GridRect> {
        let id = self.gesture.active_id()?;
        self.state.widgets().get(id).map(Widget::rect)
    }

    /// Run a cascade pass, keeping the active gesture's rectangle clear
    /// when no reservation is given.
    pub(super) fn cascade(&mut self, reserve: Option<GridRect>) -> Result<()> {
        let reserve = reserve.or_else(|| self.active_rect());
        if self.config().cascade.is_some() && !self.config().allow_overlap {
            self.metrics.record_cascade();
        }
        self.state.packer().cascade(reserve)?;
        self.flush_notices();
        Ok(())
    }

    pub(super) fn flush_notices(&mut self) {
        let notices = self.state.drain_notices();
        self.metrics.record_notices(&notices);
        for notice in &notices {
            let Some(widget) = self.state.widgets().get(notice.id()) else {
                continue;
            };
            let event = widget.event();
            self.sink.cascaded(&event);
            let message = match notice {
                LayoutNotice::Cascaded(_) => "cascade_moved",
                LayoutNotice::Displaced(_) => "collision_displaced",
            };
            self.log_widget(LogLevel::Debug, message, &event);
        }
    }

    pub(super) fn update_extent(&mut self) {
        let size = self.state.extent();
        self.extent = GridExtent {
            cols: size.x,
            rows: size.y,
        };
    }

    pub(super) fn emit_items_changed(&mut self) {
        let events: Vec<WidgetEvent> = self.widgets().map(Widget::event).collect();
        self.sink.items_changed(&events);
    }

    /// Per-step events are only logged with the `debug` option on.
    pub(super) fn log_widget(&self, level: LogLevel, message: &str, widget: &WidgetEvent) {
        let Some(logger) = self.logger.as_ref() else {
            return;
        };
        if level == LogLevel::Debug && !self.config().debug {
            return;
        }
        let event = event_with_fields(
            level,
            CONTAINER_TARGET,
            message,
            [
                json_str("id", widget.id.clone()),
                json_kv("col", widget.col),
                json_kv("row", widget.row),
                json_kv("sizex", widget.sizex),
                json_kv("sizey", widget.sizey),
                json_kv("payload", widget.payload.clone()),
            ],
        );
        let _ = logger.log_event(event);
    }

    /// Pointer position in grid space: mirrored for `down`/`right` cascades
    /// and doubled while zoomed out for a drag.
    pub(super) fn normalize(&self, pos: PixelPos) -> PixelPos {
        let mut pos = pos;
        match self.config().cascade {
            Some(CascadeDirection::Down) => pos.top = self.content_height_px() - pos.top,
            Some(CascadeDirection::Right) => pos.left = self.viewport.width - pos.left,
            _ => {}
        }
        if self.gesture.is_zoomed() {
            pos.left *= 2.0;
            pos.top *= 2.0;
        }
        pos
    }
}
