use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{GridConfig, sanitize};
use crate::geometry::{GridPos, GridRect, GridSize, PixelPos, PixelRect};

/// Stable identifier of a widget within its container.
pub type WidgetId = String;

/// Default width of the resize grab border, in pixels.
pub const DEFAULT_BORDER_SIZE: f64 = 25.0;

/// Raw per-widget options object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WidgetOptions {
    pub payload: Value,
    pub col: Option<f64>,
    pub row: Option<f64>,
    pub sizex: Option<f64>,
    pub sizey: Option<f64>,
    pub fixed: Option<bool>,
    pub draggable: Option<bool>,
    pub resizable: Option<bool>,
    pub border_size: Option<f64>,
    pub drag_handle: Option<bool>,
    pub resize_handle: Option<bool>,
    pub max_cols: Option<f64>,
    pub min_cols: Option<f64>,
    pub max_rows: Option<f64>,
    pub min_rows: Option<f64>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub unitx: Option<f64>,
    pub unity: Option<f64>,
}

impl WidgetOptions {
    pub fn at(col: u32, row: u32, sizex: u32, sizey: u32) -> Self {
        Self {
            col: Some(col as f64),
            row: Some(row as f64),
            sizex: Some(sizex as f64),
            sizey: Some(sizey as f64),
            ..Self::default()
        }
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = Some(fixed);
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn from_json(input: &str) -> crate::Result<Self> {
        serde_json::from_str(input)
            .map_err(|err| crate::error::ConfigError::Json(err).into())
    }
}

fn cells(value: Option<f64>) -> u32 {
    sanitize(value).map(|v| v.clamp(0, u32::MAX as i64) as u32).unwrap_or(0)
}

/// Per-widget size limits. Zero means unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Constraints {
    pub min_cols: u32,
    pub max_cols: u32,
    pub min_rows: u32,
    pub max_rows: u32,
    pub min_width: f64,
    pub min_height: f64,
}

impl Constraints {
    pub fn from_options(options: &WidgetOptions) -> Self {
        Self {
            min_cols: cells(options.min_cols),
            max_cols: cells(options.max_cols),
            min_rows: cells(options.min_rows),
            max_rows: cells(options.max_rows),
            min_width: sanitize(options.min_width).unwrap_or(0).max(0) as f64,
            min_height: sanitize(options.min_height).unwrap_or(0).max(0) as f64,
        }
        .normalized()
    }

    /// A minimum above its maximum is dropped.
    pub fn normalized(mut self) -> Self {
        if self.min_cols > 0 && self.max_cols > 0 && self.min_cols > self.max_cols {
            self.min_cols = 0;
        }
        if self.min_rows > 0 && self.max_rows > 0 && self.min_rows > self.max_rows {
            self.min_rows = 0;
        }
        self
    }
}

/// Edge grabbed by a resize gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeDirection {
    Width,
    Height,
    Both,
}

/// Logical and pixel state reported to observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetEvent {
    pub id: WidgetId,
    pub payload: Value,
    pub col: u32,
    pub row: u32,
    pub sizex: u32,
    pub sizey: u32,
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
}

/// A movable, resizable rectangle on the grid.
#[derive(Debug, Clone)]
pub struct Widget {
    id: WidgetId,
    payload: Value,
    position: GridPos,
    size: GridSize,
    constraints: Constraints,
    fixed: bool,
    draggable: bool,
    resizable: bool,
    border_size: f64,
    drag_handle: bool,
    resize_handle: bool,
    drag_start_position: GridPos,
    pixel: PixelRect,
    moving: bool,
    added: bool,
}

impl Widget {
    pub fn new(id: impl Into<WidgetId>, options: &WidgetOptions, config: &GridConfig) -> Self {
        let mut widget = Self {
            id: id.into(),
            payload: Value::Null,
            position: GridPos::default(),
            size: GridSize::default(),
            constraints: Constraints::default(),
            fixed: false,
            draggable: true,
            resizable: true,
            border_size: DEFAULT_BORDER_SIZE,
            drag_handle: false,
            resize_handle: false,
            drag_start_position: GridPos::default(),
            pixel: PixelRect::default(),
            moving: false,
            added: false,
        };
        widget.apply_options(options, config);
        widget
    }

    /// Replace every option-driven field. The unit factors only shape the
    /// initial size of a widget that has not been added to a grid yet.
    pub fn apply_options(&mut self, options: &WidgetOptions, config: &GridConfig) {
        let or_one = |v: Option<f64>| cells(v).max(1);

        self.payload = options.payload.clone();
        self.position = GridPos::new(or_one(options.col), or_one(options.row));

        let unit_x = cells(options.unitx);
        let unit_y = cells(options.unity);
        self.size.x = if !self.added && config.widget_width_factor > 0 && unit_x > 0 {
            config.widget_width_factor.saturating_mul(unit_x)
        } else {
            or_one(options.sizex)
        };
        self.size.y = if !self.added && config.widget_height_factor > 0 && unit_y > 0 {
            config.widget_height_factor.saturating_mul(unit_y)
        } else {
            or_one(options.sizey)
        };

        self.fixed = options.fixed.unwrap_or(false);
        self.draggable = options.draggable.unwrap_or(true);
        self.resizable = options.resizable.unwrap_or(true);
        self.border_size = options
            .border_size
            .filter(|v| v.is_finite())
            .unwrap_or(DEFAULT_BORDER_SIZE);
        self.drag_handle = options.drag_handle.unwrap_or(false);
        self.resize_handle = options.resize_handle.unwrap_or(false);
        self.constraints = Constraints::from_options(options);

        self.size = self.fix_resize(self.size, config);
        self.recalculate(config);
    }

    pub fn id(&self) -> &WidgetId {
        &self.id
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn position(&self) -> GridPos {
        self.position
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.position, self.size)
    }

    pub fn constraints(&self) -> Constraints {
        self.constraints
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn pixel_rect(&self) -> PixelRect {
        self.pixel
    }

    pub fn drag_start_position(&self) -> GridPos {
        self.drag_start_position
    }

    pub(crate) fn set_drag_start_position(&mut self, pos: GridPos) {
        self.drag_start_position = pos;
    }

    pub(crate) fn mark_added(&mut self) {
        self.added = true;
    }

    /// Move the logical anchor; pixel geometry follows only when `update` is set.
    pub fn set_grid_position(&mut self, pos: GridPos, config: &GridConfig, update: bool) {
        self.position = pos;
        if update {
            self.recalculate_position(config);
        }
    }

    /// Resize after applying the widget's own limits.
    pub fn set_size(&mut self, size: GridSize, config: &GridConfig, update: bool) {
        self.size = self.fix_resize(size, config);
        if update {
            self.recalculate_dimensions(config);
        }
    }

    /// Clamp `size` to the widget's max/min cell counts, then grow it until
    /// its pixel extent reaches the widget's minimum pixel size.
    pub fn fix_resize(&self, size: GridSize, config: &GridConfig) -> GridSize {
        let mut size = size;
        let limits = self.constraints;

        if limits.max_cols > 0 && size.x > limits.max_cols {
            size.x = limits.max_cols;
        }
        if limits.max_rows > 0 && size.y > limits.max_rows {
            size.y = limits.max_rows;
        }
        if limits.min_cols > 0 && size.x < limits.min_cols {
            size.x = limits.min_cols;
        }
        if limits.min_rows > 0 && size.y < limits.min_rows {
            size.y = limits.min_rows;
        }

        let (width, height) = config.pixel_extent(size);
        if width < limits.min_width {
            let pitch = config.col_pitch();
            size.x = ((limits.min_width + config.margins.horizontal()) / pitch).ceil() as u32;
        }
        if height < limits.min_height {
            let pitch = config.row_pitch();
            size.y = ((limits.min_height + config.margins.vertical()) / pitch).ceil() as u32;
        }

        GridSize::new(size.x.max(1), size.y.max(1))
    }

    /// Re-derive pixel geometry from the grid rectangle.
    pub fn recalculate(&mut self, config: &GridConfig) {
        self.recalculate_position(config);
        self.recalculate_dimensions(config);
    }

    fn recalculate_position(&mut self, config: &GridConfig) {
        let pos = config.pixel_position(self.position);
        self.set_pixel_position(pos);
    }

    fn recalculate_dimensions(&mut self, config: &GridConfig) {
        self.size.x = self.size.x.max(config.min_cols);
        self.size.y = self.size.y.max(config.min_rows);

        let (width, height) = config.pixel_extent(self.size);
        let width = width.max(self.constraints.min_width).max(config.min_width);
        let height = height.max(self.constraints.min_height).max(config.min_height);
        self.set_dimensions(width, height);
    }

    pub fn set_pixel_position(&mut self, pos: PixelPos) {
        self.pixel.left = pos.left;
        self.pixel.top = pos.top;
    }

    pub fn set_dimensions(&mut self, width: f64, height: f64) {
        self.pixel.width = width.max(self.constraints.min_width);
        self.pixel.height = height.max(self.constraints.min_height);
    }

    pub(crate) fn start_moving(&mut self, z_index: i32) {
        self.moving = true;
        self.pixel.z_index = z_index;
    }

    pub(crate) fn stop_moving(&mut self) {
        self.moving = false;
    }

    /// Whether a drag may begin; handle-only widgets need the pointer on their handle.
    pub fn can_drag(&self, on_handle: bool) -> bool {
        self.draggable && (!self.drag_handle || on_handle)
    }

    /// Which edge a pointer at `pointer` (container space) would resize, if any.
    pub fn resize_direction(&self, pointer: PixelPos, on_handle: bool) -> Option<ResizeDirection> {
        if !self.resizable {
            return None;
        }
        if self.resize_handle {
            return on_handle.then_some(ResizeDirection::Both);
        }
        if self.border_size <= 0.0 {
            return None;
        }

        let left = pointer.left - self.pixel.left;
        let top = pointer.top - self.pixel.top;
        let width = self.pixel.width;
        let height = self.pixel.height;
        let on_right = left < width && left > width - self.border_size;
        let on_bottom = top < height && top > height - self.border_size;

        match (on_right, on_bottom) {
            (true, true) => Some(ResizeDirection::Both),
            (true, false) => Some(ResizeDirection::Width),
            (false, true) => Some(ResizeDirection::Height),
            (false, false) => None,
        }
    }

    pub fn event(&self) -> WidgetEvent {
        WidgetEvent {
            id: self.id.clone(),
            payload: self.payload.clone(),
            col: self.position.col,
            row: self.position.row,
            sizex: self.size.x,
            sizey: self.size.y,
            width: self.pixel.width,
            height: self.pixel.height,
            left: self.pixel.left,
            top: self.pixel.top,
        }
    }
}
