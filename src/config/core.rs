use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::geometry::{GridPos, GridSize, PixelPos};
use crate::layout::Bounds;

/// Edge the cascade pass compacts widgets toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Grid axis along which cascade displacement and compaction happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeAxis {
    Row,
    Column,
}

impl CascadeDirection {
    pub fn axis(self) -> CascadeAxis {
        match self {
            CascadeDirection::Up | CascadeDirection::Down => CascadeAxis::Row,
            CascadeDirection::Left | CascadeDirection::Right => CascadeAxis::Column,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CascadeDirection::Up => "up",
            CascadeDirection::Down => "down",
            CascadeDirection::Left => "left",
            CascadeDirection::Right => "right",
        }
    }
}

impl fmt::Display for CascadeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CascadeDirection {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(CascadeDirection::Up),
            "down" => Ok(CascadeDirection::Down),
            "left" => Ok(CascadeDirection::Left),
            "right" => Ok(CascadeDirection::Right),
            _ => Err(ConfigError::UnknownCascade(value.to_string())),
        }
    }
}

/// Axis used by collision displacement; no cascade falls back to rows.
pub fn axis_of(cascade: Option<CascadeDirection>) -> CascadeAxis {
    cascade.map(CascadeDirection::axis).unwrap_or(CascadeAxis::Row)
}

/// Outer spacing around every grid cell, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// Expand a CSS-style shorthand list. Missing bottom mirrors top and
    /// missing left mirrors right; an empty list yields `None`.
    pub fn from_shorthand(values: &[f64]) -> Option<Self> {
        let first = *values.first()?;
        let clean = |v: f64| if v.is_finite() { v.trunc().max(0.0) } else { 0.0 };
        let top = clean(first);
        let right = values.get(1).map(|v| clean(*v)).unwrap_or(top);
        let bottom = values.get(2).map(|v| clean(*v)).unwrap_or(top);
        let left = values.get(3).map(|v| clean(*v)).unwrap_or(right);
        Some(Self {
            top,
            right,
            bottom,
            left,
        })
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(10.0)
    }
}

/// Pixel size of the hosting container element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Raw container options object, one field per recognised key.
///
/// Numeric values are kept as `f64` so malformed input (NaN, infinities)
/// can be treated as unset during validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GridOptions {
    pub margins: Option<Vec<f64>>,
    pub draggable: Option<bool>,
    pub resizable: Option<bool>,
    pub max_cols: Option<f64>,
    pub max_rows: Option<f64>,
    pub visible_cols: Option<f64>,
    pub visible_rows: Option<f64>,
    pub min_cols: Option<f64>,
    pub min_rows: Option<f64>,
    pub col_width: Option<f64>,
    pub row_height: Option<f64>,
    pub cascade: Option<String>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
    pub fix_to_grid: Option<bool>,
    pub auto_resize: Option<bool>,
    pub maintain_ratio: Option<bool>,
    pub prefer_new: Option<bool>,
    pub zoom_on_drag: Option<bool>,
    pub limit_to_screen: Option<bool>,
    pub allow_overlap: Option<bool>,
    pub widget_width_factor: Option<f64>,
    pub widget_height_factor: Option<f64>,
    pub debug: Option<bool>,
}

impl GridOptions {
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }
}

/// Finite values truncated toward zero; everything else is unset.
pub(crate) fn sanitize(value: Option<f64>) -> Option<i64> {
    value.filter(|v| v.is_finite()).map(|v| v.trunc() as i64)
}

fn count(value: Option<f64>) -> Option<u32> {
    sanitize(value).map(|v| v.clamp(0, u32::MAX as i64) as u32)
}

/// Validated container configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    pub margins: Margins,
    pub draggable: bool,
    pub resizable: bool,
    pub max_cols: u32,
    pub max_rows: u32,
    pub visible_cols: u32,
    pub visible_rows: u32,
    pub min_cols: u32,
    pub min_rows: u32,
    pub col_width: f64,
    pub row_height: f64,
    pub cascade: Option<CascadeDirection>,
    pub min_width: f64,
    pub min_height: f64,
    pub fix_to_grid: bool,
    pub auto_resize: bool,
    pub maintain_ratio: bool,
    pub prefer_new: bool,
    pub zoom_on_drag: bool,
    pub limit_to_screen: bool,
    pub allow_overlap: bool,
    pub widget_width_factor: u32,
    pub widget_height_factor: u32,
    pub debug: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            draggable: true,
            resizable: true,
            max_cols: 0,
            max_rows: 0,
            visible_cols: 0,
            visible_rows: 0,
            min_cols: 1,
            min_rows: 1,
            col_width: 250.0,
            row_height: 250.0,
            cascade: Some(CascadeDirection::Up),
            min_width: 100.0,
            min_height: 100.0,
            fix_to_grid: false,
            auto_resize: false,
            maintain_ratio: false,
            prefer_new: false,
            zoom_on_drag: false,
            limit_to_screen: false,
            allow_overlap: false,
            widget_width_factor: 0,
            widget_height_factor: 0,
            debug: false,
        }
    }
}

impl GridConfig {
    /// Single validating constructor: applies `options` over the defaults and
    /// derives every dependent value for the given viewport.
    pub fn from_options(options: &GridOptions, viewport: Viewport) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(margins) = options.margins.as_deref().and_then(Margins::from_shorthand) {
            config.margins = margins;
        }
        config.draggable = options.draggable.unwrap_or(config.draggable);
        config.resizable = options.resizable.unwrap_or(config.resizable);
        config.max_cols = count(options.max_cols).unwrap_or(0);
        config.max_rows = count(options.max_rows).unwrap_or(0);
        config.visible_cols = count(options.visible_cols).unwrap_or(0);
        config.visible_rows = count(options.visible_rows).unwrap_or(0);
        config.min_cols = count(options.min_cols).unwrap_or(1).max(1);
        config.min_rows = count(options.min_rows).unwrap_or(1).max(1);
        if let Some(width) = sanitize(options.col_width) {
            config.col_width = width.max(1) as f64;
        }
        if let Some(height) = sanitize(options.row_height) {
            config.row_height = height.max(1) as f64;
        }
        if let Some(width) = sanitize(options.min_width) {
            config.min_width = width.max(1) as f64;
        }
        if let Some(height) = sanitize(options.min_height) {
            config.min_height = height.max(1) as f64;
        }
        config.cascade = match options.cascade.as_deref().map(str::trim) {
            None => config.cascade,
            Some("") | Some("none") => None,
            Some(value) => Some(value.parse()?),
        };
        config.fix_to_grid = options.fix_to_grid.unwrap_or(false);
        config.auto_resize = options.auto_resize.unwrap_or(false);
        config.maintain_ratio = options.maintain_ratio.unwrap_or(false);
        config.prefer_new = options.prefer_new.unwrap_or(false);
        config.zoom_on_drag = options.zoom_on_drag.unwrap_or(false);
        config.limit_to_screen = !config.auto_resize && options.limit_to_screen.unwrap_or(false);
        config.allow_overlap = options.allow_overlap.unwrap_or(false);
        config.widget_width_factor = count(options.widget_width_factor).unwrap_or(0);
        config.widget_height_factor = count(options.widget_height_factor).unwrap_or(0);
        config.debug = options.debug.unwrap_or(false);

        let aspect_ratio = config.col_width / config.row_height;
        if config.limit_to_screen {
            config.max_cols = config.container_columns(viewport);
        }
        config.resolve_max_conflict();
        config.derive(viewport, aspect_ratio);
        Ok(config)
    }

    /// Only one of `max_cols`/`max_rows` may bound the grid; the cascade axis
    /// decides which survives.
    fn resolve_max_conflict(&mut self) {
        if self.max_cols > 0 && self.max_rows > 0 {
            match self.cascade {
                Some(CascadeDirection::Left) | Some(CascadeDirection::Right) => self.max_cols = 0,
                _ => self.max_rows = 0,
            }
        }
    }

    /// Recompute viewport-dependent geometry and the minimum cell counts.
    fn derive(&mut self, viewport: Viewport, aspect_ratio: f64) {
        let requested_min_cols = self.min_cols;
        let requested_min_rows = self.min_rows;

        if self.auto_resize {
            let cols = if self.max_cols > 0 {
                self.max_cols
            } else {
                self.visible_cols
            };
            if cols > 0 {
                let width = (viewport.width / cols as f64).floor() - self.margins.horizontal();
                if width > 0.0 {
                    self.col_width = width;
                }
            }

            let rows = if self.max_rows > 0 {
                self.max_rows
            } else {
                self.visible_rows
            };
            if rows > 0 {
                let available = viewport.height - self.margins.vertical();
                let height = (available / rows as f64).floor().max(self.min_height)
                    - self.margins.vertical();
                if height > 0.0 {
                    self.row_height = height;
                }
            }
        }

        if self.col_width < self.min_width {
            self.min_cols = requested_min_cols.max((self.min_width / self.col_width).ceil() as u32);
        }
        if self.row_height < self.min_height {
            self.min_rows = requested_min_rows.max((self.min_height / self.row_height).ceil() as u32);
        }

        let max_width = self.max_cols as f64 * self.col_width;
        let max_height = self.max_rows as f64 * self.row_height;
        if max_width > 0.0 && self.min_width > max_width {
            self.min_width = 0.75 * self.col_width;
        }
        if max_height > 0.0 && self.min_height > max_height {
            self.min_height = 0.75 * self.row_height;
        }

        if self.min_width > self.col_width {
            self.min_cols = self.min_cols.max((self.min_width / self.col_width).ceil() as u32);
        }
        if self.min_height > self.row_height {
            self.min_rows = self.min_rows.max((self.min_height / self.row_height).ceil() as u32);
        }

        if self.max_cols > 0 && self.min_cols > self.max_cols {
            self.min_cols = 1;
        }
        if self.max_rows > 0 && self.min_rows > self.max_rows {
            self.min_rows = 1;
        }

        if self.auto_resize && self.maintain_ratio && aspect_ratio.is_finite() && aspect_ratio > 0.0
        {
            if self.max_cols > 0 && self.visible_rows == 0 {
                self.row_height = self.col_width / aspect_ratio;
            } else if self.max_rows > 0 && self.visible_cols == 0 {
                self.col_width = aspect_ratio * self.row_height;
            } else if self.max_cols == 0 && self.max_rows == 0 {
                if self.visible_cols > 0 {
                    self.row_height = self.col_width / aspect_ratio;
                } else if self.visible_rows > 0 {
                    self.col_width = aspect_ratio * self.row_height;
                }
            }
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.max_cols, self.max_rows)
    }

    pub fn col_pitch(&self) -> f64 {
        self.col_width + self.margins.horizontal()
    }

    pub fn row_pitch(&self) -> f64 {
        self.row_height + self.margins.vertical()
    }

    /// Whole column pitches that fit in the viewport width.
    pub fn container_columns(&self, viewport: Viewport) -> u32 {
        let cols = (viewport.width / self.col_pitch()).floor();
        if cols.is_finite() && cols > 0.0 {
            cols as u32
        } else {
            0
        }
    }

    /// Pixel offset of a grid cell's content box.
    pub fn pixel_position(&self, pos: GridPos) -> PixelPos {
        PixelPos::new(
            self.col_pitch() * (pos.col.saturating_sub(1)) as f64 + self.margins.left,
            self.row_pitch() * (pos.row.saturating_sub(1)) as f64 + self.margins.top,
        )
    }

    /// Pixel width/height spanned by `size` cells, inner margins included.
    pub fn pixel_extent(&self, size: GridSize) -> (f64, f64) {
        (
            self.col_width * size.x as f64
                + self.margins.horizontal() * (size.x.saturating_sub(1)) as f64,
            self.row_height * size.y as f64
                + self.margins.vertical() * (size.y.saturating_sub(1)) as f64,
        )
    }

    /// Nearest grid cell for a pixel offset, clamped to the first cell and
    /// to the configured bounds.
    pub fn grid_position_at(&self, left: f64, top: f64) -> GridPos {
        let mut pos = GridPos::new(
            round_cells(left / self.col_pitch()).saturating_add(1).max(1),
            round_cells(top / self.row_pitch()).saturating_add(1).max(1),
        );
        let bounds = self.bounds();
        let unit = GridSize::new(1, 1);
        if !bounds.within_x(pos, unit) {
            pos.col = self.max_cols;
        }
        if !bounds.within_y(pos, unit) {
            pos.row = self.max_rows;
        }
        pos
    }

    /// Nearest cell extent for a pixel width/height, floored at the minimum
    /// cell counts and capped at the configured bounds.
    pub fn grid_size_for(&self, width: f64, height: f64) -> GridSize {
        let width = width + self.margins.horizontal();
        let height = height + self.margins.vertical();
        let mut size = GridSize::new(
            round_cells(width / self.col_pitch()).max(self.min_cols),
            round_cells(height / self.row_pitch()).max(self.min_rows),
        );
        let bounds = self.bounds();
        let origin = GridPos::new(1, 1);
        if !bounds.within_x(origin, size) {
            size.x = self.max_cols;
        }
        if !bounds.within_y(origin, size) {
            size.y = self.max_rows;
        }
        size
    }
}

fn round_cells(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round().min(u32::MAX as f64) as u32
    } else {
        0
    }
}
