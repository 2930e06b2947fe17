use crate::config::GridConfig;
use crate::geometry::{GridPos, GridRect, GridSize, PixelRect};

/// Snapped preview of where the active widget will settle. Never enters the
/// occupancy map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placeholder {
    pos: GridPos,
    size: GridSize,
    pixel: PixelRect,
}

impl Placeholder {
    pub fn new(pos: GridPos, size: GridSize, config: &GridConfig) -> Self {
        let mut placeholder = Self {
            pos,
            size,
            pixel: PixelRect::default(),
        };
        placeholder.recalculate(config);
        placeholder
    }

    pub fn set_grid_position(&mut self, pos: GridPos, config: &GridConfig) {
        self.pos = pos;
        self.recalculate(config);
    }

    pub fn set_size(&mut self, size: GridSize, config: &GridConfig) {
        self.size = size;
        self.recalculate(config);
    }

    fn recalculate(&mut self, config: &GridConfig) {
        let origin = config.pixel_position(self.pos);
        let (width, height) = config.pixel_extent(self.size);
        self.pixel = PixelRect {
            left: origin.left,
            top: origin.top,
            width,
            height,
            z_index: 0,
        };
    }

    pub fn position(&self) -> GridPos {
        self.pos
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.pos, self.size)
    }

    pub fn pixel_rect(&self) -> PixelRect {
        self.pixel
    }
}
