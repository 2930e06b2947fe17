use crate::config::{CascadeAxis, CascadeDirection, GridConfig, axis_of};
use crate::geometry::{GridPos, GridSize};
use crate::registry::WidgetRegistry;
use crate::widget::WidgetId;

use super::{Bounds, CascadePacker, CollisionResolver, OccupancyMap};

/// Side effect of a layout pass on a widget other than the one being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutNotice {
    /// Pushed out of the way by a collision.
    Displaced(WidgetId),
    /// Compacted toward the cascade edge.
    Cascaded(WidgetId),
}

impl LayoutNotice {
    pub fn id(&self) -> &WidgetId {
        match self {
            LayoutNotice::Displaced(id) | LayoutNotice::Cascaded(id) => id,
        }
    }
}

/// Widgets, their occupancy and the configuration the passes read.
#[derive(Debug, Clone)]
pub struct GridState {
    config: GridConfig,
    pub(crate) widgets: WidgetRegistry,
    pub(crate) map: OccupancyMap,
    notices: Vec<LayoutNotice>,
}

impl GridState {
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            widgets: WidgetRegistry::new(),
            map: OccupancyMap::new(),
            notices: Vec::new(),
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub(crate) fn set_config(&mut self, config: GridConfig) {
        self.config = config;
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    pub fn map(&self) -> &OccupancyMap {
        &self.map
    }

    pub fn bounds(&self) -> Bounds {
        self.config.bounds()
    }

    pub fn cascade(&self) -> Option<CascadeDirection> {
        self.config.cascade
    }

    pub fn axis(&self) -> CascadeAxis {
        axis_of(self.config.cascade)
    }

    pub fn allow_overlap(&self) -> bool {
        self.config.allow_overlap
    }

    pub fn resolver(&mut self) -> CollisionResolver<'_> {
        CollisionResolver::new(self)
    }

    pub fn packer(&mut self) -> CascadePacker<'_> {
        CascadePacker::new(self)
    }

    /// Set a widget's logical anchor and pixel offset. Does not touch the map.
    pub(crate) fn reposition(&mut self, id: &WidgetId, pos: GridPos) {
        let config = &self.config;
        if let Some(widget) = self.widgets.get_mut(id) {
            widget.set_grid_position(pos, config, true);
        }
    }

    pub(crate) fn notify(&mut self, notice: LayoutNotice) {
        self.notices.push(notice);
    }

    pub(crate) fn drain_notices(&mut self) -> Vec<LayoutNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Release map cells that no longer match a live widget.
    pub fn filter(&mut self) {
        self.map.filter(&self.widgets);
    }

    /// Columns and rows spanned by the widgets, ignoring the map.
    pub fn extent(&self) -> GridSize {
        self.widgets.iter().fold(GridSize::new(0, 0), |acc, widget| {
            let rect = widget.rect();
            GridSize::new(
                acc.x.max(rect.end_col().saturating_sub(1)),
                acc.y.max(rect.end_row().saturating_sub(1)),
            )
        })
    }
}
