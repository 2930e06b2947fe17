//! Grid occupancy and packing engine for dashboard-style widget layouts.
//!
//! Widgets are rectangles of whole grid cells. The container keeps them
//! non-overlapping, inside the configured bounds and compacted toward the
//! cascade edge, while drag and resize gestures move them around.

pub mod config;
pub mod container;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod widget;
pub mod width;

pub use config::{CascadeAxis, CascadeDirection, GridConfig, GridOptions, Margins, Viewport};
pub use container::{
    EventBuffer, GestureState, GridContainer, GridEvent, GridEventSink, GridExtent, NullSink,
    Placeholder,
};
pub use error::{ConfigError, GridError, Result};
pub use geometry::{GridPos, GridRect, GridSize, PixelPos, PixelRect};
pub use input::{Pointer, PointerEvent, pointer_from_event, pointer_from_mouse};
pub use layout::{
    Bounds, CascadePacker, CollisionResolver, GridState, LayoutNotice, OccupancyMap, PlannedMove,
};
pub use logging::{FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, MemorySink};
pub use metrics::{GridMetrics, MetricSnapshot};
pub use registry::WidgetRegistry;
pub use render::{AnsiRenderer, RendererSettings};
pub use widget::{ResizeDirection, Widget, WidgetEvent, WidgetId, WidgetOptions};
pub use width::display_width;
