//! Widget records: grid rectangle, pixel geometry and per-widget limits.

mod core;

pub use core::{
    Constraints, DEFAULT_BORDER_SIZE, ResizeDirection, Widget, WidgetEvent, WidgetId,
    WidgetOptions,
};
