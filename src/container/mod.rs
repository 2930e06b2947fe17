//! Grid container: owns the widgets, runs the layout passes after every
//! change and drives drag and resize gestures from pointer input.
//!
//! ```
//! use cascade_grid::{GridContainer, GridOptions, Viewport, WidgetOptions};
//!
//! let mut grid = GridContainer::new(GridOptions::default(), Viewport::new(1200.0, 800.0)).unwrap();
//! grid.add_item("a", &WidgetOptions::at(1, 3, 1, 1)).unwrap();
//! assert_eq!(grid.item_position("a").unwrap().row, 1);
//! ```

mod core;
mod events;
mod gesture;
mod placeholder;

pub use core::{GridContainer, GridExtent};
pub use events::{EventBuffer, GridEvent, GridEventSink, NullSink};
pub use gesture::{GestureController, GestureState};
pub use placeholder::Placeholder;
