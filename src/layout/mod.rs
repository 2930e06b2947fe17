//! Grid layout engine: occupancy, bounds, collision resolution and cascade
//! packing.
//!
//! The container drives these passes; they are public so embedders can run
//! them directly against a [`GridState`].

mod bounds;
mod cascade;
mod collision;
mod occupancy;
mod state;

pub use bounds::Bounds;
pub use cascade::{CascadePacker, PlannedMove, reservation};
pub use collision::CollisionResolver;
pub use occupancy::{OccupancyMap, RectLookup};
pub use state::{GridState, LayoutNotice};
