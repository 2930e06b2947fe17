//! Container configuration: the raw options object and its validated form.
//!
//! Options arrive as an explicit struct (usually deserialised from JSON) and
//! pass through [`GridConfig::from_options`], the only place derived values
//! such as minimum cell counts and viewport-driven column widths are computed.

mod core;

pub(crate) use core::sanitize;
pub use core::{
    CascadeAxis, CascadeDirection, GridConfig, GridOptions, Margins, Viewport, axis_of,
};
