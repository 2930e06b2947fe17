mod core;

pub use core::WidgetRegistry;
