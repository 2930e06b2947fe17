mod types;

pub use types::{ConfigError, GridError, Result};
