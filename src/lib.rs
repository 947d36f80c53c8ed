pub mod error;
pub mod settings;
pub mod telemetry;

pub use error::{Error, Result};
pub use telemetry::report_enabled_state;
