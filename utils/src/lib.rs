//! Shared utilities for the Rider staking workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingConfig, ParseLogFormatError};
