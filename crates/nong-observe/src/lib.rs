//! Logging setup for the nong services.
//!
//! ```no_run
//! use nong_observe::{LoggerConfig, init_logger};
//!
//! init_logger(&LoggerConfig::default()).expect("logger");
//! tracing::info!("ready");
//! ```
mod config;
mod error;
mod format;
mod init;
mod level;
mod timer;

pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use init::init_logger;
pub use level::LoggerLevel;
pub use timer::{LoggerTimeZone, Rfc3339Timer};
