//! Core infrastructure: configuration, errors, logging, shared helpers.

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use logging::init_logger;
