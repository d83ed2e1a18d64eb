#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
//! Process bootstrap shared by the calculator binaries.
//!
//! - [`config`]: layered configuration (defaults -> YAML -> env -> CLI)
//! - [`logging`]: subscriber installation and the [`Logger`] capability
//! - [`signals`]: graceful shutdown on Ctrl+C / SIGTERM

pub mod config;
pub mod logging;
pub mod signals;

pub use config::{ConfigError, load_layered};
pub use logging::{
    FileLogConfig, LogFormat, Logger, LoggingConfig, LoggingError, LoggingHandle, Rotation,
    init_logging, level_for_verbosity,
};
pub use signals::wait_for_shutdown;
