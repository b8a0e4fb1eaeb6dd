//! canvasly-cli library: the terminal host's store, configuration and shell.
//!
//! Kept as a library so integration tests can drive the shell directly.

pub mod config;
pub mod file_store;
pub mod shell;

pub use config::{Args, Config, ConfigError};
pub use file_store::JsonFileStore;
pub use shell::{Command, CommandError, Flow, Shell};
