//! Command-line configuration.

use canvasly_core::{TemplateError, TemplateKind};
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Store path {0} is a directory")]
    StoreIsDirectory(PathBuf),
}

#[derive(Parser, Debug)]
#[command(name = "canvasly")]
#[command(about = "Edit Canvasly thinking templates from the terminal")]
#[command(version)]
pub struct Args {
    /// JSON file holding every saved document
    #[arg(short, long, env = "CANVASLY_STORE", default_value = "canvasly-store.json")]
    pub store: PathBuf,

    /// Template to edit: bmc or fpr
    #[arg(short, long, env = "CANVASLY_TEMPLATE", default_value = "bmc")]
    pub template: String,

    /// Enable verbose logging
    #[arg(long)]
    pub verbose: bool,
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub store_path: PathBuf,
    pub template: TemplateKind,
}

impl Args {
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let template = self.template.parse::<TemplateKind>()?;
        if self.store.is_dir() {
            return Err(ConfigError::StoreIsDirectory(self.store));
        }

        Ok(Config {
            store_path: self.store,
            template,
        })
    }

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub fn default_filter(&self) -> &'static str {
        if self.verbose {
            "debug,canvasly_cli=debug,canvasly_core=debug"
        } else {
            "info,canvasly_cli=info"
        }
    }
}
