use anyhow::Context;
use contactgraph::config::{self, Config};

pub mod catalog;
pub mod codegen;
pub mod init;
pub mod load;
pub mod process;
pub mod schema;
pub mod serve;
pub mod verify;

/// Config file read by `serve` and `load` when `--config` is omitted
pub const DEFAULT_CONFIG: &str = "contactgraph.toml";

/// Configuration at `path`, or the built-in models when no path is given
pub fn config_or_builtin(path: Option<String>) -> anyhow::Result<Config> {
    match path {
        Some(path) => config::load_config(&path)
            .with_context(|| format!("Failed to load configuration from {}", path)),
        None => Ok(Config::builtin()),
    }
}

/// Configuration at `path`, falling back to `contactgraph.toml` and then to the built-in models
pub fn config_or_default(path: Option<String>) -> anyhow::Result<Config> {
    let shown = path.clone().unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    tracing::info!("📖 Loading configuration from {}", shown);

    config::load_or_builtin(path.as_deref(), DEFAULT_CONFIG)
        .with_context(|| format!("Failed to load configuration from {}", shown))
}
