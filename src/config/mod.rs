mod types;

pub use types::{
    CodegenConfig, Config, EndpointConfig, FieldConfig, FieldType, ModelConfig, OutputFormat,
    ServerConfig, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};

use crate::error::{ContactGraphError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Prefix of environment variables overriding file settings
/// (e.g. `CONTACTGRAPH__SERVER__PORT=5000`)
pub const ENV_PREFIX: &str = "CONTACTGRAPH";

/// Environment variable holding the API key of the remote endpoint
pub const API_KEY_ENV: &str = "CONTACTGRAPH_API_KEY";

impl Config {
    /// Configuration carrying the built-in `Connection` and `Company` models
    pub fn builtin() -> Self {
        Self {
            endpoint: None,
            server: ServerConfig::default(),
            codegen: CodegenConfig::default(),
            model: crate::model::builtin_models(),
        }
    }

    /// Look up a model by name
    pub fn find_model(&self, name: &str) -> Option<&ModelConfig> {
        self.model.iter().find(|m| m.name == name)
    }

    /// Validate all models and the endpoint URL
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for model in &self.model {
            model.validate().map_err(ContactGraphError::Config)?;
            if !names.insert(model.name.as_str()) {
                return Err(ContactGraphError::Config(format!(
                    "Model '{}' is defined twice",
                    model.name
                )));
            }
        }

        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.url.starts_with("http://") && !endpoint.url.starts_with("https://") {
                return Err(ContactGraphError::Config(format!(
                    "Endpoint url '{}' must be a valid URL (http:// or https://)",
                    endpoint.url
                )));
            }
        }

        Ok(())
    }
}

/// Load configuration from a TOML file, applying `CONTACTGRAPH__*` environment overrides
pub fn load_config(path: &str) -> Result<Config> {
    if !Path::new(path).is_file() {
        return Err(ContactGraphError::Config(format!(
            "Failed to read config file '{}': file not found",
            path
        )));
    }

    let config: Config = config::Config::builder()
        .add_source(config::File::new(path, config::FileFormat::Toml))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;

    tracing::debug!("Loaded {} model(s) from {}", config.model.len(), path);

    Ok(config)
}

/// Load configuration from `path`, or fall back to the built-in models
///
/// An explicitly given path must exist; the default path may be absent.
pub fn load_or_builtin(path: Option<&str>, default_path: &str) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(default_path).is_file() => load_config(default_path),
        None => {
            tracing::debug!("No configuration at {}, using built-in models", default_path);
            Ok(Config::builtin())
        }
    }
}

/// Save configuration to a TOML file
pub fn save_config(config: &Config, path: &str) -> Result<()> {
    config.validate()?;

    let toml_string = toml::to_string_pretty(config)?;
    fs::write(path, toml_string).map_err(|e| {
        ContactGraphError::Config(format!("Failed to write config file '{}': {}", path, e))
    })?;

    Ok(())
}
