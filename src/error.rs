use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContactGraphError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Code generation error: {0}")]
    Codegen(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Remote GraphQL error: {0}")]
    Remote(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("The conditional request failed: {0}")]
    ConditionalCheckFailed(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ContactGraphError {
    fn from(err: toml::de::Error) -> Self {
        ContactGraphError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for ContactGraphError {
    fn from(err: toml::ser::Error) -> Self {
        ContactGraphError::Serialization(format!("TOML serialization error: {}", err))
    }
}

impl From<config::ConfigError> for ContactGraphError {
    fn from(err: config::ConfigError) -> Self {
        ContactGraphError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ContactGraphError {
    fn from(err: serde_json::Error) -> Self {
        ContactGraphError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<arrow_schema::ArrowError> for ContactGraphError {
    fn from(err: arrow_schema::ArrowError) -> Self {
        ContactGraphError::Csv(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ContactGraphError>;
