pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod schema;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogBuilder, Operation, OperationKind};
pub use client::ApiClient;
pub use config::{Config, ModelConfig, ServerConfig};
pub use error::{ContactGraphError, Result};
pub use schema::{MockSchemaBuilder, MockStore};
