use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Field names every model carries implicitly, in selection order.
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Top-level configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Remote GraphQL endpoint (only needed by `load`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub codegen: CodegenConfig,
    #[serde(default)]
    pub model: Vec<ModelConfig>,
}

/// Remote GraphQL endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// GraphQL URL (e.g., "https://xxxx.appsync-api.us-east-2.amazonaws.com/graphql")
    pub url: String,
    // API key is read from CONTACTGRAPH_API_KEY environment variable
}

/// Mock server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind the server to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Interface to bind the server to
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

fn default_port() -> u16 {
    4000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

/// Output format of generated operation files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `queries.graphql`, `mutations.graphql`, `subscriptions.graphql`
    Graphql,
    /// `queries.js`, `mutations.js`, `subscriptions.js` exporting template strings
    #[default]
    Js,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Graphql => write!(f, "graphql"),
            OutputFormat::Js => write!(f, "js"),
        }
    }
}

/// Code generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Directory the operation files are written to
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            format: OutputFormat::default(),
        }
    }
}

fn default_out_dir() -> String {
    "src/graphql".to_string()
}

/// GraphQL type of a model field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FieldType {
    #[serde(rename = "ID")]
    Id,
    #[default]
    String,
    Int,
    Float,
    Boolean,
    #[serde(rename = "AWSDateTime")]
    AwsDateTime,
    #[serde(rename = "AWSJSON")]
    AwsJson,
}

impl FieldType {
    /// Name of the type as it appears in GraphQL documents
    pub fn graphql_name(&self) -> &'static str {
        match self {
            FieldType::Id => "ID",
            FieldType::String => "String",
            FieldType::Int => "Int",
            FieldType::Float => "Float",
            FieldType::Boolean => "Boolean",
            FieldType::AwsDateTime => "AWSDateTime",
            FieldType::AwsJson => "AWSJSON",
        }
    }
}

/// A single model field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// GraphQL field name (camelCase)
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl FieldConfig {
    pub fn new(name: &str, field_type: FieldType, required: bool) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required,
        }
    }

    /// Nullable `String` field, the common case for exported profile data
    pub fn string(name: &str) -> Self {
        Self::new(name, FieldType::String, false)
    }
}

/// Model (record type) configuration
///
/// `id`, `createdAt` and `updatedAt` are added implicitly and must not be listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// GraphQL type name (PascalCase)
    pub name: String,

    /// Plural used by list operations; derived from `name` if not provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,

    /// Optional description for the GraphQL schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub field: Vec<FieldConfig>,
}

impl ModelConfig {
    /// All fields in selection order: `id`, declared fields, timestamps
    pub fn all_fields(&self) -> Vec<FieldConfig> {
        let mut fields = Vec::with_capacity(self.field.len() + 3);
        fields.push(FieldConfig::new(ID_FIELD, FieldType::Id, true));
        fields.extend(self.field.iter().cloned());
        fields.push(FieldConfig::new(CREATED_AT_FIELD, FieldType::AwsDateTime, true));
        fields.push(FieldConfig::new(UPDATED_AT_FIELD, FieldType::AwsDateTime, true));
        fields
    }

    /// Names of all fields in selection order
    pub fn field_names(&self) -> Vec<String> {
        self.all_fields().into_iter().map(|f| f.name).collect()
    }

    /// Validate model configuration
    pub fn validate(&self) -> Result<(), String> {
        if !is_pascal_case(&self.name) {
            return Err(format!(
                "Model name '{}' must be alphanumeric and start with an uppercase letter (PascalCase)",
                self.name
            ));
        }

        if let Some(plural) = &self.plural {
            if !is_pascal_case(plural) {
                return Err(format!(
                    "Plural '{}' of model '{}' must be PascalCase",
                    plural, self.name
                ));
            }
            if plural == &self.name {
                return Err(format!(
                    "Plural of model '{}' must differ from its name",
                    self.name
                ));
            }
        }

        if self.field.is_empty() {
            return Err(format!("Model '{}' declares no fields", self.name));
        }

        let mut seen = HashSet::new();
        for field in &self.field {
            if !is_graphql_name(&field.name) || field.name.starts_with("__") {
                return Err(format!(
                    "Field '{}' of model '{}' is not a valid GraphQL name",
                    field.name, self.name
                ));
            }

            if [ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD].contains(&field.name.as_str()) {
                return Err(format!(
                    "Field '{}' of model '{}' is managed automatically and must not be declared",
                    field.name, self.name
                ));
            }

            if !seen.insert(field.name.as_str()) {
                return Err(format!(
                    "Field '{}' is declared twice in model '{}'",
                    field.name, self.name
                ));
            }
        }

        Ok(())
    }
}

fn is_pascal_case(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric())
        && name.chars().next().map_or(false, |c| c.is_ascii_uppercase())
}

fn is_graphql_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
