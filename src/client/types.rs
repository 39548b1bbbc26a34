use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a GraphQL POST request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLRequest<'a> {
    pub query: &'a str,
    pub operation_name: &'a str,
    pub variables: Value,
}

/// Body of a GraphQL response
#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQLErrorMessage>>,
}

/// A single entry of the `errors` array
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLErrorMessage {
    pub message: String,
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub path: Option<Vec<Value>>,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GraphQLErrorMessage {
    /// Error type, top-level or in `extensions`
    pub fn kind(&self) -> Option<&str> {
        self.error_type.as_deref().or_else(|| {
            self.extensions
                .as_ref()
                .and_then(|ext| ext.get("errorType"))
                .and_then(Value::as_str)
        })
    }

    /// Message prefixed with the backend error type, when one is given
    pub fn describe(&self) -> String {
        match self.kind() {
            Some(error_type) => format!("{}: {}", error_type, self.message),
            None => self.message.clone(),
        }
    }
}
