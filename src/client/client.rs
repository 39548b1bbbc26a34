use crate::catalog::{Action, Catalog, CatalogBuilder, Operation};
use crate::client::types::{GraphQLRequest, GraphQLResponse};
use crate::config::ModelConfig;
use crate::error::{ContactGraphError, Result};
use crate::model::{builtin_models, Page, Record};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

const API_KEY_HEADER: &str = "x-api-key";

/// Client executing catalog operations against a remote GraphQL endpoint.
///
/// # Example
///
/// ```no_run
/// use contactgraph::client::ApiClient;
/// use contactgraph::model::Company;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::new(
///     "https://example.appsync-api.us-east-1.amazonaws.com/graphql".to_string(),
///     "da2-api-key".to_string(),
/// )?;
///
/// let companies: Vec<Company> = client.list_all(None).await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    url: String,
    api_key: String,
    client: Client,
    catalog: Catalog,
}

impl ApiClient {
    /// Create a client for the built-in models
    ///
    /// # Arguments
    ///
    /// * `url` - GraphQL endpoint URL
    /// * `api_key` - Key sent in the `x-api-key` header
    pub fn new(url: String, api_key: String) -> Result<Self> {
        Self::with_models(url, api_key, &builtin_models())
    }

    /// Create a client whose catalog is derived from `models`
    pub fn with_models(url: String, api_key: String, models: &[ModelConfig]) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            api_key,
            client,
            catalog: CatalogBuilder::new().build(models)?,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Execute a catalog operation by root field name
    ///
    /// # Returns
    ///
    /// The value of the root field (`null` when the backend returned none)
    pub async fn execute(&self, name: &str, variables: Value) -> Result<Value> {
        let operation = self
            .catalog
            .get(name)
            .ok_or_else(|| ContactGraphError::NotFound(format!("Unknown operation '{}'", name)))?;
        self.send(operation, variables).await
    }

    /// Execute the operation of `model` performing `action`
    pub async fn execute_action(&self, model: &str, action: Action, variables: Value) -> Result<Value> {
        let operation = self.catalog.find(model, action).ok_or_else(|| {
            ContactGraphError::NotFound(format!("No {:?} operation for model '{}'", action, model))
        })?;
        self.send(operation, variables).await
    }

    async fn send(&self, operation: &Operation, variables: Value) -> Result<Value> {
        let operation_name = operation.operation_name();
        let request = GraphQLRequest {
            query: &operation.document,
            operation_name: &operation_name,
            variables,
        };

        tracing::debug!("Executing {} against {}", operation_name, self.url);

        let response = self
            .client
            .post(&self.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        self.handle_response_error(&response)?;

        let body: GraphQLResponse = response
            .json()
            .await
            .map_err(|e| ContactGraphError::Remote(format!("Failed to parse response: {}", e)))?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<String> = errors.iter().map(|e| e.describe()).collect();
            return Err(ContactGraphError::Remote(format!(
                "{} failed: {}",
                operation.name,
                messages.join("; ")
            )));
        }

        let mut data = body
            .data
            .ok_or_else(|| ContactGraphError::Remote(format!("{} returned no data", operation.name)))?;

        Ok(data
            .get_mut(operation.name.as_str())
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Fetch a record by id
    pub async fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
        let value = self
            .execute_action(T::MODEL, Action::Get, json!({ "id": id }))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch one page of records
    pub async fn list<T: Record>(
        &self,
        filter: Option<Value>,
        limit: Option<i64>,
        next_token: Option<&str>,
    ) -> Result<Page<T>> {
        let variables = json!({
            "filter": filter,
            "limit": limit,
            "nextToken": next_token,
        });
        let value = self.execute_action(T::MODEL, Action::List, variables).await?;
        if value.is_null() {
            return Ok(Page {
                items: Vec::new(),
                next_token: None,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Fetch every record, following continuation tokens
    pub async fn list_all<T: Record>(&self, filter: Option<Value>) -> Result<Vec<T>> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page: Page<T> = self
                .list(filter.clone(), None, next_token.as_deref())
                .await?;
            records.extend(page.items);

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Fetched {} {} record(s)", records.len(), T::MODEL);
        Ok(records)
    }

    /// Create a record
    ///
    /// `input` serializes to the create input; an absent `id` is assigned by the backend.
    pub async fn create<T: Record>(&self, input: &impl Serialize, condition: Option<Value>) -> Result<T> {
        self.mutate(Action::Create, serde_json::to_value(input)?, condition)
            .await
    }

    /// Update the fields present in `input`; `input` must carry the `id`
    pub async fn update<T: Record>(&self, input: &impl Serialize, condition: Option<Value>) -> Result<T> {
        self.mutate(Action::Update, serde_json::to_value(input)?, condition)
            .await
    }

    /// Delete a record, returning it
    pub async fn delete<T: Record>(&self, id: &str, condition: Option<Value>) -> Result<T> {
        self.mutate(Action::Delete, json!({ "id": id }), condition)
            .await
    }

    async fn mutate<T: Record>(&self, action: Action, input: Value, condition: Option<Value>) -> Result<T> {
        let variables = json!({ "input": input, "condition": condition });
        let value = self.execute_action(T::MODEL, action, variables).await?;
        if value.is_null() {
            return Err(ContactGraphError::Remote(format!(
                "{:?} {} returned no record",
                action,
                T::MODEL
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Handle HTTP error responses
    fn handle_response_error(&self, response: &reqwest::Response) -> Result<()> {
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ContactGraphError::Unauthorized(
                "Invalid or expired API key".to_string(),
            )),
            status => Err(ContactGraphError::Remote(format!(
                "Request failed with status {}",
                status
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new(
            "https://api.example.com/graphql".to_string(),
            "test_key".to_string(),
        )
        .unwrap();

        assert_eq!(client.url, "https://api.example.com/graphql");
        assert_eq!(client.api_key, "test_key");
        assert_eq!(client.catalog().len(), 16);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ApiClient::new(
            "https://api.example.com/graphql/".to_string(),
            "test_key".to_string(),
        )
        .unwrap();

        assert_eq!(client.url, "https://api.example.com/graphql");
    }

    #[test]
    fn test_client_rejects_empty_models() {
        assert!(ApiClient::with_models("http://localhost".into(), "k".into(), &[]).is_err());
    }
}
