/// Operation catalog builder
///
/// This module provides the `CatalogBuilder` which derives every operation
/// template (get, list, create, update, delete and the three change
/// subscriptions) from the model definitions.

use crate::catalog::naming::{
    condition_input, filter_input, mutation_input, root_field, subscription_filter_input,
};
use crate::catalog::operation::{Action, Catalog, Operation, Selection, Variable};
use crate::catalog::render::render_document;
use crate::config::ModelConfig;
use crate::error::{ContactGraphError, Result};

/// Builder deriving the operation catalog from models
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    /// Request `__typename` in every selection set
    typename: bool,
}

impl CatalogBuilder {
    /// Create a new catalog builder
    pub fn new() -> Self {
        Self { typename: true }
    }

    /// Whether selection sets request `__typename` (default: true)
    pub fn typename(mut self, typename: bool) -> Self {
        self.typename = typename;
        self
    }

    /// Build the complete catalog for `models`
    ///
    /// Operations are ordered per model: queries, mutations, subscriptions.
    pub fn build(&self, models: &[ModelConfig]) -> Result<Catalog> {
        if models.is_empty() {
            return Err(ContactGraphError::Codegen("No models provided".to_string()));
        }

        let mut catalog = Catalog::default();

        for model in models {
            model.validate().map_err(|e| {
                ContactGraphError::Config(format!("Invalid model '{}': {}", model.name, e))
            })?;

            tracing::debug!("Building operations for model: {}", model.name);

            for action in Action::ALL {
                let operation = self.build_operation(model, action);
                let name = operation.name.clone();
                if catalog.insert(operation).is_some() {
                    return Err(ContactGraphError::Codegen(format!(
                        "Operation '{}' is generated by more than one model",
                        name
                    )));
                }
            }
        }

        Ok(catalog)
    }

    fn build_operation(&self, model: &ModelConfig, action: Action) -> Operation {
        let fields = model.field_names();

        let (variables, selection) = match action {
            Action::Get => (
                vec![Variable::required("id", "ID")],
                Selection::Record { fields },
            ),
            Action::List => (
                vec![
                    Variable::optional("filter", &filter_input(model)),
                    Variable::optional("limit", "Int"),
                    Variable::optional("nextToken", "String"),
                ],
                Selection::Page { items: fields },
            ),
            Action::Create | Action::Update | Action::Delete => (
                vec![
                    Variable::required("input", &mutation_input(model, action)),
                    Variable::optional("condition", &condition_input(model)),
                ],
                Selection::Record { fields },
            ),
            Action::OnCreate | Action::OnUpdate | Action::OnDelete => (
                vec![Variable::optional("filter", &subscription_filter_input(model))],
                Selection::Record { fields },
            ),
        };

        let mut operation = Operation {
            name: root_field(model, action),
            model: model.name.clone(),
            action,
            variables,
            selection,
            document: String::new(),
        };
        operation.document = render_document(&operation, self.typename);
        operation
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}
