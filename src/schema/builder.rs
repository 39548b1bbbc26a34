/// GraphQL schema builder
///
/// This module provides the `MockSchemaBuilder` which generates the complete
/// backend schema (types, inputs, queries, mutations and subscriptions) from
/// model definitions and wires it to a `MockStore`.

use crate::catalog::naming::{
    condition_input, filter_input, mutation_input, page_type, subscription_filter_input,
};
use crate::catalog::Action;
use crate::config::{ModelConfig, ID_FIELD};
use crate::error::{ContactGraphError, Result};
use crate::schema::resolver::{
    create_get_field, create_list_field, create_mutation_field, create_subscription_field,
    PageValue,
};
use crate::schema::scalars::register_custom_scalars;
use crate::schema::store::MockStore;
use crate::schema::type_mapping::{comparison_input, comparison_inputs, field_type_ref};

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputObject, InputValue, Object, Schema, Subscription, TypeRef,
};
use async_graphql::Value;
use std::sync::Arc;

/// Schema builder for the mock backend
pub struct MockSchemaBuilder {
    store: Option<Arc<MockStore>>,
}

impl MockSchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        Self { store: None }
    }

    /// Serve records from an existing store instead of a fresh one
    pub fn store(mut self, store: Arc<MockStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build complete GraphQL schema from models
    ///
    /// # Arguments
    ///
    /// * `models` - Model definitions
    ///
    /// # Returns
    ///
    /// A dynamic GraphQL schema with query, mutation and subscription roots
    pub fn build_schema(self, models: &[ModelConfig]) -> Result<Schema> {
        if models.is_empty() {
            return Err(ContactGraphError::Config("No models provided".to_string()));
        }

        let mut query = Object::new("Query");
        let mut mutation = Object::new("Mutation");
        let mut subscription = Subscription::new("Subscription");

        for model in models {
            model.validate().map_err(|e| {
                ContactGraphError::Config(format!("Invalid model '{}': {}", model.name, e))
            })?;

            tracing::info!("Building schema for model: {}", model.name);

            query = query
                .field(create_get_field(model))
                .field(create_list_field(model));

            for action in [Action::Create, Action::Update, Action::Delete] {
                mutation = mutation.field(create_mutation_field(model, action));
            }

            for action in [Action::OnCreate, Action::OnUpdate, Action::OnDelete] {
                subscription = subscription.field(create_subscription_field(model, action));
            }
        }

        let mut schema_builder = Schema::build(
            query.type_name(),
            Some(mutation.type_name()),
            Some(subscription.type_name()),
        );

        for scalar in register_custom_scalars() {
            schema_builder = schema_builder.register(scalar);
        }
        for input in comparison_inputs() {
            schema_builder = schema_builder.register(input);
        }

        for model in models {
            schema_builder = schema_builder
                .register(build_entity_type(model))
                .register(build_page_type(model));
            for input in build_inputs(model) {
                schema_builder = schema_builder.register(input);
            }
        }

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MockStore::new(models)));

        let schema = schema_builder
            .register(query)
            .register(mutation)
            .register(subscription)
            .data(store)
            .finish()
            .map_err(|e| ContactGraphError::Config(format!("Failed to build schema: {}", e)))?;

        Ok(schema)
    }
}

impl Default for MockSchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build GraphQL object type of a model
fn build_entity_type(model: &ModelConfig) -> Object {
    let mut object = Object::new(&model.name);

    if let Some(desc) = &model.description {
        object = object.description(desc);
    }

    for field in model.all_fields() {
        let field_name = field.name.clone();

        let graphql_field = Field::new(field.name.clone(), field_type_ref(&field), move |ctx| {
            let field_name = field_name.clone();
            FieldFuture::new(async move {
                let parent = ctx.parent_value.try_downcast_ref::<Value>()?;

                if let Value::Object(obj) = parent {
                    if let Some(value) = obj.get(field_name.as_str()) {
                        return Ok(Some(FieldValue::value(value.clone())));
                    }
                }

                Ok(Some(FieldValue::NULL))
            })
        });

        object = object.field(graphql_field);
    }

    object
}

/// Build the `Model{Model}Connection` page type
fn build_page_type(model: &ModelConfig) -> Object {
    let items = Field::new("items", TypeRef::named_list_nn(&model.name), |ctx| {
        FieldFuture::new(async move {
            let page = ctx.parent_value.try_downcast_ref::<PageValue>()?;
            let items = page
                .items
                .iter()
                .map(|item| FieldValue::owned_any(item.clone()));
            Ok(Some(FieldValue::list(items)))
        })
    });

    let next_token = Field::new("nextToken", TypeRef::named(TypeRef::STRING), |ctx| {
        FieldFuture::new(async move {
            let page = ctx.parent_value.try_downcast_ref::<PageValue>()?;
            Ok(page
                .next_token
                .clone()
                .map(|token| FieldValue::value(Value::String(token))))
        })
    });

    Object::new(page_type(model)).field(items).field(next_token)
}

/// Build the mutation, filter and condition inputs of a model
fn build_inputs(model: &ModelConfig) -> Vec<InputObject> {
    let mut create = InputObject::new(mutation_input(model, Action::Create))
        .field(InputValue::new(ID_FIELD, TypeRef::named(TypeRef::ID)));
    let mut update = InputObject::new(mutation_input(model, Action::Update))
        .field(InputValue::new(ID_FIELD, TypeRef::named_nn(TypeRef::ID)));
    let delete = InputObject::new(mutation_input(model, Action::Delete))
        .field(InputValue::new(ID_FIELD, TypeRef::named_nn(TypeRef::ID)));

    for field in &model.field {
        create = create.field(InputValue::new(&field.name, field_type_ref(field)));
        update = update.field(InputValue::new(
            &field.name,
            TypeRef::named(field.field_type.graphql_name()),
        ));
    }

    let filter_name = filter_input(model);
    let condition_name = condition_input(model);
    let subscription_name = subscription_filter_input(model);

    let mut filter = InputObject::new(&filter_name);
    let mut condition = InputObject::new(&condition_name);
    let mut subscription = InputObject::new(&subscription_name);

    for field in model.all_fields() {
        filter = filter.field(InputValue::new(
            &field.name,
            TypeRef::named(comparison_input(field.field_type, false)),
        ));
        subscription = subscription.field(InputValue::new(
            &field.name,
            TypeRef::named(comparison_input(field.field_type, true)),
        ));
        // The id is the key of a conditional write, not an attribute to test
        if field.name != ID_FIELD {
            condition = condition.field(InputValue::new(
                &field.name,
                TypeRef::named(comparison_input(field.field_type, false)),
            ));
        }
    }

    let filter = filter
        .field(InputValue::new("and", TypeRef::named_list(&filter_name)))
        .field(InputValue::new("or", TypeRef::named_list(&filter_name)))
        .field(InputValue::new("not", TypeRef::named(&filter_name)));
    let condition = condition
        .field(InputValue::new("and", TypeRef::named_list(&condition_name)))
        .field(InputValue::new("or", TypeRef::named_list(&condition_name)))
        .field(InputValue::new("not", TypeRef::named(&condition_name)));
    let subscription = subscription
        .field(InputValue::new("and", TypeRef::named_list(&subscription_name)))
        .field(InputValue::new("or", TypeRef::named_list(&subscription_name)));

    vec![create, update, delete, filter, condition, subscription]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::builtin_models;

    #[test]
    fn test_build_schema_for_builtin_models() {
        let schema = MockSchemaBuilder::new()
            .build_schema(&builtin_models())
            .unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("getConnection(id: ID!): Connection"));
        assert!(sdl.contains("listCompanies("));
        assert!(sdl.contains("type ModelCompanyConnection"));
        assert!(sdl.contains("createCompany(input: CreateCompanyInput!"));
        assert!(sdl.contains("onDeleteConnection(filter: ModelSubscriptionConnectionFilterInput)"));
        assert!(sdl.contains("scalar AWSDateTime"));
        assert!(sdl.contains("input ModelSubscriptionStringInput"));
    }

    #[test]
    fn test_empty_models_rejected() {
        assert!(MockSchemaBuilder::new().build_schema(&[]).is_err());
    }

    #[test]
    fn test_invalid_model_rejected() {
        let mut models = builtin_models();
        models[0].name = "lowercase".to_string();

        let err = MockSchemaBuilder::new().build_schema(&models).unwrap_err();
        assert!(matches!(err, ContactGraphError::Config(_)));
    }

    #[test]
    fn test_inputs_per_model() {
        let inputs = build_inputs(&crate::model::company_model());
        let names: Vec<&str> = inputs.iter().map(|input| input.type_name()).collect();

        assert_eq!(
            names,
            vec![
                "CreateCompanyInput",
                "UpdateCompanyInput",
                "DeleteCompanyInput",
                "ModelCompanyFilterInput",
                "ModelCompanyConditionInput",
                "ModelSubscriptionCompanyFilterInput",
            ]
        );
    }
}
