/// GraphQL resolvers of the mock backend
///
/// This module provides the root fields served for every model:
/// - `get{Model}` and `list{Plural}` queries
/// - `create`, `update` and `delete` mutations
/// - `onCreate`, `onUpdate` and `onDelete` subscriptions fed by store events
///
/// Records travel between resolvers as `async_graphql::Value` objects.

use crate::catalog::naming::{
    condition_input, filter_input, mutation_input, page_type, root_field, subscription_filter_input,
};
use crate::catalog::Action;
use crate::config::ModelConfig;
use crate::error::ContactGraphError;
use crate::schema::filter::matches;
use crate::schema::store::{MockStore, StoredRecord, RecordPage};

use async_graphql::dynamic::{
    Field, FieldFuture, FieldValue, InputValue, ResolverContext, SubscriptionField,
    SubscriptionFieldFuture, TypeRef,
};
use async_graphql::{ErrorExtensions, Value};
use futures::StreamExt;
use std::sync::Arc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

/// Parent value of `Model{Model}Connection` fields
#[derive(Debug, Clone)]
pub struct PageValue {
    pub items: Vec<Value>,
    pub next_token: Option<String>,
}

/// Convert a store error into a GraphQL error carrying an `errorType` extension
pub fn to_graphql_error(err: ContactGraphError) -> async_graphql::Error {
    let error_type = match &err {
        ContactGraphError::ConditionalCheckFailed(_) => "ConditionalCheckFailedException",
        ContactGraphError::NotFound(_) => "NotFoundException",
        ContactGraphError::Store(_) => "BadRequestException",
        _ => "InternalFailure",
    };
    async_graphql::Error::new(err.to_string()).extend_with(|_, ext| ext.set("errorType", error_type))
}

/// Convert a stored record into a GraphQL value
pub fn record_to_value(record: StoredRecord) -> async_graphql::Result<Value> {
    Ok(Value::from_json(serde_json::Value::Object(record))?)
}

fn page_to_value(page: RecordPage) -> async_graphql::Result<PageValue> {
    let items = page
        .items
        .into_iter()
        .map(record_to_value)
        .collect::<async_graphql::Result<Vec<_>>>()?;
    Ok(PageValue {
        items,
        next_token: page.next_token,
    })
}

/// Read an optional argument as JSON
fn json_arg(ctx: &ResolverContext<'_>, name: &str) -> async_graphql::Result<Option<serde_json::Value>> {
    match ctx.args.get(name) {
        Some(value) => Ok(Some(value.as_value().clone().into_json()?)),
        None => Ok(None),
    }
}

fn store_of(ctx: &ResolverContext<'_>) -> async_graphql::Result<Arc<MockStore>> {
    ctx.data::<Arc<MockStore>>()
        .cloned()
        .map_err(|_| "Failed to get record store".into())
}

/// Create the `get{Model}(id)` query field
pub fn create_get_field(model: &ModelConfig) -> Field {
    let model_name = model.name.clone();

    Field::new(
        root_field(model, Action::Get),
        TypeRef::named(&model.name),
        move |ctx: ResolverContext| {
            let model_name = model_name.clone();

            FieldFuture::new(async move {
                let id = ctx.args.try_get("id")?.string()?.to_string();
                let store = store_of(&ctx)?;

                tracing::debug!("get {} {}", model_name, id);

                match store.get(&model_name, &id).await.map_err(to_graphql_error)? {
                    Some(record) => Ok(Some(FieldValue::owned_any(record_to_value(record)?))),
                    None => Ok(None),
                }
            })
        },
    )
    .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID)))
}

/// Create the `list{Plural}(filter, limit, nextToken)` query field
pub fn create_list_field(model: &ModelConfig) -> Field {
    let model_name = model.name.clone();

    Field::new(
        root_field(model, Action::List),
        TypeRef::named(page_type(model)),
        move |ctx: ResolverContext| {
            let model_name = model_name.clone();

            FieldFuture::new(async move {
                let filter = json_arg(&ctx, "filter")?;
                let limit = match ctx.args.get("limit") {
                    Some(limit) if !limit.is_null() => Some(limit.i64()?),
                    _ => None,
                };
                let next_token = match ctx.args.get("nextToken") {
                    Some(token) if !token.is_null() => Some(token.string()?.to_string()),
                    _ => None,
                };
                let store = store_of(&ctx)?;

                tracing::debug!("list {} limit={:?} nextToken={:?}", model_name, limit, next_token);

                let page = store
                    .list(&model_name, filter.as_ref(), limit, next_token.as_deref())
                    .await
                    .map_err(to_graphql_error)?;

                Ok(Some(FieldValue::owned_any(page_to_value(page)?)))
            })
        },
    )
    .argument(InputValue::new("filter", TypeRef::named(filter_input(model))))
    .argument(InputValue::new("limit", TypeRef::named(TypeRef::INT)))
    .argument(InputValue::new("nextToken", TypeRef::named(TypeRef::STRING)))
}

/// Create a `create`, `update` or `delete` mutation field
pub fn create_mutation_field(model: &ModelConfig, action: Action) -> Field {
    let model_name = model.name.clone();

    Field::new(
        root_field(model, action),
        TypeRef::named(&model.name),
        move |ctx: ResolverContext| {
            let model_name = model_name.clone();

            FieldFuture::new(async move {
                let input = match json_arg(&ctx, "input")? {
                    Some(serde_json::Value::Object(input)) => input,
                    _ => return Err("input must be an object".into()),
                };
                let condition = json_arg(&ctx, "condition")?;
                let store = store_of(&ctx)?;

                tracing::debug!("{:?} {}", action, model_name);

                let result = match action {
                    Action::Create => store.create(&model_name, input, condition.as_ref()).await,
                    Action::Update => store.update(&model_name, input, condition.as_ref()).await,
                    Action::Delete => store.delete(&model_name, input, condition.as_ref()).await,
                    other => {
                        return Err(format!("{:?} is not a mutation", other).into());
                    }
                };

                let record = result.map_err(to_graphql_error)?;
                Ok(Some(FieldValue::owned_any(record_to_value(record)?)))
            })
        },
    )
    .argument(InputValue::new(
        "input",
        TypeRef::named_nn(mutation_input(model, action)),
    ))
    .argument(InputValue::new(
        "condition",
        TypeRef::named(condition_input(model)),
    ))
}

/// Create an `onCreate`, `onUpdate` or `onDelete` subscription field
///
/// Each subscriber gets its own receiver; events missed by a lagging
/// subscriber are skipped.
pub fn create_subscription_field(model: &ModelConfig, action: Action) -> SubscriptionField {
    let model_name = model.name.clone();

    SubscriptionField::new(
        root_field(model, action),
        TypeRef::named(&model.name),
        move |ctx: ResolverContext| {
            let model_name = model_name.clone();

            SubscriptionFieldFuture::new(async move {
                let filter = json_arg(&ctx, "filter")?;
                let store = store_of(&ctx)?;

                tracing::debug!("Subscribed to {:?} {}", action, model_name);

                let stream = BroadcastStream::new(store.subscribe()).filter_map(move |event| {
                    let model_name = model_name.clone();
                    let filter = filter.clone();

                    async move {
                        let event = match event {
                            Ok(event) => event,
                            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                                tracing::warn!("Subscriber lagged, skipped {} event(s)", missed);
                                return None;
                            }
                        };

                        if event.model != model_name || event.action.subscription() != Some(action) {
                            return None;
                        }

                        let selected = match &filter {
                            Some(filter) => matches(filter, Some(&event.record)),
                            None => Ok(true),
                        };

                        match selected {
                            Ok(true) => Some(
                                record_to_value(event.record).map(|value| FieldValue::owned_any(value)),
                            ),
                            Ok(false) => None,
                            Err(e) => Some(Err(to_graphql_error(e))),
                        }
                    }
                });

                Ok(stream)
            })
        },
    )
    .argument(InputValue::new(
        "filter",
        TypeRef::named(subscription_filter_input(model)),
    ))
}
