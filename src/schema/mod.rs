/// Mock backend schema generation
///
/// This module generates an executable GraphQL schema from model definitions,
/// including type mapping, filter evaluation, the in-memory record store and the
/// query, mutation and subscription resolvers.

mod builder;
mod filter;
mod resolver;
mod scalars;
mod store;
mod type_mapping;

pub use builder::MockSchemaBuilder;
pub use filter::matches;
pub use resolver::{record_to_value, to_graphql_error, PageValue};
pub use scalars::{now_timestamp, register_custom_scalars, AWS_DATE_TIME, AWS_JSON};
pub use store::{ChangeEvent, MockStore, StoredRecord, RecordPage, DEFAULT_LIMIT, MAX_LIMIT};
pub use type_mapping::{comparison_input, field_type_ref};
