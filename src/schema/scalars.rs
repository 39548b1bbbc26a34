/// Custom GraphQL scalar types of the backend data model
///
/// `AWSDateTime` holds ISO 8601 datetimes, `AWSJSON` holds JSON documents
/// encoded as strings.

use async_graphql::dynamic::Scalar;
use async_graphql::Value;
use chrono::{DateTime, SecondsFormat, Utc};

pub const AWS_DATE_TIME: &str = "AWSDateTime";
pub const AWS_JSON: &str = "AWSJSON";

/// Register custom scalars in the schema builder
pub fn register_custom_scalars() -> Vec<Scalar> {
    vec![datetime_scalar(), json_scalar()]
}

/// Current time in the `AWSDateTime` format (millisecond precision, `Z` suffix)
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn is_datetime(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

fn is_json(s: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(s).is_ok()
}

/// Create the AWSDateTime scalar
fn datetime_scalar() -> Scalar {
    Scalar::new(AWS_DATE_TIME)
        .description("ISO 8601 datetime format with timezone")
        .validator(|value| match value {
            Value::String(s) => is_datetime(s),
            _ => false,
        })
}

/// Create the AWSJSON scalar
fn json_scalar() -> Scalar {
    Scalar::new(AWS_JSON)
        .description("A JSON document serialized as a string")
        .validator(|value| match value {
            Value::String(s) => is_json(s),
            _ => false,
        })
}
