/// Model field to GraphQL type mapping
///
/// This module maps configured field types to GraphQL output types and to the
/// comparison inputs (`ModelStringInput`, `ModelSubscriptionIntInput`, ...) used
/// by filters and conditions.

use crate::config::{FieldConfig, FieldType};

use async_graphql::dynamic::{InputObject, InputValue, TypeRef};

/// Map a field to its GraphQL output type
///
/// Required fields are non-null.
pub fn field_type_ref(field: &FieldConfig) -> TypeRef {
    if field.required {
        TypeRef::named_nn(field.field_type.graphql_name())
    } else {
        TypeRef::named(field.field_type.graphql_name())
    }
}

/// Scalar a comparison input is built over
///
/// Datetimes and JSON documents compare as strings.
fn comparison_scalar(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Id => TypeRef::ID,
        FieldType::Int => TypeRef::INT,
        FieldType::Float => TypeRef::FLOAT,
        FieldType::Boolean => TypeRef::BOOLEAN,
        FieldType::String | FieldType::AwsDateTime | FieldType::AwsJson => TypeRef::STRING,
    }
}

/// Name of the comparison input for a field type
///
/// `subscription` selects the `ModelSubscription*Input` family.
pub fn comparison_input(field_type: FieldType, subscription: bool) -> String {
    let scalar = comparison_scalar(field_type);
    if subscription {
        format!("ModelSubscription{}Input", scalar)
    } else {
        format!("Model{}Input", scalar)
    }
}

/// All comparison inputs, for registration in the schema
pub fn comparison_inputs() -> Vec<InputObject> {
    let scalars = [
        TypeRef::STRING,
        TypeRef::ID,
        TypeRef::INT,
        TypeRef::FLOAT,
        TypeRef::BOOLEAN,
    ];

    let mut inputs = Vec::with_capacity(scalars.len() * 2);
    for scalar in scalars {
        inputs.push(build_comparison(scalar, false));
        inputs.push(build_comparison(scalar, true));
    }
    inputs
}

fn build_comparison(scalar: &str, subscription: bool) -> InputObject {
    let name = if subscription {
        format!("ModelSubscription{}Input", scalar)
    } else {
        format!("Model{}Input", scalar)
    };

    let textual = scalar == TypeRef::STRING || scalar == TypeRef::ID;
    let ordered = scalar != TypeRef::BOOLEAN;

    let mut input = InputObject::new(name)
        .field(InputValue::new("ne", TypeRef::named(scalar)))
        .field(InputValue::new("eq", TypeRef::named(scalar)));

    if ordered {
        input = input
            .field(InputValue::new("le", TypeRef::named(scalar)))
            .field(InputValue::new("lt", TypeRef::named(scalar)))
            .field(InputValue::new("ge", TypeRef::named(scalar)))
            .field(InputValue::new("gt", TypeRef::named(scalar)))
            .field(InputValue::new("between", TypeRef::named_list(scalar)));
    }

    if textual {
        input = input
            .field(InputValue::new("contains", TypeRef::named(scalar)))
            .field(InputValue::new("notContains", TypeRef::named(scalar)))
            .field(InputValue::new("beginsWith", TypeRef::named(scalar)));
    }

    if subscription {
        if ordered {
            input = input
                .field(InputValue::new("in", TypeRef::named_list(scalar)))
                .field(InputValue::new("notIn", TypeRef::named_list(scalar)));
        }
    } else {
        input = input.field(InputValue::new(
            "attributeExists",
            TypeRef::named(TypeRef::BOOLEAN),
        ));
    }

    input
}
