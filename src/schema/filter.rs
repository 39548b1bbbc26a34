/// Filter and condition evaluation
///
/// Filters are JSON objects keyed by field name, each holding a comparison
/// object (`{"eq": "x"}`, `{"beginsWith": "Ac"}`), combined with the
/// `and` / `or` lists and the `not` filter. Absent and null attributes are
/// treated alike.

use crate::error::{ContactGraphError, Result};

use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Evaluate `filter` against `record`
///
/// `record` is `None` when evaluating a create condition: every attribute is absent.
pub fn matches(filter: &Value, record: Option<&Map<String, Value>>) -> Result<bool> {
    let filter = match filter {
        Value::Null => return Ok(true),
        Value::Object(filter) => filter,
        other => {
            return Err(ContactGraphError::Store(format!(
                "Filter must be an object, got {}",
                other
            )))
        }
    };

    for (key, operand) in filter {
        if operand.is_null() {
            continue;
        }

        let satisfied = match key.as_str() {
            "and" => {
                let mut all = true;
                for nested in as_list(key, operand)? {
                    if !matches(nested, record)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "or" => {
                let mut any = false;
                for nested in as_list(key, operand)? {
                    if matches(nested, record)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "not" => !matches(operand, record)?,
            field => {
                let value = record.and_then(|r| r.get(field)).filter(|v| !v.is_null());
                compare_field(field, value, operand)?
            }
        };

        if !satisfied {
            return Ok(false);
        }
    }

    Ok(true)
}

fn as_list<'a>(key: &str, operand: &'a Value) -> Result<&'a Vec<Value>> {
    operand.as_array().ok_or_else(|| {
        ContactGraphError::Store(format!("'{}' expects a list of filters", key))
    })
}

/// Apply every operator of a comparison object to one attribute
fn compare_field(field: &str, value: Option<&Value>, comparison: &Value) -> Result<bool> {
    let comparison = comparison.as_object().ok_or_else(|| {
        ContactGraphError::Store(format!("Comparison on '{}' must be an object", field))
    })?;

    for (operator, operand) in comparison {
        if operand.is_null() {
            continue;
        }

        let satisfied = match operator.as_str() {
            "eq" => value.map_or(false, |v| order(v, operand) == Some(Ordering::Equal)),
            "ne" => value.map_or(true, |v| order(v, operand) != Some(Ordering::Equal)),
            "lt" => value.map_or(false, |v| order(v, operand) == Some(Ordering::Less)),
            "le" => value.map_or(false, |v| {
                matches!(order(v, operand), Some(Ordering::Less | Ordering::Equal))
            }),
            "gt" => value.map_or(false, |v| order(v, operand) == Some(Ordering::Greater)),
            "ge" => value.map_or(false, |v| {
                matches!(order(v, operand), Some(Ordering::Greater | Ordering::Equal))
            }),
            "between" => {
                let bounds = operand.as_array().filter(|b| b.len() == 2).ok_or_else(|| {
                    ContactGraphError::Store(format!(
                        "'between' on '{}' expects exactly two bounds",
                        field
                    ))
                })?;
                value.map_or(false, |v| {
                    matches!(order(v, &bounds[0]), Some(Ordering::Greater | Ordering::Equal))
                        && matches!(order(v, &bounds[1]), Some(Ordering::Less | Ordering::Equal))
                })
            }
            "contains" => value.map_or(false, |v| contains(v, operand)),
            "notContains" => value.map_or(true, |v| !contains(v, operand)),
            "beginsWith" => match (value, operand) {
                (Some(Value::String(v)), Value::String(prefix)) => v.starts_with(prefix.as_str()),
                _ => false,
            },
            "attributeExists" => operand.as_bool() == Some(value.is_some()),
            "in" => value.map_or(false, |v| in_list(v, operand)),
            "notIn" => value.map_or(true, |v| !in_list(v, operand)),
            other => {
                return Err(ContactGraphError::Store(format!(
                    "Unsupported operator '{}' on '{}'",
                    other, field
                )))
            }
        };

        if !satisfied {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Ordering of two scalars of the same kind; `None` across kinds
fn order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn contains(value: &Value, operand: &Value) -> bool {
    match (value, operand) {
        (Value::String(haystack), Value::String(needle)) => haystack.contains(needle.as_str()),
        (Value::Array(items), needle) => items
            .iter()
            .any(|item| order(item, needle) == Some(Ordering::Equal)),
        _ => false,
    }
}

fn in_list(value: &Value, operand: &Value) -> bool {
    operand.as_array().map_or(false, |candidates| {
        candidates
            .iter()
            .any(|candidate| order(value, candidate) == Some(Ordering::Equal))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_empty_filter_matches() {
        let r = record(json!({"id": "1"}));
        assert!(matches(&json!({}), Some(&r)).unwrap());
        assert!(matches(&Value::Null, None).unwrap());
    }

    #[test]
    fn test_string_operators() {
        let r = record(json!({"companyName": "Acme Corp", "city": "Berlin"}));

        assert!(matches(&json!({"companyName": {"eq": "Acme Corp"}}), Some(&r)).unwrap());
        assert!(!matches(&json!({"companyName": {"eq": "acme corp"}}), Some(&r)).unwrap());
        assert!(matches(&json!({"companyName": {"ne": "Other"}}), Some(&r)).unwrap());
        assert!(matches(&json!({"companyName": {"beginsWith": "Ac"}}), Some(&r)).unwrap());
        assert!(matches(&json!({"companyName": {"contains": "me C"}}), Some(&r)).unwrap());
        assert!(matches(&json!({"companyName": {"notContains": "Inc"}}), Some(&r)).unwrap());
        assert!(matches(&json!({"city": {"between": ["A", "C"]}}), Some(&r)).unwrap());
        assert!(!matches(&json!({"city": {"gt": "Berlin"}}), Some(&r)).unwrap());
        assert!(matches(&json!({"city": {"ge": "Berlin", "le": "Berlin"}}), Some(&r)).unwrap());
    }

    #[test]
    fn test_numeric_operators() {
        let r = record(json!({"employeeCount": 120}));

        assert!(matches(&json!({"employeeCount": {"gt": 100}}), Some(&r)).unwrap());
        assert!(matches(&json!({"employeeCount": {"lt": 120.5}}), Some(&r)).unwrap());
        assert!(!matches(&json!({"employeeCount": {"between": [1, 50]}}), Some(&r)).unwrap());
        // Mixed kinds never compare
        assert!(!matches(&json!({"employeeCount": {"eq": "120"}}), Some(&r)).unwrap());
    }

    #[test]
    fn test_missing_attributes() {
        let r = record(json!({"email": null}));

        assert!(!matches(&json!({"email": {"eq": "a@b.c"}}), Some(&r)).unwrap());
        assert!(matches(&json!({"email": {"ne": "a@b.c"}}), Some(&r)).unwrap());
        assert!(matches(&json!({"email": {"attributeExists": false}}), Some(&r)).unwrap());
        assert!(!matches(&json!({"email": {"attributeExists": true}}), Some(&r)).unwrap());
        assert!(matches(&json!({"id": {"attributeExists": false}}), None).unwrap());
    }

    #[test]
    fn test_logical_groups() {
        let r = record(json!({"firstName": "Jane", "lastName": "Doe"}));

        let both = json!({"and": [{"firstName": {"eq": "Jane"}}, {"lastName": {"eq": "Doe"}}]});
        assert!(matches(&both, Some(&r)).unwrap());

        let either = json!({"or": [{"firstName": {"eq": "John"}}, {"lastName": {"eq": "Doe"}}]});
        assert!(matches(&either, Some(&r)).unwrap());

        let neither = json!({"or": [{"firstName": {"eq": "John"}}, {"lastName": {"eq": "Roe"}}]});
        assert!(!matches(&neither, Some(&r)).unwrap());

        let negated = json!({"not": {"firstName": {"eq": "Jane"}}});
        assert!(!matches(&negated, Some(&r)).unwrap());
    }

    #[test]
    fn test_in_lists() {
        let r = record(json!({"industry": "Software"}));

        assert!(matches(&json!({"industry": {"in": ["Retail", "Software"]}}), Some(&r)).unwrap());
        assert!(!matches(&json!({"industry": {"notIn": ["Software"]}}), Some(&r)).unwrap());
    }

    #[test]
    fn test_null_operands_are_ignored() {
        let r = record(json!({"city": "Paris"}));
        assert!(matches(&json!({"city": {"eq": null}, "and": null}), Some(&r)).unwrap());
    }

    #[test]
    fn test_invalid_filters() {
        let r = record(json!({"city": "Paris"}));
        assert!(matches(&json!("city"), Some(&r)).is_err());
        assert!(matches(&json!({"city": {"like": "P%"}}), Some(&r)).is_err());
        assert!(matches(&json!({"city": {"between": ["A"]}}), Some(&r)).is_err());
        assert!(matches(&json!({"and": {"city": {"eq": "Paris"}}}), Some(&r)).is_err());
    }
}
