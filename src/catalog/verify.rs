/// Structural verification of a catalog
///
/// Every document is parsed back and checked against its model:
/// - it is a single operation of the right type and name;
/// - declared variables match the template and are all passed to the root field;
/// - the requested field set is exactly the model's field set, for every
///   query, mutation and subscription alike;
/// - list operations select both `items` and `nextToken`.

use crate::catalog::operation::{Catalog, Operation, OperationKind, Selection};
use crate::config::ModelConfig;

use async_graphql::parser::types::{Field, OperationType, Selection as AstSelection, SelectionSet};
use async_graphql::parser::{parse_query, Positioned};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

const TYPENAME: &str = "__typename";

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub operation: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

/// Outcome of verifying a catalog
#[derive(Debug, Clone, Default)]
pub struct VerificationReport {
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl VerificationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, operation: &str, message: impl Into<String>) {
        self.violations.push(Violation {
            operation: operation.to_string(),
            message: message.into(),
        });
    }
}

/// Verify every operation of `catalog` against `models`
pub fn verify_catalog(catalog: &Catalog, models: &[ModelConfig]) -> VerificationReport {
    let mut report = VerificationReport::default();
    let mut field_sets: HashMap<&str, Vec<(&str, BTreeSet<String>)>> = HashMap::new();

    for operation in catalog.iter() {
        report.checked += 1;

        let Some(model) = models.iter().find(|m| m.name == operation.model) else {
            report.push(&operation.name, format!("unknown model '{}'", operation.model));
            continue;
        };

        match check_operation(operation, model) {
            Ok(fields) => field_sets
                .entry(model.name.as_str())
                .or_default()
                .push((operation.name.as_str(), fields)),
            Err(messages) => {
                for message in messages {
                    report.push(&operation.name, message);
                }
            }
        }
    }

    // All operations of a model must agree, whatever the per-operation checks said
    for (model, sets) in field_sets {
        if let Some((first_name, first)) = sets.first() {
            for (name, fields) in &sets[1..] {
                if fields != first {
                    report.push(
                        name,
                        format!(
                            "field set differs from {} for model {}",
                            first_name, model
                        ),
                    );
                }
            }
        }
    }

    tracing::debug!(
        "Verified {} operation(s), {} violation(s)",
        report.checked,
        report.violations.len()
    );

    report
}

/// Check one operation, returning the record field set it requests
fn check_operation(operation: &Operation, model: &ModelConfig) -> Result<BTreeSet<String>, Vec<String>> {
    let document = parse_query(&operation.document)
        .map_err(|e| vec![format!("document does not parse: {}", e)])?;

    let definitions: Vec<_> = document.operations.iter().collect();
    if definitions.len() != 1 {
        return Err(vec![format!(
            "expected exactly one operation, found {}",
            definitions.len()
        )]);
    }

    let mut errors = Vec::new();
    let (name, definition) = definitions[0];
    let definition = &definition.node;

    let expected_name = operation.operation_name();
    if name.map(|n| n.as_str()) != Some(expected_name.as_str()) {
        errors.push(format!("operation should be named {}", expected_name));
    }

    let kind = match definition.ty {
        OperationType::Query => OperationKind::Query,
        OperationType::Mutation => OperationKind::Mutation,
        OperationType::Subscription => OperationKind::Subscription,
    };
    if kind != operation.kind() {
        errors.push(format!("expected a {}, found a {}", operation.kind(), kind));
    }

    let declared: Vec<(String, String)> = definition
        .variable_definitions
        .iter()
        .map(|v| (v.node.name.node.to_string(), v.node.var_type.node.to_string()))
        .collect();
    let expected_vars: Vec<(String, String)> = operation
        .variables
        .iter()
        .map(|v| (v.name.clone(), v.type_ref()))
        .collect();
    if declared != expected_vars {
        errors.push(format!(
            "declared variables {:?} differ from template {:?}",
            declared, expected_vars
        ));
    }

    let roots = fields_of(&definition.selection_set.node);
    let root = match roots.as_slice() {
        [root] if root.node.name.node.as_str() == operation.name => *root,
        _ => {
            errors.push(format!("expected a single root field {}", operation.name));
            return Err(errors);
        }
    };

    // Variables print as `$name`
    let used: BTreeSet<String> = root
        .node
        .arguments
        .iter()
        .filter_map(|(_, value)| value.node.to_string().strip_prefix('$').map(str::to_string))
        .collect();
    for variable in &operation.variables {
        if !used.contains(&variable.name) {
            errors.push(format!("variable ${} is declared but never used", variable.name));
        }
    }

    let record_set = match operation.selection {
        Selection::Record { .. } => &root.node.selection_set.node,
        Selection::Page { .. } => {
            let children = fields_of(&root.node.selection_set.node);
            let has_token = children.iter().any(|f| f.node.name.node.as_str() == "nextToken");
            if !has_token {
                errors.push("list operation does not select nextToken".to_string());
            }
            match children.into_iter().find(|f| f.node.name.node.as_str() == "items") {
                Some(items) => &items.node.selection_set.node,
                None => {
                    errors.push("list operation does not select items".to_string());
                    return Err(errors);
                }
            }
        }
    };

    let requested: BTreeSet<String> = fields_of(record_set)
        .iter()
        .map(|f| f.node.name.node.to_string())
        .filter(|name| name != TYPENAME)
        .collect();
    let expected: BTreeSet<String> = model.field_names().into_iter().collect();

    let missing: Vec<&String> = expected.difference(&requested).collect();
    if !missing.is_empty() {
        errors.push(format!("missing fields {:?}", missing));
    }
    let extra: Vec<&String> = requested.difference(&expected).collect();
    if !extra.is_empty() {
        errors.push(format!("unknown fields {:?}", extra));
    }

    if errors.is_empty() {
        Ok(requested)
    } else {
        Err(errors)
    }
}

fn fields_of(set: &SelectionSet) -> Vec<&Positioned<Field>> {
    set.items
        .iter()
        .filter_map(|selection| match &selection.node {
            AstSelection::Field(field) => Some(field),
            _ => None,
        })
        .collect()
}
