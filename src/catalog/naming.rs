/// Naming conventions of generated operations and input types
///
/// Root fields are camelCase (`getConnection`, `listCompanies`), operation names
/// are the same with an uppercase first letter, input types follow the
/// `Create{Model}Input` / `Model{Model}FilterInput` scheme.

use crate::catalog::operation::Action;
use crate::config::ModelConfig;

/// Uppercase the first character
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// English plural of a PascalCase type name
///
/// `Company` -> `Companies`, `Address` -> `Addresses`, `Day` -> `Days`,
/// `Connection` -> `Connections`
pub fn pluralize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();

    if let Some(stem) = name.strip_suffix('y') {
        let before = stem.chars().last().map(|c| c.to_ascii_lowercase());
        if !matches!(before, Some('a' | 'e' | 'i' | 'o' | 'u') | None) {
            return format!("{}ies", stem);
        }
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| lower.ends_with(suffix)) {
        return format!("{}es", name);
    }

    format!("{}s", name)
}

/// Plural of a model, honouring an explicit override
pub fn plural_name(model: &ModelConfig) -> String {
    model
        .plural
        .clone()
        .unwrap_or_else(|| pluralize(&model.name))
}

/// Root field name of an operation (`getConnection`, `listCompanies`, `onDeleteCompany`)
pub fn root_field(model: &ModelConfig, action: Action) -> String {
    match action {
        Action::Get => format!("get{}", model.name),
        Action::List => format!("list{}", plural_name(model)),
        Action::Create => format!("create{}", model.name),
        Action::Update => format!("update{}", model.name),
        Action::Delete => format!("delete{}", model.name),
        Action::OnCreate => format!("onCreate{}", model.name),
        Action::OnUpdate => format!("onUpdate{}", model.name),
        Action::OnDelete => format!("onDelete{}", model.name),
    }
}

/// Input type of a mutation (`CreateConnectionInput`)
pub fn mutation_input(model: &ModelConfig, action: Action) -> String {
    let verb = match action {
        Action::Update => "Update",
        Action::Delete => "Delete",
        _ => "Create",
    };
    format!("{}{}Input", verb, model.name)
}

/// Filter input of list queries (`ModelConnectionFilterInput`)
pub fn filter_input(model: &ModelConfig) -> String {
    format!("Model{}FilterInput", model.name)
}

/// Precondition input of mutations (`ModelConnectionConditionInput`)
pub fn condition_input(model: &ModelConfig) -> String {
    format!("Model{}ConditionInput", model.name)
}

/// Filter input of subscriptions (`ModelSubscriptionConnectionFilterInput`)
pub fn subscription_filter_input(model: &ModelConfig) -> String {
    format!("ModelSubscription{}FilterInput", model.name)
}

/// Page type returned by list queries (`ModelConnectionConnection`)
pub fn page_type(model: &ModelConfig) -> String {
    format!("Model{}Connection", model.name)
}
