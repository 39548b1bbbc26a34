use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// GraphQL operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub const ALL: [OperationKind; 3] = [
        OperationKind::Query,
        OperationKind::Mutation,
        OperationKind::Subscription,
    ];

    /// Keyword opening the document (`query`, `mutation`, `subscription`)
    pub fn keyword(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }

    /// File stem of the generated module (`queries`, `mutations`, `subscriptions`)
    pub fn file_stem(&self) -> &'static str {
        match self {
            OperationKind::Query => "queries",
            OperationKind::Mutation => "mutations",
            OperationKind::Subscription => "subscriptions",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// What an operation does to its model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Get,
    List,
    Create,
    Update,
    Delete,
    OnCreate,
    OnUpdate,
    OnDelete,
}

impl Action {
    /// Catalog order for a single model
    pub const ALL: [Action; 8] = [
        Action::Get,
        Action::List,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::OnCreate,
        Action::OnUpdate,
        Action::OnDelete,
    ];

    pub fn kind(&self) -> OperationKind {
        match self {
            Action::Get | Action::List => OperationKind::Query,
            Action::Create | Action::Update | Action::Delete => OperationKind::Mutation,
            Action::OnCreate | Action::OnUpdate | Action::OnDelete => OperationKind::Subscription,
        }
    }

    /// Subscription action notified by a mutation
    pub fn subscription(&self) -> Option<Action> {
        match self {
            Action::Create => Some(Action::OnCreate),
            Action::Update => Some(Action::OnUpdate),
            Action::Delete => Some(Action::OnDelete),
            _ => None,
        }
    }
}

/// A declared operation variable (`$limit: Int`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variable {
    pub name: String,
    pub type_name: String,
    pub required: bool,
}

impl Variable {
    pub fn optional(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            required: false,
        }
    }

    pub fn required(name: &str, type_name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_name: type_name.to_string(),
            required: true,
        }
    }

    /// Type reference as written in a document (`ID!`, `Int`)
    pub fn type_ref(&self) -> String {
        if self.required {
            format!("{}!", self.type_name)
        } else {
            self.type_name.clone()
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}: {}", self.name, self.type_ref())
    }
}

/// Fields requested by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Selection {
    /// A single record
    Record { fields: Vec<String> },
    /// A page: `items { fields }` plus the continuation token
    Page { items: Vec<String> },
}

impl Selection {
    /// Record fields, regardless of the shape
    pub fn record_fields(&self) -> &[String] {
        match self {
            Selection::Record { fields } => fields,
            Selection::Page { items } => items,
        }
    }
}

/// A single operation template
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    /// Root field and export name (`getConnection`)
    pub name: String,
    pub model: String,
    pub action: Action,
    pub variables: Vec<Variable>,
    pub selection: Selection,
    /// Rendered GraphQL document
    pub document: String,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        self.action.kind()
    }

    /// Operation name used in the document (`GetConnection`)
    pub fn operation_name(&self) -> String {
        super::naming::upper_first(&self.name)
    }
}

/// Ordered mapping from operation name to template
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    operations: IndexMap<String, Operation>,
}

impl Catalog {
    pub(crate) fn insert(&mut self, operation: Operation) -> Option<Operation> {
        self.operations.insert(operation.name.clone(), operation)
    }

    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// The operation performing `action` on `model`
    pub fn find(&self, model: &str, action: Action) -> Option<&Operation> {
        self.iter().find(|op| op.model == model && op.action == action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.operations.keys().map(String::as_str)
    }

    pub fn by_kind(&self, kind: OperationKind) -> impl Iterator<Item = &Operation> {
        self.iter().filter(move |op| op.kind() == kind)
    }

    pub fn for_model<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a Operation> {
        self.iter().filter(move |op| op.model == model)
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kinds() {
        assert_eq!(Action::Get.kind(), OperationKind::Query);
        assert_eq!(Action::Delete.kind(), OperationKind::Mutation);
        assert_eq!(Action::OnUpdate.kind(), OperationKind::Subscription);
        assert_eq!(Action::Create.subscription(), Some(Action::OnCreate));
        assert_eq!(Action::List.subscription(), None);
    }

    #[test]
    fn test_variable_display() {
        assert_eq!(Variable::required("id", "ID").to_string(), "$id: ID!");
        assert_eq!(Variable::optional("limit", "Int").to_string(), "$limit: Int");
    }

    #[test]
    fn test_kind_file_stems() {
        let stems: Vec<_> = OperationKind::ALL.iter().map(|k| k.file_stem()).collect();
        assert_eq!(stems, vec!["queries", "mutations", "subscriptions"]);
        assert_eq!(OperationKind::Subscription.to_string(), "subscription");
    }
}
