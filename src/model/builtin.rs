use crate::config::{FieldConfig, ModelConfig};

/// Static description of a built-in model
struct ModelMetadata {
    name: &'static str,
    description: &'static str,
    fields: &'static [&'static str],
}

const CONNECTION: ModelMetadata = ModelMetadata {
    name: "Connection",
    description: "A professional contact imported from a network export.",
    fields: &[
        "companyName",
        "contactName",
        "linkedinURL",
        "firstName",
        "lastName",
        "email",
        "position",
        "connectedOn",
        "contact",
        "educationInstitutions",
        "pastCompanies",
        "linkedinJSON",
    ],
};

const COMPANY: ModelMetadata = ModelMetadata {
    name: "Company",
    description: "An organisation a contact works or worked for.",
    fields: &[
        "companyName",
        "companyLinkedInURL",
        "websiteURL",
        "industry",
        "specialties",
        "employeeCount",
        "city",
        "geographicArea",
        "postalCode",
        "founded",
        "tagline",
        "description",
        "logoURL",
        "fullJSON",
    ],
};

impl ModelMetadata {
    fn to_config(&self) -> ModelConfig {
        ModelConfig {
            name: self.name.to_string(),
            plural: None,
            description: Some(self.description.to_string()),
            field: self.fields.iter().map(|name| FieldConfig::string(name)).collect(),
        }
    }
}

/// The `Connection` model
pub fn connection_model() -> ModelConfig {
    CONNECTION.to_config()
}

/// The `Company` model
pub fn company_model() -> ModelConfig {
    COMPANY.to_config()
}

/// Built-in models in catalog order
pub fn builtin_models() -> Vec<ModelConfig> {
    vec![connection_model(), company_model()]
}
