/// Column to field mappings of the processed exports

use crate::config::ModelConfig;
use crate::model::{company_model, connection_model};

use serde_json::{Map, Value};

/// Cells read as missing values, the default NA markers of pandas
///
/// Infinite values are missing only in numeric columns, see `TextTable::numeric_columns`.
const MISSING: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Columns of the processed contacts export
const CONTACT_COLUMNS: [(&str, &str); 11] = [
    ("Company", "companyName"),
    ("LinkedinURL", "linkedinURL"),
    ("First Name", "firstName"),
    ("Last Name", "lastName"),
    ("Email", "email"),
    ("Position", "position"),
    ("Connected On", "connectedOn"),
    ("Contact", "contact"),
    ("Education Institutions", "educationInstitutions"),
    ("Companies", "pastCompanies"),
    ("linkedin_json", "linkedinJSON"),
];

/// Columns of the processed companies export
const COMPANY_COLUMNS: [(&str, &str); 14] = [
    ("company_name", "companyName"),
    ("company_linkedin_url", "companyLinkedInURL"),
    ("website_url", "websiteURL"),
    ("industry", "industry"),
    ("specialties", "specialties"),
    ("employee_count", "employeeCount"),
    ("city", "city"),
    ("geographic_area", "geographicArea"),
    ("postal_code", "postalCode"),
    ("founded", "founded"),
    ("tagline", "tagline"),
    ("description", "description"),
    ("logo_url", "logoURL"),
    ("full_json", "fullJSON"),
];

/// How CSV columns become create-input fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvMapping {
    /// `(column, field)` pairs
    pub columns: Vec<(String, String)>,
    /// Derive `contactName` from `firstName` and `lastName`
    pub derive_contact_name: bool,
}

impl CsvMapping {
    pub fn contacts() -> Self {
        Self {
            columns: pairs(&CONTACT_COLUMNS),
            derive_contact_name: true,
        }
    }

    pub fn companies() -> Self {
        Self {
            columns: pairs(&COMPANY_COLUMNS),
            derive_contact_name: false,
        }
    }

    /// Mapping of a model
    ///
    /// Models other than the built-in ones read columns named after their fields.
    pub fn for_model(model: &ModelConfig) -> Self {
        if model.name == connection_model().name {
            Self::contacts()
        } else if model.name == company_model().name {
            Self::companies()
        } else {
            Self {
                columns: model
                    .field
                    .iter()
                    .map(|f| (f.name.clone(), f.name.clone()))
                    .collect(),
                derive_contact_name: false,
            }
        }
    }

    /// Build a create input from one row
    ///
    /// `cell` returns the raw text of a column, `None` when the column is absent
    /// or the cell is null.
    pub fn map_row<'a>(&self, cell: impl Fn(&str) -> Option<&'a str>) -> Map<String, Value> {
        let mut input = Map::new();

        for (column, field) in &self.columns {
            if let Some(text) = cell(column).filter(|text| !is_missing(text)) {
                input.insert(field.clone(), Value::String(text.to_string()));
            }
        }

        if self.derive_contact_name {
            if let (Some(Value::String(first)), Some(Value::String(last))) =
                (input.get("firstName"), input.get("lastName"))
            {
                let contact_name = format!("{} {}", first, last);
                input.insert("contactName".to_string(), Value::String(contact_name));
            }
        }

        input
    }
}

fn pairs(columns: &[(&str, &str)]) -> Vec<(String, String)> {
    columns
        .iter()
        .map(|(column, field)| (column.to_string(), field.to_string()))
        .collect()
}

pub fn is_missing(text: &str) -> bool {
    MISSING.contains(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row<'a>(cells: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Option<&'a str> + 'a {
        move |column| cells.get(column).copied()
    }

    #[test]
    fn test_contacts_mapping() {
        let cells = HashMap::from([
            ("Company", "Example Co"),
            ("First Name", "Jane"),
            ("Last Name", "Doe"),
            ("Companies", "[\"Acme\"]"),
            ("Email", ""),
            ("Unrelated", "ignored"),
        ]);

        let input = CsvMapping::contacts().map_row(row(&cells));

        assert_eq!(input["companyName"], "Example Co");
        assert_eq!(input["contactName"], "Jane Doe");
        assert_eq!(input["pastCompanies"], "[\"Acme\"]");
        assert!(!input.contains_key("email"));
        assert!(!input.contains_key("Unrelated"));
    }

    #[test]
    fn test_contact_name_needs_both_names() {
        let cells = HashMap::from([("First Name", "Jane"), ("Last Name", "nan")]);

        let input = CsvMapping::contacts().map_row(row(&cells));
        assert_eq!(input["firstName"], "Jane");
        assert!(!input.contains_key("contactName"));
    }

    #[test]
    fn test_companies_mapping() {
        let cells = HashMap::from([
            ("company_name", "Acme"),
            ("employee_count", "NULL"),
            ("full_json", "{}"),
        ]);

        let input = CsvMapping::companies().map_row(row(&cells));
        assert_eq!(input["companyName"], "Acme");
        assert_eq!(input["fullJSON"], "{}");
        assert!(!input.contains_key("employeeCount"));
        assert!(!input.contains_key("contactName"));
    }

    #[test]
    fn test_mapping_for_models() {
        assert_eq!(CsvMapping::for_model(&connection_model()), CsvMapping::contacts());
        assert_eq!(CsvMapping::for_model(&company_model()), CsvMapping::companies());

        let custom = ModelConfig {
            name: "Person".to_string(),
            plural: Some("People".to_string()),
            description: None,
            field: vec![crate::config::FieldConfig::string("nickname")],
        };
        let mapping = CsvMapping::for_model(&custom);
        assert_eq!(mapping.columns, vec![("nickname".to_string(), "nickname".to_string())]);
    }

    #[test]
    fn test_missing_cells() {
        for text in ["", "nan", "NaN", "-nan", "NA", "N/A", "n/a", "null", "NULL", "None", "<NA>", "#N/A"] {
            assert!(is_missing(text), "{:?}", text);
        }
        assert!(!is_missing("0"));
        assert!(!is_missing("Nancy"));
        assert!(!is_missing("inf"));
        assert!(!is_missing("none"));
    }
}
