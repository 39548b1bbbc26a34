use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record type with a model in the operation catalog
pub trait Record: DeserializeOwned + Serialize + Send {
    /// Name of the model the record belongs to
    const MODEL: &'static str;

    fn id(&self) -> &str;
}

/// A professional contact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_name: Option<String>,
    #[serde(rename = "linkedinURL", default, skip_serializing_if = "Option::is_none")]
    pub linkedin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connected_on: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// JSON array of institutions, as exported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_institutions: Option<String>,
    /// JSON array of past employers, as exported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_companies: Option<String>,
    #[serde(rename = "linkedinJSON", default, skip_serializing_if = "Option::is_none")]
    pub linkedin_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Record for Connection {
    const MODEL: &'static str = "Connection";

    fn id(&self) -> &str {
        &self.id
    }
}

/// An organisation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(rename = "companyLinkedInURL", default, skip_serializing_if = "Option::is_none")]
    pub company_linkedin_url: Option<String>,
    #[serde(rename = "websiteURL", default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialties: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_area: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "logoURL", default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(rename = "fullJSON", default, skip_serializing_if = "Option::is_none")]
    pub full_json: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Record for Company {
    const MODEL: &'static str = "Company";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One page of a list operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Continuation token; `None` on the last page
    #[serde(default)]
    pub next_token: Option<String>,
}
