/// Preparation and import of CSV exports
///
/// Enriched exports are processed locally into the processed files, whose
/// rows are mapped to create inputs and sent as `create{Model}` mutations,
/// one at a time.

mod csv;
mod mapping;
mod process;

pub use csv::{read_inputs, read_table, write_table, TextTable};
pub use mapping::{is_missing, CsvMapping};
pub use process::{
    company_columns, company_links, extract_company_list, extract_names, process_companies,
    process_people, CompanyLink, ProcessSummary, COMPANY_EXPORT_COLUMNS,
};

use crate::catalog::Action;
use crate::client::ApiClient;
use crate::config::ModelConfig;
use crate::error::{ContactGraphError, Result};

use serde_json::{json, Value};
use std::path::Path;

/// Outcome of a load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub created: usize,
    pub failed: usize,
}

/// Read `path` and create one record of `model` per row
///
/// Rows rejected by the backend are logged and counted; authentication and
/// network failures abort the load.
pub async fn load_csv(client: &ApiClient, model: &ModelConfig, path: &Path) -> Result<LoadSummary> {
    let inputs = read_inputs(path, &CsvMapping::for_model(model))?;

    tracing::info!(
        "Loading {} {} record(s) from {}",
        inputs.len(),
        model.name,
        path.display()
    );

    let mut summary = LoadSummary::default();
    for (row, input) in inputs.into_iter().enumerate() {
        let variables = json!({ "input": Value::Object(input) });

        match client.execute_action(&model.name, Action::Create, variables).await {
            Ok(_) => summary.created += 1,
            Err(e @ (ContactGraphError::Unauthorized(_) | ContactGraphError::Network(_))) => {
                return Err(e)
            }
            Err(e) => {
                tracing::warn!("Row {} of {} rejected: {}", row + 1, path.display(), e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}
