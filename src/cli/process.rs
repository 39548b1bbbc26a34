use anyhow::Context;
use clap::ValueEnum;
use contactgraph::loader::{extract_company_list, process_companies, process_people};
use std::path::Path;

/// Local processing step applied to an enriched export
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    /// Add company and school name columns to a contacts export
    People,
    /// Flatten company payloads into the processed companies columns
    Companies,
    /// List the company pages referenced by a processed contacts export
    CompanyList,
}

/// Run the process command on `input`, writing `output`
pub fn run(step: Step, input: String, output: String) -> anyhow::Result<()> {
    let (input_path, output_path) = (Path::new(&input), Path::new(&output));
    tracing::info!("🔄 Processing {} ({:?})", input, step);

    match step {
        Step::People | Step::Companies => {
            let process = match step {
                Step::People => process_people,
                _ => process_companies,
            };
            let summary = process(input_path, output_path)
                .with_context(|| format!("Failed to process {}", input))?;

            tracing::info!(
                "✅ Wrote {} ({} new row(s), {} kept)",
                output,
                summary.added,
                summary.kept
            );
        }
        Step::CompanyList => {
            let count = extract_company_list(input_path, output_path)
                .with_context(|| format!("Failed to extract companies from {}", input))?;
            tracing::info!("✅ Wrote {} compan(ies) to {}", count, output);
        }
    }

    Ok(())
}
