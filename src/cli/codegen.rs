use anyhow::Context;
use contactgraph::catalog::{write_files, CatalogBuilder};
use contactgraph::config::OutputFormat;
use std::path::Path;

/// Run the codegen command to write the operation modules
pub fn run(
    config_path: Option<String>,
    out: Option<String>,
    format: Option<OutputFormat>,
) -> anyhow::Result<()> {
    let config = super::config_or_builtin(config_path)?;

    let out_dir = out.unwrap_or_else(|| config.codegen.out_dir.clone());
    let format = format.unwrap_or(config.codegen.format);

    let catalog = CatalogBuilder::new().build(&config.model)?;
    tracing::info!(
        "🔧 Generating {} operations for {} model(s)",
        catalog.len(),
        config.model.len()
    );

    let written = write_files(&catalog, format, Path::new(&out_dir))
        .with_context(|| format!("Failed to write operations to {}", out_dir))?;

    for path in &written {
        tracing::info!("   ✅ {}", path.display());
    }

    Ok(())
}
