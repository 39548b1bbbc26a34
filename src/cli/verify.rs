use anyhow::bail;
use contactgraph::catalog::{verify_catalog, CatalogBuilder};

/// Run the verify command, failing when any operation violates its model
pub fn run(config_path: Option<String>) -> anyhow::Result<()> {
    let config = super::config_or_builtin(config_path)?;
    let catalog = CatalogBuilder::new().build(&config.model)?;

    let report = verify_catalog(&catalog, &config.model);

    if report.is_ok() {
        tracing::info!("✅ {} operation(s) verified", report.checked);
        return Ok(());
    }

    for violation in &report.violations {
        tracing::error!("❌ {}", violation);
    }
    bail!(
        "{} violation(s) in {} operation(s)",
        report.violations.len(),
        report.checked
    )
}
