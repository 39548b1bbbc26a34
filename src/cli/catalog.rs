use anyhow::bail;
use contactgraph::catalog::{CatalogBuilder, OperationKind};

/// Run the catalog command to list operations or print one document
pub fn run(
    config_path: Option<String>,
    kind: Option<OperationKind>,
    name: Option<String>,
) -> anyhow::Result<()> {
    let config = super::config_or_builtin(config_path)?;
    let catalog = CatalogBuilder::new().build(&config.model)?;

    if let Some(name) = name {
        let Some(operation) = catalog.get(&name) else {
            bail!("Unknown operation '{}'", name);
        };
        print!("{}", operation.document);
        return Ok(());
    }

    let kinds = match kind {
        Some(kind) => vec![kind],
        None => OperationKind::ALL.to_vec(),
    };

    for kind in kinds {
        for operation in catalog.by_kind(kind) {
            let variables: Vec<String> = operation.variables.iter().map(|v| v.to_string()).collect();
            println!("{:<13} {:<22} {}", kind.keyword(), operation.name, variables.join(", "));
        }
    }

    Ok(())
}
