use anyhow::Context;
use contactgraph::client::ApiClient;
use contactgraph::config::API_KEY_ENV;
use contactgraph::loader::load_csv;
use std::path::Path;

/// Run the load command to import a CSV export into the remote backend
pub async fn run(config_path: Option<String>, model: String, csv: String) -> anyhow::Result<()> {
    let config = super::config_or_default(config_path)?;

    let model = config.find_model(&model).with_context(|| {
        let known: Vec<&str> = config.model.iter().map(|m| m.name.as_str()).collect();
        format!("Unknown model '{}' (known: {})", model, known.join(", "))
    })?;
    let endpoint = config
        .endpoint
        .as_ref()
        .context("No [endpoint] configured; set endpoint.url or CONTACTGRAPH__ENDPOINT__URL")?;
    let api_key = std::env::var(API_KEY_ENV)
        .with_context(|| format!("{} environment variable not set", API_KEY_ENV))?;

    let client = ApiClient::with_models(endpoint.url.clone(), api_key, &config.model)?;

    tracing::info!("🔄 Loading {} into {}", csv, endpoint.url);

    let summary = load_csv(&client, model, Path::new(&csv))
        .await
        .with_context(|| format!("Failed to load {}", csv))?;

    tracing::info!("🎉 Created {} {} record(s)", summary.created, model.name);
    if summary.failed > 0 {
        tracing::warn!("⚠️  {} row(s) were rejected", summary.failed);
    }

    Ok(())
}
