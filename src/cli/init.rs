use contactgraph::config::{self, Config, EndpointConfig, API_KEY_ENV};

/// Run the init command to write a configuration holding the built-in models
pub fn run(output: Option<String>) -> anyhow::Result<()> {
    tracing::info!("🎨 Generating configuration with the built-in models...");

    let config = Config {
        endpoint: Some(EndpointConfig {
            url: "https://example.appsync-api.us-east-2.amazonaws.com/graphql".to_string(),
        }),
        ..Config::builtin()
    };

    for model in &config.model {
        tracing::info!("   • {} ({} fields)", model.name, model.field.len());
    }

    if let Some(output_path) = output {
        config::save_config(&config, &output_path)?;
        tracing::info!("📝 Generated {}", output_path);
        tracing::info!("💡 Next steps:");
        tracing::info!("   1. Point endpoint.url at your GraphQL API and export {}", API_KEY_ENV);
        tracing::info!("   2. Generate client modules with 'contactgraph codegen --config {}'", output_path);
        tracing::info!("   3. Or start a local backend with 'contactgraph serve --config {}'", output_path);
    } else {
        let toml_string = toml::to_string_pretty(&config)?;
        println!("{}", toml_string);
        tracing::info!("💡 Tip: Add --output <file> to save to a file instead of stdout");
    }

    Ok(())
}
