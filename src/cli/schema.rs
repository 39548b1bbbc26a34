use contactgraph::schema::MockSchemaBuilder;

/// Run the schema command to print the SDL of the mock backend
pub fn run(config_path: Option<String>) -> anyhow::Result<()> {
    let config = super::config_or_builtin(config_path)?;
    let schema = MockSchemaBuilder::new().build_schema(&config.model)?;

    println!("{}", schema.sdl());

    Ok(())
}
