use clap::{Parser, Subcommand};
use contactgraph::catalog::OperationKind;
use contactgraph::config::OutputFormat;

mod cli;

#[derive(Parser)]
#[command(name = "contactgraph")]
#[command(version = "0.1.0")]
#[command(about = "Generate, verify and serve the GraphQL operations of contact and company records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a configuration holding the built-in models
    Init {
        /// Output config file path (if not specified, outputs to stdout)
        #[arg(long)]
        output: Option<String>,
    },

    /// Write the operation catalog as client modules
    Codegen {
        /// Config file path (built-in models when omitted)
        #[arg(long)]
        config: Option<String>,

        /// Output directory (defaults to codegen.out_dir)
        #[arg(long)]
        out: Option<String>,

        /// Output format (defaults to codegen.format)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// List catalog operations, or print one document
    Catalog {
        /// Config file path (built-in models when omitted)
        #[arg(long)]
        config: Option<String>,

        /// Only list operations of this kind
        #[arg(long, value_enum)]
        kind: Option<OperationKind>,

        /// Operation to print (e.g. listCompanies)
        name: Option<String>,
    },

    /// Check every operation against its model
    Verify {
        /// Config file path (built-in models when omitted)
        #[arg(long)]
        config: Option<String>,
    },

    /// Print the SDL of the mock backend
    Schema {
        /// Config file path (built-in models when omitted)
        #[arg(long)]
        config: Option<String>,
    },

    /// Start the mock GraphQL backend
    Serve {
        /// Config file path (contactgraph.toml, or the built-in models when it is absent)
        #[arg(long)]
        config: Option<String>,

        /// Server port (defaults to server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Prepare an enriched CSV export locally
    Process {
        /// Processing step to run
        #[arg(long, value_enum)]
        step: cli::process::Step,

        /// Enriched input CSV file
        input: String,

        /// Output CSV file (existing rows are kept)
        output: String,
    },

    /// Import a processed CSV export through create mutations
    Load {
        /// Config file path (contactgraph.toml, or the built-in models when it is absent)
        #[arg(long)]
        config: Option<String>,

        /// Model the rows belong to (e.g. Connection)
        #[arg(long)]
        model: String,

        /// CSV file
        csv: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            cli::init::run(output)?;
        }
        Commands::Codegen { config, out, format } => {
            cli::codegen::run(config, out, format)?;
        }
        Commands::Catalog { config, kind, name } => {
            cli::catalog::run(config, kind, name)?;
        }
        Commands::Verify { config } => {
            cli::verify::run(config)?;
        }
        Commands::Schema { config } => {
            cli::schema::run(config)?;
        }
        Commands::Serve { config, port } => {
            cli::serve::run(config, port).await?;
        }
        Commands::Process { step, input, output } => {
            cli::process::run(step, input, output)?;
        }
        Commands::Load { config, model, csv } => {
            cli::load::run(config, model, csv).await?;
        }
    }

    Ok(())
}
