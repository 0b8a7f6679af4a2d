mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "dce")]
#[command(version, about = "Data Contracts Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate JSON records against a contract
    Validate {
        /// Path to the contract file (YAML or TOML)
        contract: String,

        /// Path to a JSON file holding one record or an array of records
        records: String,

        /// Enable strict validation mode (fail on quality warnings)
        #[arg(short, long)]
        strict: bool,

        /// Only check records against the schema, skip quality rules
        #[arg(long)]
        schema_only: bool,

        /// Validate at most this many records of a batch
        #[arg(long)]
        sample_size: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check a contract without validating data
    Check {
        /// Path to the contract file (YAML or TOML)
        contract: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the changes between two versions of a contract
    Diff {
        /// Path to the old contract file
        old: String,

        /// Path to the new contract file
        new: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compute the next version of a contract from its changes
    Bump {
        /// Current version (e.g. 1.2.0)
        current: String,

        /// Path to the old contract file
        old: String,

        /// Path to the new contract file
        new: String,
    },

    /// Create a contract from a built-in template
    Init {
        /// Template name (see --list)
        #[arg(short, long, required_unless_present = "list")]
        template: Option<String>,

        /// List the available templates
        #[arg(short, long, conflicts_with = "template")]
        list: bool,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable; RUST_LOG wins.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .init();

    match cli.command {
        Commands::Validate {
            contract,
            records,
            strict,
            schema_only,
            sample_size,
            format,
        } => commands::validate::execute(
            &contract,
            &records,
            strict,
            schema_only,
            sample_size,
            format,
        ),

        Commands::Check { contract, format } => commands::check::execute(&contract, format),

        Commands::Diff { old, new, format } => commands::diff::execute(&old, &new, format),

        Commands::Bump { current, old, new } => commands::bump::execute(&current, &old, &new),

        Commands::Init {
            template,
            list,
            output,
        } => commands::init::execute(template.as_deref(), list, output.as_deref()),
    }
}
