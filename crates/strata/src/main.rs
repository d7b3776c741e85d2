//! strata CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::sources::SourceArgs;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Inspect layered configuration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load sources and print the resolved configuration as JSON
    Show {
        #[command(flatten)]
        sources: SourceArgs,

        /// Dotted path to print (defaults to the whole tree)
        path: Option<String>,
    },

    /// Load sources and print a single value
    Get {
        #[command(flatten)]
        sources: SourceArgs,

        /// Dotted path of the value
        path: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "strata=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show { sources, path } => commands::show::execute(&sources, path.as_deref()),
        Commands::Get { sources, path } => commands::get::execute(&sources, &path),
    }
}
