mod commands;
mod output;
mod records;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dxe")]
#[command(version, about = "Data Expectations Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a JSON records file against an expectation suite
    Validate {
        /// Path to the suite file (YAML, TOML or JSON)
        suite: String,

        /// Path to the records file (JSON array of objects)
        #[arg(short, long)]
        data: String,

        /// Abort on the first configuration or schema problem
        #[arg(short, long)]
        strict: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,

        /// Maximum number of unexpected values kept per assertion
        #[arg(long, default_value_t = 20)]
        sample_limit: usize,

        /// Suite store directory; the result is saved there when given
        #[arg(long, env = "DXE_STORE_DIR")]
        store: Option<PathBuf>,
    },

    /// Check a suite file against the registered assertion types
    Check {
        /// Path to the suite file (YAML, TOML or JSON)
        suite: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Scaffold a new suite, optionally profiled from a records file
    Init {
        /// Suite name
        name: String,

        /// Records file to profile (JSON array of objects)
        #[arg(short, long)]
        data: Option<String>,

        /// Output file path (defaults to YAML on stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Save a suite file into the suite store
    Save {
        /// Path to the suite file (YAML, TOML or JSON)
        suite: String,

        /// Suite store directory
        #[arg(long, env = "DXE_STORE_DIR")]
        store: PathBuf,

        /// Store key (defaults to expectations/<suite name>)
        #[arg(short, long)]
        key: Option<String>,

        /// Keep assertions that failed in this stored result even if the suite dropped them
        #[arg(long, value_name = "RESULT_KEY")]
        preserve_failed: Option<String>,
    },

    /// List keys in the suite store
    List {
        /// Suite store directory
        #[arg(long, env = "DXE_STORE_DIR")]
        store: PathBuf,

        /// Only list keys under this prefix (e.g. "expectations")
        #[arg(short, long, default_value = "")]
        prefix: String,
    },

    /// Show a stored suite or validation result
    Show {
        /// Store key
        key: String,

        /// Suite store directory
        #[arg(long, env = "DXE_STORE_DIR")]
        store: PathBuf,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    // Execute command
    match cli.command {
        Commands::Validate {
            suite,
            data,
            strict,
            format,
            sample_limit,
            store,
        } => {
            commands::validate::execute(
                &suite,
                &data,
                strict,
                &format,
                sample_limit,
                store.as_deref(),
            )
            .await
        }

        Commands::Check { suite, format } => commands::check::execute(&suite, &format).await,

        Commands::Init { name, data, output } => {
            commands::init::execute(&name, data.as_deref(), output.as_deref()).await
        }

        Commands::Save {
            suite,
            store,
            key,
            preserve_failed,
        } => {
            commands::save::execute(&suite, &store, key.as_deref(), preserve_failed.as_deref())
                .await
        }

        Commands::List { store, prefix } => commands::list::execute(&store, &prefix).await,

        Commands::Show { key, store, format } => {
            commands::show::execute(&key, &store, &format).await
        }
    }
}
