//! # paychan-cli
//!
//! Command-line interface for payment channel field mappings.
//!
//! Results are printed to stdout as JSON; logs go to stderr.

mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use config::Config;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "paychan")]
#[command(about = "Payment channel field mapping toolkit")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one transform rule against a sample value
    Transform {
        /// Input value as JSON; anything that is not JSON is taken as a string
        #[arg(long)]
        value: String,

        /// Rule as JSON, or @path to a JSON or YAML file
        #[arg(long)]
        rule: String,
    },

    /// List the fields declared in an API document
    Fields {
        /// Swagger 2 or OpenAPI 3 document (JSON or YAML)
        document: PathBuf,
    },

    /// List the endpoints declared in an API document
    Endpoints {
        /// Swagger 2 or OpenAPI 3 document (JSON or YAML)
        document: PathBuf,
    },

    /// Validate mapping definitions against a channel's fields
    Validate {
        /// Mapping definitions file (JSON or YAML list)
        #[arg(short, long)]
        mappings: PathBuf,

        #[command(flatten)]
        fields: FieldSource,
    },

    /// Apply a mapping set to a payload
    Apply {
        /// Payload file (JSON or YAML object)
        payload: PathBuf,

        /// Field mappings file (JSON or YAML list)
        #[arg(short, long)]
        mappings: PathBuf,

        /// Write the output here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Where the channel's field catalog comes from
#[derive(Args)]
#[group(required = true, multiple = false)]
struct FieldSource {
    /// API document to extract fields from
    #[arg(long)]
    doc: Option<PathBuf>,

    /// Field definitions file (JSON or YAML list)
    #[arg(long)]
    fields: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_ref())?;

    match cli.command {
        Commands::Transform { value, rule } => commands::transform(&config, &value, &rule),
        Commands::Fields { document } => commands::fields(&document),
        Commands::Endpoints { document } => commands::endpoints(&document),
        Commands::Validate { mappings, fields } => {
            commands::validate(&mappings, fields.doc.as_deref(), fields.fields.as_deref())
        }
        Commands::Apply {
            payload,
            mappings,
            output,
        } => commands::apply(&config, &payload, &mappings, output.as_deref()),
    }
}
