//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Remote Resources - Materialize shared build resources from bundles
#[derive(Parser, Debug)]
#[command(name = "remote-resources")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Retrieve the configured resource bundles and process their resources
    Process(commands::process::ProcessArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or(self.log_level.as_str()),
        )
        .format_timestamp(None)
        .init();

        let output = crate::output::OutputConfig::from_env_and_flag(&self.color);

        match self.command {
            Commands::Process(args) => commands::process::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}
