//! CLI for the formup upload client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use formup_core::config;
use std::path::PathBuf;

use commands::{run_config, run_upload, UploadArgs};

/// Top-level CLI for formup.
#[derive(Debug, Parser)]
#[command(name = "formup")]
#[command(about = "formup: multipart form uploads with CSRF cookie propagation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// POST fields to an address as multipart/form-data.
    Upload {
        /// Absolute URL, or a path joined onto `base_url` from the config.
        address: String,

        /// Text field (repeatable).
        #[arg(short = 'f', long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,

        /// File field read from disk (repeatable).
        #[arg(short = 'F', long = "file", value_name = "NAME=@PATH")]
        files: Vec<String>,

        /// JSON object whose scalar members become fields (applied first).
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Cookie to send to the destination host (repeatable).
        #[arg(long = "cookie", value_name = "NAME=VALUE")]
        cookies: Vec<String>,

        /// GET this address first so the server can set the CSRF cookie.
        #[arg(long, value_name = "ADDRESS")]
        prime: Option<String>,
    },

    /// Show the config file path and effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Upload {
                address,
                fields,
                files,
                json,
                cookies,
                prime,
            } => {
                let args = UploadArgs {
                    address,
                    fields,
                    files,
                    json,
                    cookies,
                    prime,
                };
                run_upload(&cfg, &args).await?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
