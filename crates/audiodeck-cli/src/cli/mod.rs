//! CLI for the AudioDeck clip backend.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use audiodeck_core::config;

use commands::{run_config, run_fetch, run_info, run_serve, run_trim};

/// Top-level CLI for AudioDeck.
#[derive(Debug, Parser)]
#[command(name = "audiodeck")]
#[command(about = "AudioDeck: fetch, trim and serve audio clips", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the HTTP server (REST endpoints plus WebSocket/SSE progress).
    Serve {
        /// Listen address; overrides `listen_addr` and AUDIODECK_ADDR.
        #[arg(long, value_name = "HOST:PORT")]
        addr: Option<String>,
    },

    /// Fetch a link as an audio clip and print progress until it finishes.
    Fetch {
        /// Page URL of the media (YouTube, Vimeo, SoundCloud, ...).
        url: String,
        /// Name for the resulting clip.
        #[arg(long)]
        name: String,
    },

    /// Print the title and duration of a link without downloading it.
    Info {
        /// Page URL of the media.
        url: String,
    },

    /// Cut a section of an existing clip into a new clip.
    Trim {
        /// Clip filename inside the clips directory.
        file: String,
        /// Start of the section, in seconds.
        #[arg(long)]
        start: f64,
        /// End of the section, in seconds.
        #[arg(long)]
        end: f64,
        /// Name for the trimmed clip.
        #[arg(long)]
        name: String,
    },

    /// Print the effective configuration as TOML.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Serve { addr } => run_serve(&cfg, addr.as_deref()).await?,
            CliCommand::Fetch { url, name } => run_fetch(&cfg, &url, &name).await?,
            CliCommand::Info { url } => run_info(&cfg, &url).await?,
            CliCommand::Trim {
                file,
                start,
                end,
                name,
            } => run_trim(&cfg, file, start, end, name).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
