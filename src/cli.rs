//! Command-line interface: argument parsing and wiring of the production adapters.
//!
//! All pipeline logic lives in [`crate::pipeline`]; this module only loads
//! configuration, builds [`PandocConverter`] and [`GitCli`], and reports results.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::convert::PandocConverter;
use crate::load_config::{load_config, load_pipeline_config};
use crate::pipeline::Pipeline;
use crate::vcs::GitCli;

/// CLI for mercury: convert, index and publish posts.
#[derive(Parser, Debug)]
#[clap(
    name = "mercury",
    version,
    about = "Convert local .docx posts to markdown and push them to a static site repository"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert every document, update the site index, commit and push
    Publish {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
    /// List the documents a publish run would pick up
    Discover {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

fn build_pipeline(config: crate::config::PipelineConfig) -> Pipeline<PandocConverter, GitCli> {
    let timeout = config.command_timeout();
    let converter = PandocConverter::new(config.converter.clone(), timeout);
    let vcs = GitCli::new(config.repository.git_program.clone(), timeout);
    Pipeline::new(config, converter, vcs)
}

/// Async CLI entrypoint shared by `main` and the integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Publish { config } => {
            let loaded = load_config(config)?;
            tracing::info!(command = "publish", "Starting publishing run");
            let pipeline = build_pipeline(loaded.pipeline);
            match pipeline.run(&loaded.credential).await {
                Ok(report) => {
                    tracing::info!(command = "publish", ?report, "Publishing complete");
                    println!("Published {} document(s):", report.documents.len());
                    for doc in &report.documents {
                        println!("  {} ({})", doc.id, doc.date);
                    }
                    if !report.pushed {
                        println!("Nothing to push.");
                    }
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "publish", error = %e, "Publishing failed");
                    Err(anyhow::Error::new(e).context("Publishing failed"))
                }
            }
        }
        Commands::Discover { config } => {
            let config = load_pipeline_config(config)?;
            let pipeline = build_pipeline(config);
            let ids = pipeline.discover()?;
            tracing::info!(command = "discover", count = ids.len(), "Discovery complete");
            for id in &ids {
                println!("{id}");
            }
            Ok(())
        }
    }
}
