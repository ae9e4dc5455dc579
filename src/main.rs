use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use skyscribe::cli::{Cli, Commands};
use skyscribe::commands::{describe_coordinates, fetch_cutout, list_catalog_objects, list_places};
use skyscribe::server::run_server;
use skyscribe::{Config, Pipeline};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "skyscribe=debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);

    match cli.command {
        Commands::Describe { target, format } => {
            describe_coordinates(&config, target.resolve()?, &format)?;
        }
        Commands::Catalog { target, format } => {
            list_catalog_objects(&config, target.resolve()?, &format)?;
        }
        Commands::Fetch { target } => {
            fetch_cutout(&config, target.resolve()?)?;
        }
        Commands::Places { format } => {
            list_places(&format)?;
        }
        Commands::Serve { host, port } => {
            // The blocking HTTP clients inside the pipeline must be created and
            // dropped outside the async runtime.
            let pipeline = Arc::new(Pipeline::from_config(&config)?);

            let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
            let result = runtime.block_on(run_server(pipeline.clone(), host, port));
            drop(runtime);
            drop(pipeline);
            result?;
        }
    }

    Ok(())
}
