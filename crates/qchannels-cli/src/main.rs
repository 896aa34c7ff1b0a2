//! qchannels command-line interface.
//!
//! ```text
//! qchannels backends
//! qchannels channels
//! qchannels hadamard --mask 0:3
//! qchannels choi -c landau-streater
//! qchannels direct-choi -c werner-holevo --exact
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use qchannels_cli::cli::{Cli, Commands};
use qchannels_cli::config::ExperimentConfig;
use qchannels_cli::experiments::DirectChoiMasks;

mod commands;

use commands::{backends, channels, choi, state};

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ExperimentConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    match cli.command {
        Commands::Backends => backends::execute(&config).await,
        Commands::Channels => {
            channels::execute();
            Ok(())
        }
        Commands::State { channel, mask } => state::execute(&config, channel, mask).await,
        Commands::Hadamard { mask } => state::execute_hadamard(&config, mask).await,
        Commands::Choi { channel, mask } => choi::execute(&config, channel, mask).await,
        Commands::DirectChoi {
            channel,
            mask,
            identity_mask,
        } => {
            let masks = DirectChoiMasks {
                channel: mask,
                identity: identity_mask,
            };
            choi::execute_direct(&config, channel, masks).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
