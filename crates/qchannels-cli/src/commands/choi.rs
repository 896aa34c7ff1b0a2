//! Choi experiment command implementations.

use anyhow::Result;
use console::style;

use qchannels_channels::{ChannelName, QubitMask};
use qchannels_cli::config::ExperimentConfig;
use qchannels_cli::experiments::{self, DirectChoiMasks};

use super::common::{context_with_spinner, print_choi, print_fidelity, print_header};

/// Execute the choi command.
pub async fn execute(
    config: &ExperimentConfig,
    channel: ChannelName,
    mask: Option<QubitMask>,
) -> Result<()> {
    let (ctx, spinner) = context_with_spinner(config)?;
    print_header("Basis-state Choi experiment for", channel.as_str(), &ctx, config);

    let report =
        experiments::basis_state_choi(&ctx, channel.channel(), mask.unwrap_or_default()).await;
    spinner.finish_and_clear();
    let report = report?;

    println!("\n{} Basis outputs:", style("✓").green().bold());
    for output in &report.outputs {
        print_fidelity(
            &format!("{} (trace {:.4})", style(output.name).cyan(), output.trace),
            output.fidelity,
        );
    }
    print_choi(&report);
    Ok(())
}

/// Execute the direct-choi command.
pub async fn execute_direct(
    config: &ExperimentConfig,
    channel: ChannelName,
    masks: DirectChoiMasks,
) -> Result<()> {
    let (ctx, spinner) = context_with_spinner(config)?;
    print_header("Direct Choi experiment for", channel.as_str(), &ctx, config);

    let report = experiments::direct_choi(&ctx, channel.channel(), masks).await;
    spinner.finish_and_clear();
    print_choi(&report?);
    Ok(())
}
