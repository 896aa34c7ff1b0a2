//! State and Hadamard command implementations.

use anyhow::Result;
use console::style;

use qchannels_channels::{ChannelName, QubitMask};
use qchannels_cli::config::ExperimentConfig;
use qchannels_cli::display::format_matrix;
use qchannels_cli::experiments::{self, StateReport};

use super::common::{context_with_spinner, print_fidelity, print_header};

/// Execute the state command.
pub async fn execute(
    config: &ExperimentConfig,
    channel: ChannelName,
    mask: Option<QubitMask>,
) -> Result<()> {
    let (ctx, spinner) = context_with_spinner(config)?;
    print_header("State tomography of", channel.as_str(), &ctx, config);

    let report = experiments::state_tomography(&ctx, channel.channel(), mask.unwrap_or_default()).await;
    spinner.finish_and_clear();
    print_state(&report?);
    Ok(())
}

/// Execute the hadamard command.
pub async fn execute_hadamard(config: &ExperimentConfig, mask: Option<QubitMask>) -> Result<()> {
    let (ctx, spinner) = context_with_spinner(config)?;
    print_header("Tomography of", "hadamard", &ctx, config);

    let report = experiments::hadamard(&ctx, mask.unwrap_or_default()).await;
    spinner.finish_and_clear();
    let report = report?;
    print_state(&report);
    if let Some(comparison) = &report.comparison {
        println!("\n  Expected H|0><0|H:");
        for line in format_matrix(&comparison.expected).lines() {
            println!("  {line}");
        }
    }
    Ok(())
}

fn print_state(report: &StateReport) {
    println!(
        "\n{} Density matrix on qubits {:?}:",
        style("✓").green().bold(),
        report.qubits
    );
    for line in format_matrix(report.state.as_matrix()).lines() {
        println!("  {line}");
    }
    match &report.comparison {
        Some(comparison) => {
            println!();
            print_fidelity("Fidelity", comparison.fidelity);
        }
        None => println!("\n  No theory prediction for '{}'", report.channel),
    }
}
