//! Shared helpers for CLI commands.

use std::time::Duration;

use anyhow::{Result, anyhow};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use qchannels_cli::config::ExperimentConfig;
use qchannels_cli::experiments::{ChoiReport, ExperimentContext};
use qchannels_cli::registry::default_registry;

/// Build the experiment context and attach a spinner that follows the
/// launcher's progress.
pub fn context_with_spinner(config: &ExperimentConfig) -> Result<(ExperimentContext, ProgressBar)> {
    let ctx = ExperimentContext::new(&default_registry(), config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| anyhow!("invalid spinner template: {e}"))?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let progress = spinner.clone();
    let ctx = ctx.with_observer(move |phase| progress.set_message(phase.to_string()));
    Ok((ctx, spinner))
}

pub fn print_header(action: &str, subject: &str, ctx: &ExperimentContext, config: &ExperimentConfig) {
    println!(
        "{} {} {} on {} ({} shots)",
        style("→").cyan().bold(),
        action,
        style(subject).green(),
        style(ctx.backend_name()).yellow(),
        config.shots
    );
}

pub fn print_fidelity(label: &str, fidelity: f64) {
    let value = format!("{fidelity:.4}");
    let value = if fidelity > 0.9 {
        style(value).green()
    } else if fidelity > 0.7 {
        style(value).yellow()
    } else {
        style(value).red()
    };
    println!("  {label}: {value}");
}

pub fn print_choi(report: &ChoiReport) {
    use qchannels_cli::display::format_matrix;
    use qchannels_cli::experiments::choi_trace;

    println!("\n{} Choi matrix:", style("✓").green().bold());
    for line in format_matrix(report.measured.as_matrix()).lines() {
        println!("  {line}");
    }
    println!("\n  Trace: {:.4}", choi_trace(&report.measured));
    print_fidelity("Choi fidelity", report.fidelity);
}
