//! Backends command implementation.

use anyhow::Result;
use console::style;

use qchannels_cli::config::ExperimentConfig;
use qchannels_cli::registry::default_registry;

/// Execute the backends command.
pub async fn execute(config: &ExperimentConfig) -> Result<()> {
    println!("{} Available backends:\n", style("qchannels").cyan().bold());

    let registry = default_registry();
    for name in registry.available_backends() {
        let mut backend_config = config.backend_config();
        backend_config.name.clone_from(&name);
        let backend = registry.create(&name, backend_config)?;
        let caps = backend.capabilities();
        let available = backend.availability().await?.is_available;

        println!(
            "  {} {} {}",
            if available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(&name).bold(),
            if caps.is_simulator { "(local)" } else { "(emulated)" }
        );
        println!("    Qubits: {}", caps.num_qubits);
        println!("    Max shots: {}", caps.max_shots);
        if let Some(max) = caps.max_experiments {
            println!("    Max experiments per job: {max}");
        }
        println!("    Gates: {}", caps.gate_set.native.join(", "));
        if !caps.topology.is_all_to_all() {
            let edges: Vec<String> = caps
                .topology
                .edges
                .iter()
                .map(|(a, b)| format!("{a}→{b}"))
                .collect();
            println!("    Coupling: {}", edges.join(" "));
        }
        println!();
    }
    Ok(())
}
