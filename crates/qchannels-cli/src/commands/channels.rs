//! Channels command implementation.

use console::style;

use qchannels_channels::ChannelName;

/// Execute the channels command.
pub fn execute() {
    println!("{} Channels:\n", style("qchannels").cyan().bold());

    for name in ChannelName::ALL {
        let channel = name.channel();
        let theory = match channel.theory() {
            Some(t) => format!("dim {}", t.dim()),
            None => "none".into(),
        };
        println!("  {}", style(name).bold());
        println!("    {}", name.description());
        println!("    System qubits: {:?}", channel.system_qubits());
        if !channel.env_qubits().is_empty() {
            println!("    Environment qubits: {:?}", channel.env_qubits());
        }
        println!("    Theory: {theory}");
        println!();
    }
}
