//! Backends the CLI can construct by name.

use qchannels_adapter_sim::SimulatorBackend;
use qchannels_hal::{Backend, BackendConfig, BackendFactory, BackendRegistry};

/// Device descriptors the simulator can emulate, by backend name.
pub const EMULATED_DEVICES: [&str; 2] = ["ibmqx4", "ibmq_16_melbourne"];

/// `simulator` plus one emulator per entry of [`EMULATED_DEVICES`].
pub fn default_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<SimulatorBackend>("simulator");
    for device in EMULATED_DEVICES {
        registry.register_factory(device, move |config: BackendConfig| {
            let config = config.with_extra("device", serde_json::json!(device));
            Ok(Box::new(SimulatorBackend::from_config(config)?) as Box<dyn Backend>)
        });
    }
    registry
}
