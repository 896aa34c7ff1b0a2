//! Local statevector simulator for qchannels.
//!
//! Runs each circuit of a batch once on an exact statevector and draws the
//! requested number of shots from the resulting distribution of the
//! classical register. Register bit `c` is clbit `c`, and bitstrings list
//! clbit 0 first.
//!
//! # Sampling
//!
//! | Mode | Counts |
//! |------|--------|
//! | [`SamplingMode::Random`] | independent draws, thread RNG |
//! | [`SamplingMode::Seeded`] | independent draws, reproducible |
//! | [`SamplingMode::Exact`] | `shots · p` rounded by largest remainder |
//!
//! # Device emulation
//!
//! [`SimulatorBackend::emulating`] adopts a hardware descriptor such as
//! `Capabilities::ibmqx4()`: circuits must then fit the device, use its gate
//! set and place every CNOT along a directed coupling edge, and a batch may
//! not exceed the device's experiment limit.
//!
//! # Example
//!
//! ```ignore
//! use qchannels_adapter_sim::{SamplingMode, SimulatorBackend};
//! use qchannels_hal::{Backend, Capabilities};
//!
//! let backend = SimulatorBackend::emulating(Capabilities::ibmqx4())
//!     .with_sampling(SamplingMode::Seeded(7));
//! let job_id = backend.submit(&circuits, 8192, Some(15)).await?;
//! let result = backend.wait(&job_id).await?;
//! ```

mod sampling;
mod simulator;
mod statevector;

pub use sampling::SamplingMode;
pub use simulator::{DEFAULT_MAX_QUBITS, SimulatorBackend};
