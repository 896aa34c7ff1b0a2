//! Batched state tomography for qchannels.
//!
//! Given circuits and the qubits to reconstruct, the [`Launcher`] appends a
//! Pauli measurement suffix for every setting in `{X, Y, Z}^k`, sends the
//! resulting circuits to a backend in chunks the device accepts, and fits
//! one density matrix per input circuit from the returned counts.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use qchannels_adapter_sim::SimulatorBackend;
//! use qchannels_ir::{Circuit, QubitId};
//! use qchannels_tomography::{Launcher, LauncherConfig};
//!
//! let mut plus = Circuit::with_size("plus", 1, 0);
//! plus.h(QubitId(0))?;
//!
//! let launcher = Launcher::new(Arc::new(SimulatorBackend::new()), LauncherConfig::default());
//! let states = launcher.run(&[plus], &[0]).await?;
//! println!("{:?}", states[0].as_matrix());
//! ```

pub mod circuits;
pub mod error;
pub mod fitter;
pub mod launcher;
pub mod settings;

pub use circuits::{measurement_circuit_name, measurement_circuits};
pub use error::{TomographyError, TomographyResult};
pub use fitter::{LinearInversionFitter, TomographyFitter, project_to_state};
pub use launcher::{
    LaunchPhase, Launcher, LauncherConfig, MAX_JOBS_PER_CHUNK, SIMULATOR_CHUNK_SIZE,
};
pub use settings::{MeasurementBasis, MeasurementSetting, measurement_settings};
