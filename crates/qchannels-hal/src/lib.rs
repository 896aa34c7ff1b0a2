//! Backend abstraction for qchannels.
//!
//! Tomography experiments run as batches: hundreds of short circuits,
//! submitted together and answered with one histogram per circuit. This crate
//! defines the contract such a backend fulfils:
//!
//! - the async [`Backend`] trait for submitting batches and collecting results
//! - [`Capabilities`] and [`Topology`] describing qubit count, gates, per-job
//!   limits and (possibly directed) CNOT connectivity
//! - [`ExecutionResult`], [`ExperimentResult`] and [`Counts`] for results
//! - [`BackendRegistry`] for constructing backends by name
//!
//! # Example: running a batch
//!
//! ```ignore
//! use qchannels_hal::Backend;
//! use qchannels_adapter_sim::SimulatorBackend;
//! use qchannels_ir::{Circuit, QubitId, ClbitId};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut plus = Circuit::with_size("plus", 1, 1);
//!     plus.h(QubitId(0))?.measure(QubitId(0), ClbitId(0))?;
//!
//!     let backend = SimulatorBackend::new();
//!     let job_id = backend.submit(&[plus], 1000, None).await?;
//!     let result = backend.wait(&job_id).await?;
//!
//!     let counts = &result.experiments[0].counts;
//!     println!("0: {}, 1: {}", counts.get("0"), counts.get("1"));
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod capability;
pub mod error;
pub mod job;
pub mod registry;
pub mod result;

pub use backend::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, ValidationResult,
    WAIT_MAX_POLLS, WAIT_POLL_INTERVAL,
};
pub use capability::{Capabilities, GateSet, Topology, TopologyKind};
pub use error::{HalError, HalResult};
pub use job::{Job, JobId, JobStatus};
pub use registry::BackendRegistry;
pub use result::{Counts, ExecutionResult, ExperimentResult};
