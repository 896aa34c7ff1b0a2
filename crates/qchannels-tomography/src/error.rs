//! Error handling for tomography runs.

use qchannels_hal::HalError;
use qchannels_ir::IrError;
use qchannels_theory::TheoryError;
use thiserror::Error;

/// Result type for tomography operations.
pub type TomographyResult<T> = Result<T, TomographyError>;

/// Errors that can occur while expanding, dispatching or fitting a batch.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TomographyError {
    /// Two input circuits share a name, so their results cannot be told apart.
    #[error("Duplicate circuit name '{name}' in tomography batch")]
    DuplicateName { name: String },

    /// Returned results do not line up with the dispatched circuits.
    #[error("Cannot reassemble results: {0}")]
    Reassembly(String),

    /// A chunk failed on the backend. `chunk` counts from zero.
    #[error("Backend failed on chunk {chunk}: {source}")]
    Backend {
        chunk: usize,
        #[source]
        source: HalError,
    },

    /// The backend could not be constructed.
    #[error("Backend setup failed: {0}")]
    Setup(#[from] HalError),

    /// Counts could not be turned into a state.
    #[error("Fit failed: {0}")]
    Fit(String),

    /// The measurement qubit list is unusable.
    #[error("Invalid measurement qubits: {0}")]
    InvalidQubits(String),

    /// Numerical error.
    #[error(transparent)]
    Theory(#[from] TheoryError),

    /// Circuit builder error.
    #[error(transparent)]
    Ir(#[from] IrError),
}
