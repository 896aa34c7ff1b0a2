//! Error types for channel construction.

use qchannels_ir::IrError;
use qchannels_theory::TheoryError;
use thiserror::Error;

/// Errors raised while building channel circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChannelError {
    /// Two relative qubits of one channel resolve to the same absolute qubit.
    #[error("Mask sends relative qubits {first} and {second} to the same qubit {absolute}")]
    NonInjectiveMask {
        /// First relative qubit.
        first: u32,
        /// Second relative qubit.
        second: u32,
        /// Shared absolute qubit.
        absolute: u32,
    },

    /// A mask could not be parsed.
    #[error("Invalid mask '{input}': {reason}")]
    InvalidMask {
        /// The rejected text.
        input: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Neither direction of a CNOT is available on the device.
    #[error("Cannot place CNOT {control} -> {target}: qubits are not coupled")]
    Placement {
        /// Requested control qubit.
        control: u32,
        /// Requested target qubit.
        target: u32,
    },

    /// Unknown channel name.
    #[error("Unknown channel '{0}'")]
    UnknownChannel(String),

    /// The channel does not fit the requested experiment layout.
    #[error("Invalid layout: {0}")]
    Layout(String),

    /// The channel has no closed-form prediction.
    #[error("Channel '{0}' has no theory map")]
    NoTheory(String),

    /// Circuit builder error.
    #[error(transparent)]
    Ir(#[from] IrError),

    /// Numerical error.
    #[error(transparent)]
    Theory(#[from] TheoryError),
}

/// Result type for channel construction.
pub type ChannelResult<T> = Result<T, ChannelError>;
