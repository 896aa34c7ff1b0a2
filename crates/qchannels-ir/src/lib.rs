//! Circuit representation for qchannels.
//!
//! Channel experiments are small, fixed gate sequences that get cloned,
//! concatenated and extended with measurement suffixes. The IR is therefore
//! a flat, validated instruction list rather than a graph.
//!
//! # Example: Preparing and measuring a qutrit basis state
//!
//! ```rust
//! use qchannels_ir::{Circuit, ClbitId, QubitId};
//!
//! let mut circuit = Circuit::with_size("rho_B0", 4, 0);
//! circuit.h(QubitId(0)).unwrap();
//!
//! let mut suffix = Circuit::with_size("suffix", 4, 1);
//! suffix.measure(QubitId(0), ClbitId(0)).unwrap();
//!
//! circuit.append(&suffix).unwrap();
//! assert_eq!(circuit.num_clbits(), 1);
//! assert_eq!(circuit.depth(), 2);
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `Rx`, `Ry`, `Rz`, `P` | 1 | Rotation gates |
//! | `U` | 1 | Universal single-qubit gate U(θ,φ,λ) |
//! | `CX`, `CZ` | 2 | Controlled-X and Controlled-Z |
//! | `Swap` | 2 | SWAP gate |

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use qubit::{ClbitId, QubitId};
