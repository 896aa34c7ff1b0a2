//! Channel algebra for qchannels.
//!
//! This crate holds the closed-form side of channel tomography:
//!
//! - [`linalg`]: Kronecker products, partial traces, a Hermitian
//!   eigensolver, matrix square roots and inverses on `ndarray` matrices
//! - [`channel`]: the [`QuantumChannel`] trait, Choi matrices, Kraus
//!   decomposition and state fidelity
//! - [`basis`]: the qutrit input basis and the change of basis that turns
//!   measured channel outputs into a Choi matrix
//! - [`permutation`]: reordering reconstructed states when qubits were
//!   measured in sorted rather than requested order
//!
//! # Example: Choi round trip
//!
//! ```rust
//! use qchannels_theory::{build_choi_matrix, channel_from_choi, linalg, QuantumChannel};
//!
//! let flip = linalg::unitary_channel(linalg::real_matrix([[0.0, 1.0], [1.0, 0.0]]));
//! let choi = build_choi_matrix(&flip, 2).unwrap();
//! assert!((choi.trace().re - 1.0).abs() < 1e-12);
//!
//! let rho = linalg::real_matrix([[0.75, 0.25], [0.25, 0.25]]);
//! let rebuilt = channel_from_choi(&choi).apply(&rho).unwrap();
//! assert!(linalg::approx_eq(&rebuilt, &flip(&rho), 1e-12));
//! ```

pub mod basis;
pub mod channel;
pub mod density;
pub mod error;
pub mod linalg;
pub mod permutation;

pub use basis::{choi_from_tomography, qutrit_density_basis, tomography_change_of_basis};
pub use channel::{
    ChoiChannel, ChoiMatrix, KrausChannel, KrausSet, QuantumChannel, build_choi_matrix,
    channel_from_choi, fidelity, kraus_from_choi, kraus_sets_equivalent,
};
pub use density::DensityMatrix;
pub use error::{TheoryError, TheoryResult};
pub use linalg::{KeepHalf, Matrix, matrix_sqrt, partial_trace};
pub use permutation::{PermutationCorrection, sort_with_permutation};
