//! Validated density matrices.

use ndarray::{Array1, Array2, s};
use num_complex::Complex64;

use crate::error::{TheoryError, TheoryResult};
use crate::linalg::{self, Matrix};

/// Tolerance for the trace and hermiticity checks.
pub const STATE_TOLERANCE: f64 = 1e-6;

/// A Hermitian, trace-one square matrix.
///
/// Positivity is not enforced on construction: linear-inversion tomography
/// can produce slightly negative estimates and those are still meaningful
/// inputs to fidelity and Choi reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityMatrix(Matrix);

impl DensityMatrix {
    /// Validate and wrap a matrix.
    pub fn new(matrix: Matrix) -> TheoryResult<Self> {
        linalg::ensure_square(&matrix, "density matrix")?;
        let tr = linalg::trace(&matrix);
        if (tr - Complex64::new(1.0, 0.0)).norm() > STATE_TOLERANCE {
            return Err(TheoryError::InvalidState(format!(
                "trace is {tr}, expected 1"
            )));
        }
        if !linalg::is_hermitian(&matrix, STATE_TOLERANCE) {
            return Err(TheoryError::InvalidState("matrix is not Hermitian".into()));
        }
        Ok(Self(matrix))
    }

    /// Wrap a matrix already known to be a state.
    pub(crate) fn from_matrix_unchecked(matrix: Matrix) -> Self {
        Self(matrix)
    }

    /// `|ψ><ψ|` for a normalized state vector.
    pub fn from_state(state: &[Complex64]) -> TheoryResult<Self> {
        let psi = Array1::from(state.to_vec());
        let n = psi.len();
        let outer = Array2::from_shape_fn((n, n), |(i, j)| psi[i] * psi[j].conj());
        Self::new(outer)
    }

    /// `|index><index|` in dimension `dim`.
    pub fn basis_state(dim: usize, index: usize) -> TheoryResult<Self> {
        if index >= dim {
            return Err(TheoryError::InvalidState(format!(
                "basis index {index} outside dimension {dim}"
            )));
        }
        let mut m = Matrix::zeros((dim, dim));
        m[[index, index]] = Complex64::new(1.0, 0.0);
        Ok(Self(m))
    }

    /// Dimension `d` of the `d × d` matrix.
    pub fn dim(&self) -> usize {
        self.0.nrows()
    }

    pub fn as_matrix(&self) -> &Matrix {
        &self.0
    }

    pub fn into_inner(self) -> Matrix {
        self.0
    }

    /// Post-select a two-qubit state onto the span of `|00>, |01>, |10>`.
    ///
    /// Returns the top-left 3×3 block divided by its trace.
    pub fn qutrit_block(&self) -> TheoryResult<Self> {
        if self.dim() != 4 {
            return Err(TheoryError::dimension(
                "qutrit block needs a two-qubit state",
                self.dim(),
                self.dim(),
            ));
        }
        let block = self.0.slice(s![..3, ..3]).to_owned();
        let tr = linalg::trace(&block);
        if tr.norm() < STATE_TOLERANCE {
            return Err(TheoryError::numerical(
                "qutrit subspace has no population",
                &self.0,
            ));
        }
        Self::new(block.mapv(|z| z / tr))
    }

    /// Population of the leaked `|11>` level of a two-qubit qutrit encoding.
    pub fn leakage(&self) -> f64 {
        if self.dim() == 4 { self.0[[3, 3]].re } else { 0.0 }
    }
}

impl AsRef<Matrix> for DensityMatrix {
    fn as_ref(&self) -> &Matrix {
        &self.0
    }
}

impl TryFrom<Matrix> for DensityMatrix {
    type Error = TheoryError;

    fn try_from(value: Matrix) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
