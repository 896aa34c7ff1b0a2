//! Channels, Choi matrices, Kraus decompositions and fidelity.
//!
//! Index convention: the Choi matrix of a channel Φ on dimension `d` has
//! block `(i, j)` equal to `Φ(E_ij) / d`, where `E_ij` is the matrix unit.
//! Element `[i·d + a, j·d + b]` is therefore `Φ(E_ij)[a, b] / d` and the
//! trace of the Choi matrix of a trace-preserving channel is one.

use ndarray::{Array2, s};
use num_complex::Complex64;
use tracing::debug;

use crate::error::{TheoryError, TheoryResult};
use crate::linalg::{self, KeepHalf, Matrix};

/// Eigenvalues of a Choi matrix at or below this are treated as zero when
/// extracting Kraus operators.
pub const KRAUS_EIGENVALUE_CUTOFF: f64 = 1e-9;

/// An ordered set of Kraus operators.
pub type KrausSet = Vec<Matrix>;

/// A linear map on square matrices.
pub trait QuantumChannel {
    /// Apply the map to `rho`.
    fn apply(&self, rho: &Matrix) -> TheoryResult<Matrix>;
}

impl<F> QuantumChannel for F
where
    F: Fn(&Matrix) -> Matrix,
{
    fn apply(&self, rho: &Matrix) -> TheoryResult<Matrix> {
        Ok(self(rho))
    }
}

/// A normalized Choi matrix together with its input dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiMatrix {
    matrix: Matrix,
    dim: usize,
}

impl ChoiMatrix {
    /// Wrap a `d² × d²` matrix.
    pub fn from_matrix(matrix: Matrix) -> TheoryResult<Self> {
        let dim = linalg::bipartite_dim(&matrix, "Choi matrix")?;
        Ok(Self { matrix, dim })
    }

    /// Input (and output) dimension `d` of the channel.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn as_matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn into_inner(self) -> Matrix {
        self.matrix
    }

    /// Equals one for trace-preserving channels.
    pub fn trace(&self) -> Complex64 {
        linalg::trace(&self.matrix)
    }

    /// The `d × d` block `(i, j)`, i.e. `Φ(E_ij) / d`.
    pub fn block(&self, i: usize, j: usize) -> Matrix {
        let d = self.dim;
        self.matrix
            .slice(s![i * d..(i + 1) * d, j * d..(j + 1) * d])
            .to_owned()
    }
}

fn matrix_unit(dim: usize, i: usize, j: usize) -> Matrix {
    let mut e = Matrix::zeros((dim, dim));
    e[[i, j]] = Complex64::new(1.0, 0.0);
    e
}

/// Choi matrix of `channel` acting on `dim × dim` matrices.
pub fn build_choi_matrix<C>(channel: &C, dim: usize) -> TheoryResult<ChoiMatrix>
where
    C: QuantumChannel + ?Sized,
{
    let mut choi = Matrix::zeros((dim * dim, dim * dim));
    let norm = dim as f64;
    for i in 0..dim {
        for j in 0..dim {
            let out = channel.apply(&matrix_unit(dim, i, j))?;
            if out.dim() != (dim, dim) {
                let (rows, cols) = out.dim();
                return Err(TheoryError::dimension(
                    format!("channel output for E_{i}{j}"),
                    rows,
                    cols,
                ));
            }
            choi.slice_mut(s![i * dim..(i + 1) * dim, j * dim..(j + 1) * dim])
                .assign(&out.mapv(|z| z / norm));
        }
    }
    Ok(ChoiMatrix { matrix: choi, dim })
}

/// The channel described by a Choi matrix.
#[derive(Debug, Clone)]
pub struct ChoiChannel {
    choi: ChoiMatrix,
}

impl ChoiChannel {
    pub fn dim(&self) -> usize {
        self.choi.dim
    }

    pub fn choi(&self) -> &ChoiMatrix {
        &self.choi
    }
}

impl QuantumChannel for ChoiChannel {
    /// `Φ(ρ) = Tr_1[ d · (ρᵀ ⊗ I) · C ]`.
    fn apply(&self, rho: &Matrix) -> TheoryResult<Matrix> {
        let d = self.choi.dim;
        if rho.dim() != (d, d) {
            let (rows, cols) = rho.dim();
            return Err(TheoryError::dimension(
                format!("input to a dimension-{d} channel"),
                rows,
                cols,
            ));
        }
        let lifted = linalg::kron(&rho.t().to_owned(), &linalg::identity(d));
        let product = lifted.dot(self.choi.as_matrix()).mapv(|z| z * d as f64);
        linalg::partial_trace(&product, KeepHalf::Second)
    }
}

/// Rebuild a channel from its Choi matrix.
pub fn channel_from_choi(choi: &ChoiMatrix) -> ChoiChannel {
    ChoiChannel { choi: choi.clone() }
}

/// Kraus operators of the channel with Choi matrix `choi`.
///
/// Each eigenpair `(λ, v)` with `λ > KRAUS_EIGENVALUE_CUTOFF` contributes
/// `K[a, i] = √(d·λ) · v[i·d + a]`. The order follows the eigensolver.
pub fn kraus_from_choi(choi: &ChoiMatrix) -> TheoryResult<KrausSet> {
    let d = choi.dim;
    let (values, vectors) = linalg::eigh(choi.as_matrix())?;
    let ops: KrausSet = values
        .iter()
        .enumerate()
        .filter(|(_, l)| **l > KRAUS_EIGENVALUE_CUTOFF)
        .map(|(k, &l)| {
            let weight = (d as f64 * l).sqrt();
            Array2::from_shape_fn((d, d), |(a, i)| vectors[[i * d + a, k]] * weight)
        })
        .collect();
    debug!(dim = d, rank = ops.len(), "extracted Kraus operators");
    Ok(ops)
}

/// A channel given by Kraus operators.
#[derive(Debug, Clone)]
pub struct KrausChannel {
    ops: KrausSet,
    dim: usize,
}

impl KrausChannel {
    /// Validate that all operators are square and of the same size.
    pub fn new(ops: KrausSet) -> TheoryResult<Self> {
        let first = ops
            .first()
            .ok_or_else(|| TheoryError::dimension("empty Kraus set", 0, 0))?;
        let dim = linalg::ensure_square(first, "Kraus operator")?;
        if let Some(bad) = ops.iter().find(|k| k.dim() != (dim, dim)) {
            let (rows, cols) = bad.dim();
            return Err(TheoryError::dimension(
                format!("Kraus operator in a dimension-{dim} set"),
                rows,
                cols,
            ));
        }
        Ok(Self { ops, dim })
    }

    /// Decompose a Choi matrix.
    pub fn from_choi(choi: &ChoiMatrix) -> TheoryResult<Self> {
        let ops = kraus_from_choi(choi)?;
        if ops.is_empty() {
            return Err(TheoryError::numerical(
                "Choi matrix has no positive eigenvalues",
                choi.as_matrix(),
            ));
        }
        Self::new(ops)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn operators(&self) -> &[Matrix] {
        &self.ops
    }

    /// `Σ K†K = I` within `tol`.
    pub fn is_trace_preserving(&self, tol: f64) -> bool {
        let sum = self
            .ops
            .iter()
            .fold(Matrix::zeros((self.dim, self.dim)), |acc, k| {
                acc + linalg::dagger(k).dot(k)
            });
        linalg::approx_eq(&sum, &linalg::identity(self.dim), tol)
    }
}

impl QuantumChannel for KrausChannel {
    fn apply(&self, rho: &Matrix) -> TheoryResult<Matrix> {
        if rho.dim() != (self.dim, self.dim) {
            let (rows, cols) = rho.dim();
            return Err(TheoryError::dimension("Kraus channel input", rows, cols));
        }
        Ok(self.ops.iter().fold(Matrix::zeros((self.dim, self.dim)), |acc, k| {
            acc + k.dot(rho).dot(&linalg::dagger(k))
        }))
    }
}

/// Whether `a` equals `b` times a unit-modulus phase.
pub fn equal_up_to_phase(a: &Matrix, b: &Matrix, tol: f64) -> bool {
    if a.dim() != b.dim() {
        return false;
    }
    let Some((idx, pivot)) = a
        .indexed_iter()
        .max_by(|(_, x), (_, y)| x.norm().total_cmp(&y.norm()))
    else {
        return true;
    };
    if pivot.norm() <= tol {
        return b.iter().all(|z| z.norm() <= tol);
    }
    let phase = b[idx] / *pivot;
    if (phase.norm() - 1.0).abs() > tol {
        return false;
    }
    linalg::approx_eq(&a.mapv(|z| z * phase), b, tol)
}

/// Whether two Kraus sets agree up to ordering and a phase per operator.
pub fn kraus_sets_equivalent(a: &[Matrix], b: &[Matrix], tol: f64) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    a.iter().all(|ka| {
        let hit = b
            .iter()
            .enumerate()
            .find(|(i, kb)| !used[*i] && equal_up_to_phase(ka, kb, tol));
        match hit {
            Some((i, _)) => {
                used[i] = true;
                true
            }
            None => false,
        }
    })
}

/// Uhlmann fidelity `(Tr √(√ρ₁ ρ₂ √ρ₁))²`, clipped to `[0, 1]`.
///
/// `rho1` must be positive semi-definite; `rho2` may carry small negative
/// eigenvalues from a tomographic estimate.
pub fn fidelity(rho1: &Matrix, rho2: &Matrix) -> TheoryResult<f64> {
    let d = linalg::ensure_square(rho1, "fidelity first argument")?;
    if rho2.dim() != (d, d) {
        let (rows, cols) = rho2.dim();
        return Err(TheoryError::dimension(
            format!("fidelity against a {d}x{d} state"),
            rows,
            cols,
        ));
    }
    let root = linalg::matrix_sqrt(rho1)?;
    let product = root.dot(rho2).dot(&root);
    let hermitian = (&product + &linalg::dagger(&product)).mapv(|z| z * 0.5);
    let values = linalg::eigvalsh(&hermitian)?;
    let f = values.iter().map(|l| l.max(0.0).sqrt()).sum::<f64>().powi(2);
    Ok(f.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn pauli_x() -> Matrix {
        linalg::real_matrix([[0.0, 1.0], [1.0, 0.0]])
    }

    #[test]
    fn test_choi_of_identity_is_maximally_entangled() {
        let choi = build_choi_matrix(&|rho: &Matrix| rho.clone(), 2).unwrap();
        let expected = linalg::real_matrix([
            [0.5, 0.0, 0.0, 0.5],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0, 0.5],
        ]);
        assert!(linalg::approx_eq(choi.as_matrix(), &expected, 1e-12));
        assert!((choi.trace() - c(1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_choi_block_is_channel_output() {
        let channel = linalg::unitary_channel(pauli_x());
        let choi = build_choi_matrix(&channel, 2).unwrap();
        let e01 = matrix_unit(2, 0, 1);
        let expected = channel(&e01).mapv(|z| z / 2.0);
        assert!(linalg::approx_eq(&choi.block(0, 1), &expected, 1e-12));
    }

    #[test]
    fn test_choi_rejects_wrong_output_shape() {
        let bad = |_: &Matrix| Matrix::zeros((3, 3));
        let err = build_choi_matrix(&bad, 2).unwrap_err();
        assert!(matches!(err, TheoryError::Dimension { rows: 3, .. }));
    }

    #[test]
    fn test_from_matrix_rejects_non_square_side() {
        let err = ChoiMatrix::from_matrix(Matrix::zeros((5, 5))).unwrap_err();
        assert!(matches!(err, TheoryError::Dimension { rows: 5, .. }));
    }

    #[test]
    fn test_choi_channel_rejects_wrong_input() {
        let choi = build_choi_matrix(&|rho: &Matrix| rho.clone(), 2).unwrap();
        let channel = channel_from_choi(&choi);
        assert!(channel.apply(&linalg::identity(3)).is_err());
    }

    #[test]
    fn test_fidelity_of_orthogonal_states_is_zero() {
        let zero = linalg::real_matrix([[1.0, 0.0], [0.0, 0.0]]);
        let one = linalg::real_matrix([[0.0, 0.0], [0.0, 1.0]]);
        assert!(fidelity(&zero, &one).unwrap() < 1e-12);
        assert!((fidelity(&zero, &zero).unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fidelity_dimension_mismatch() {
        let err = fidelity(&linalg::identity(2), &linalg::identity(3)).unwrap_err();
        assert!(matches!(err, TheoryError::Dimension { rows: 3, .. }));
    }

    #[test]
    fn test_equal_up_to_phase() {
        let x = pauli_x();
        let minus_ix = x.mapv(|z| z * c(0.0, -1.0));
        assert!(equal_up_to_phase(&x, &minus_ix, 1e-12));
        assert!(!equal_up_to_phase(&x, &x.mapv(|z| z * 2.0), 1e-12));
        let z = array![[c(1.0, 0.0), c(0.0, 0.0)], [c(0.0, 0.0), c(-1.0, 0.0)]];
        assert!(!equal_up_to_phase(&x, &z, 1e-12));
    }

    #[test]
    fn test_kraus_channel_validation() {
        assert!(KrausChannel::new(vec![]).is_err());
        assert!(KrausChannel::new(vec![linalg::identity(2), linalg::identity(3)]).is_err());
        let ch = KrausChannel::new(vec![pauli_x()]).unwrap();
        assert!(ch.is_trace_preserving(1e-12));
    }
}
