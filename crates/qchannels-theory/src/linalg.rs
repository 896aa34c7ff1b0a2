//! Dense complex linear algebra on `ndarray` matrices.
//!
//! Matrices are `ndarray` arrays so that index conventions stay explicit.
//! Decompositions (Hermitian eigensolve, LU inverse) go through `faer`,
//! converting at the boundary.

use faer::linalg::solvers::DenseSolveCore;
use faer::{Mat, MatRef, Side, c64};
use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{TheoryError, TheoryResult};

/// Dense complex matrix.
pub type Matrix = Array2<Complex64>;

/// Eigenvalues below `-NEGATIVE_EIGENVALUE_TOLERANCE` (scaled by the largest
/// magnitude eigenvalue, at least 1) mean the matrix is not PSD.
pub const NEGATIVE_EIGENVALUE_TOLERANCE: f64 = 1e-8;

const INVERSE_RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Which factor of a bipartite `d ⊗ d` system survives a partial trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepHalf {
    /// Keep the factor addressed by the high index digit.
    First,
    /// Keep the factor addressed by the low index digit.
    Second,
}

/// `n × n` identity.
pub fn identity(n: usize) -> Matrix {
    Array2::eye(n)
}

/// Kronecker product `a ⊗ b`.
pub fn kron(a: &Matrix, b: &Matrix) -> Matrix {
    let (p, q) = b.dim();
    let (m, n) = a.dim();
    Array2::from_shape_fn((m * p, n * q), |(i, j)| a[[i / p, j / q]] * b[[i % p, j % q]])
}

/// Conjugate transpose.
pub fn dagger(m: &Matrix) -> Matrix {
    m.t().mapv(|z| z.conj())
}

/// Sum of the diagonal.
pub fn trace(m: &Matrix) -> Complex64 {
    m.diag().sum()
}

/// `ρ ↦ K ρ K†`.
pub fn unitary_channel(k: Matrix) -> impl Fn(&Matrix) -> Matrix + Clone + Send + Sync {
    let k_dag = dagger(&k);
    move |rho: &Matrix| k.dot(rho).dot(&k_dag)
}

/// Element-wise comparison with absolute tolerance. Shapes must agree.
pub fn approx_eq(a: &Matrix, b: &Matrix, tol: f64) -> bool {
    a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).norm() <= tol)
}

/// `m == m†` within `tol`.
pub fn is_hermitian(m: &Matrix, tol: f64) -> bool {
    let (rows, cols) = m.dim();
    rows == cols
        && (0..rows).all(|i| (i..cols).all(|j| (m[[i, j]] - m[[j, i]].conj()).norm() <= tol))
}

/// Side length of a square matrix, or a `Dimension` error.
pub fn ensure_square(m: &Matrix, context: &str) -> TheoryResult<usize> {
    let (rows, cols) = m.dim();
    if rows != cols || rows == 0 {
        return Err(TheoryError::dimension(context, rows, cols));
    }
    Ok(rows)
}

/// Side `d` of the factors of a square `d² × d²` matrix.
pub fn bipartite_dim(m: &Matrix, context: &str) -> TheoryResult<usize> {
    let n = ensure_square(m, context)?;
    let d = (n as f64).sqrt().round() as usize;
    if d * d != n {
        let (rows, cols) = m.dim();
        return Err(TheoryError::dimension(
            format!("{context}: side is not a perfect square"),
            rows,
            cols,
        ));
    }
    Ok(d)
}

/// Eigendecomposition of a Hermitian matrix.
///
/// Returns eigenvalues in ascending order and the unitary whose columns are
/// the matching eigenvectors, so that `m = V · diag(λ) · V†`. Only the lower
/// triangle of `m` is read.
pub fn eigh(m: &Matrix) -> TheoryResult<(Vec<f64>, Matrix)> {
    let n = ensure_square(m, "eigh")?;
    let evd = to_faer(m)
        .self_adjoint_eigen(Side::Lower)
        .map_err(|e| TheoryError::numerical(format!("eigendecomposition failed: {e:?}"), m))?;
    let s = evd.S().column_vector();
    let u = evd.U();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| s[i].re.total_cmp(&s[j].re));
    let values = order.iter().map(|&i| s[i].re).collect();
    let vectors = Array2::from_shape_fn((n, n), |(r, c)| u[(r, order[c])]);
    Ok((values, vectors))
}

/// Eigenvalues of a Hermitian matrix in ascending order.
pub fn eigvalsh(m: &Matrix) -> TheoryResult<Vec<f64>> {
    ensure_square(m, "eigvalsh")?;
    let mut values = to_faer(m)
        .self_adjoint_eigenvalues(Side::Lower)
        .map_err(|e| TheoryError::numerical(format!("eigenvalue solve failed: {e:?}"), m))?;
    values.sort_by(f64::total_cmp);
    Ok(values)
}

fn to_faer(m: &Matrix) -> Mat<c64> {
    Mat::from_fn(m.nrows(), m.ncols(), |i, j| m[[i, j]])
}

fn from_faer(m: MatRef<'_, c64>) -> Matrix {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Principal square root of a Hermitian positive semi-definite matrix.
///
/// Slightly negative eigenvalues from rounding are clipped to zero; anything
/// more negative than the tolerance is rejected.
pub fn matrix_sqrt(m: &Matrix) -> TheoryResult<Matrix> {
    let (values, vectors) = eigh(m)?;
    let largest = values.iter().fold(1.0_f64, |acc, l| acc.max(l.abs()));
    if let Some(&min) = values.first() {
        if min < -NEGATIVE_EIGENVALUE_TOLERANCE * largest {
            return Err(TheoryError::numerical(
                format!("matrix is not positive semi-definite (eigenvalue {min:e})"),
                m,
            ));
        }
    }
    let roots: Vec<f64> = values.iter().map(|l| l.max(0.0).sqrt()).collect();
    Ok(reconstruct(&roots, &vectors))
}

/// `V · diag(λ) · V†`.
pub fn reconstruct(values: &[f64], vectors: &Matrix) -> Matrix {
    let n = vectors.nrows();
    Array2::from_shape_fn((n, n), |(i, j)| {
        values
            .iter()
            .enumerate()
            .map(|(k, &l)| vectors[[i, k]] * vectors[[j, k]].conj() * l)
            .sum()
    })
}

/// Partial trace of a `d² × d²` matrix over one factor of `d ⊗ d`.
///
/// Row index `i·d + k` addresses the first factor with `i` and the second
/// with `k`.
pub fn partial_trace(m: &Matrix, keep: KeepHalf) -> TheoryResult<Matrix> {
    let d = bipartite_dim(m, "partial_trace")?;
    let out: Matrix = Array2::from_shape_fn((d, d), |(i, j)| {
        (0..d)
            .map(|k| match keep {
                KeepHalf::First => m[[i * d + k, j * d + k]],
                KeepHalf::Second => m[[i + k * d, j + k * d]],
            })
            .sum()
    });
    Ok(out)
}

/// Matrix inverse from a partial-pivoting LU factorization.
///
/// A singular input shows up as non-finite entries or as an inverse that
/// fails `m · m⁻¹ ≈ I`; both are reported as `Numerical`.
pub fn inverse(m: &Matrix) -> TheoryResult<Matrix> {
    let n = ensure_square(m, "inverse")?;
    let inv = from_faer(to_faer(m).partial_piv_lu().inverse().as_ref());

    let finite = inv.iter().all(|z| z.re.is_finite() && z.im.is_finite());
    if !finite || !approx_eq(&m.dot(&inv), &identity(n), INVERSE_RESIDUAL_TOLERANCE * n as f64) {
        return Err(TheoryError::numerical("matrix is singular", m));
    }
    Ok(inv)
}

/// Drop the listed rows and the same columns.
pub fn remove_indices(m: &Matrix, indices: &[usize]) -> Matrix {
    let keep: Vec<usize> = (0..m.nrows()).filter(|i| !indices.contains(i)).collect();
    Array2::from_shape_fn((keep.len(), keep.len()), |(i, j)| m[[keep[i], keep[j]]])
}

/// `U(θ, φ, λ)` as a 2×2 matrix.
pub fn u3(theta: f64, phi: f64, lambda: f64) -> Matrix {
    let (s, c) = (theta / 2.0).sin_cos();
    ndarray::array![
        [Complex64::new(c, 0.0), -Complex64::cis(lambda) * s],
        [Complex64::cis(phi) * s, Complex64::cis(phi + lambda) * c],
    ]
}

/// Build a matrix from real entries.
pub fn real_matrix<const N: usize>(rows: [[f64; N]; N]) -> Matrix {
    Array2::from_shape_fn((N, N), |(i, j)| Complex64::new(rows[i][j], 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_kron_dimensions_and_layout() {
        let a = real_matrix([[1.0, 2.0], [3.0, 4.0]]);
        let b = identity(2);
        let k = kron(&a, &b);
        assert_eq!(k.dim(), (4, 4));
        assert_eq!(k[[0, 2]], c(2.0, 0.0));
        assert_eq!(k[[3, 1]], c(3.0, 0.0));
        assert_eq!(k[[1, 2]], c(0.0, 0.0));
    }

    #[test]
    fn test_eigh_diagonalizes_pauli_y() {
        let y = array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]];
        let (values, vectors) = eigh(&y).unwrap();
        assert!((values[0] + 1.0).abs() < 1e-12);
        assert!((values[1] - 1.0).abs() < 1e-12);
        assert!(approx_eq(&reconstruct(&values, &vectors), &y, 1e-12));
    }

    #[test]
    fn test_eigh_handles_zero_and_diagonal() {
        let (values, _) = eigh(&Matrix::zeros((3, 3))).unwrap();
        assert!(values.iter().all(|v| v.abs() < 1e-15));

        let d = real_matrix([[3.0, 0.0], [0.0, -2.0]]);
        let (values, _) = eigh(&d).unwrap();
        assert!((values[0] + 2.0).abs() < 1e-12 && (values[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_eigvalsh_matches_eigh() {
        let m = array![
            [c(2.0, 0.0), c(0.5, -0.5), c(0.0, 1.0)],
            [c(0.5, 0.5), c(1.0, 0.0), c(0.25, 0.0)],
            [c(0.0, -1.0), c(0.25, 0.0), c(-1.0, 0.0)],
        ];
        let (values, vectors) = eigh(&m).unwrap();
        let only = eigvalsh(&m).unwrap();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        for (a, b) in values.iter().zip(&only) {
            assert!((a - b).abs() < 1e-10);
        }
        assert!(approx_eq(&reconstruct(&values, &vectors), &m, 1e-10));
        assert!(approx_eq(&dagger(&vectors).dot(&vectors), &identity(3), 1e-10));
    }

    #[test]
    fn test_unitary_channel_conjugates() {
        let x = real_matrix([[0.0, 1.0], [1.0, 0.0]]);
        let flip = unitary_channel(x);
        let zero = real_matrix([[1.0, 0.0], [0.0, 0.0]]);
        assert_eq!(flip(&zero), real_matrix([[0.0, 0.0], [0.0, 1.0]]));
    }

    #[test]
    fn test_matrix_sqrt_squares_back() {
        let m = real_matrix([[2.0, 1.0], [1.0, 2.0]]);
        let r = matrix_sqrt(&m).unwrap();
        assert!(approx_eq(&r.dot(&r), &m, 1e-12));
    }

    #[test]
    fn test_matrix_sqrt_rejects_negative() {
        let m = real_matrix([[1.0, 0.0], [0.0, -0.5]]);
        let err = matrix_sqrt(&m).unwrap_err();
        assert!(matches!(err, TheoryError::Numerical { .. }));
    }

    #[test]
    fn test_matrix_sqrt_clips_rounding_noise() {
        let m = real_matrix([[1.0, 0.0], [0.0, -1e-12]]);
        let r = matrix_sqrt(&m).unwrap();
        assert!((r[[1, 1]].re).abs() < 1e-12);
    }

    #[test]
    fn test_partial_trace_rejects_non_square_side() {
        let err = partial_trace(&Matrix::zeros((3, 3)), KeepHalf::First).unwrap_err();
        assert!(matches!(err, TheoryError::Dimension { rows: 3, .. }));

        let err = partial_trace(&Matrix::zeros((4, 2)), KeepHalf::Second).unwrap_err();
        assert!(matches!(err, TheoryError::Dimension { cols: 2, .. }));
    }

    #[test]
    fn test_inverse() {
        let m = array![[c(1.0, 0.0), c(0.0, 1.0)], [c(2.0, 0.0), c(0.0, 0.0)]];
        let inv = inverse(&m).unwrap();
        assert!(approx_eq(&m.dot(&inv), &identity(2), 1e-12));

        let singular = real_matrix([[1.0, 2.0], [2.0, 4.0]]);
        assert!(matches!(
            inverse(&singular).unwrap_err(),
            TheoryError::Numerical { .. }
        ));
    }

    #[test]
    fn test_remove_indices() {
        let m = Array2::from_shape_fn((4, 4), |(i, j)| c((i * 4 + j) as f64, 0.0));
        let r = remove_indices(&m, &[1, 3]);
        assert_eq!(r, array![[c(0.0, 0.0), c(2.0, 0.0)], [c(8.0, 0.0), c(10.0, 0.0)]]);
    }

    #[test]
    fn test_u3_is_unitary() {
        let u = u3(0.7, -1.2, 2.5);
        assert!(approx_eq(&u.dot(&dagger(&u)), &identity(2), 1e-12));
    }

    #[test]
    fn test_is_hermitian() {
        let h = array![[c(1.0, 0.0), c(0.0, 1.0)], [c(0.0, -1.0), c(2.0, 0.0)]];
        assert!(is_hermitian(&h, 1e-12));
        assert!(!is_hermitian(&dagger(&h).mapv(|z| z * c(0.0, 1.0)), 1e-12));
    }
}
