//! Input bases for process tomography and the change of basis that turns
//! channel outputs on those inputs into a Choi matrix.

use ndarray::{Array2, s};
use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

use crate::channel::ChoiMatrix;
use crate::density::DensityMatrix;
use crate::error::{TheoryError, TheoryResult};
use crate::linalg::{self, Matrix};

/// The nine qutrit states the basis-state experiment prepares.
///
/// Order: `|0>, |1>, |2>`, then `(|a>+|b>)/√2` for `(a, b)` in
/// `(0,1), (0,2), (1,2)`, then `(|a>+i|b>)/√2` for the same pairs.
pub fn qutrit_density_basis() -> Vec<DensityMatrix> {
    let zero = Complex64::new(0.0, 0.0);
    let one = Complex64::new(1.0, 0.0);
    let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
    let ih = Complex64::new(0.0, FRAC_1_SQRT_2);
    let pairs = [(0, 1), (0, 2), (1, 2)];

    let mut states: Vec<[Complex64; 3]> = (0..3)
        .map(|k| {
            let mut v = [zero; 3];
            v[k] = one;
            v
        })
        .collect();
    for phase in [h, ih] {
        for &(a, b) in &pairs {
            let mut v = [zero; 3];
            v[a] = h;
            v[b] = phase;
            states.push(v);
        }
    }

    states
        .iter()
        .map(|v| {
            let m = Array2::from_shape_fn((3, 3), |(i, j)| v[i] * v[j].conj());
            DensityMatrix::from_matrix_unchecked(m)
        })
        .collect()
}

/// Change-of-basis matrix for a complete operator basis `{M_k}` of `d × d`
/// matrices.
///
/// With `ER[d·i + j, k] = M_k[i, j]` the result is `(ER⁻¹)ᵀ`, so that
/// `E_ij = Σ_k T[d·i + j, k] · M_k`.
pub fn tomography_change_of_basis(basis: &[Matrix]) -> TheoryResult<Matrix> {
    let first = basis
        .first()
        .ok_or_else(|| TheoryError::dimension("empty tomography basis", 0, 0))?;
    let d = linalg::ensure_square(first, "tomography basis element")?;
    if basis.len() != d * d {
        return Err(TheoryError::dimension(
            format!("a basis of {d}x{d} matrices needs {} elements, got {}", d * d, basis.len()),
            d,
            d,
        ));
    }
    if let Some(bad) = basis.iter().find(|m| m.dim() != (d, d)) {
        let (rows, cols) = bad.dim();
        return Err(TheoryError::dimension(
            "tomography basis element",
            rows,
            cols,
        ));
    }

    let er = Array2::from_shape_fn((d * d, d * d), |(row, k)| basis[k][[row / d, row % d]]);
    Ok(linalg::inverse(&er)?.t().to_owned())
}

/// Experimental Choi matrix from the channel outputs on each basis element.
///
/// `outputs[k]` is the measured image of basis element `k`. Block `(i, j)`
/// is `Σ_k T[d·i + j, k] · outputs[k]`, scaled by `1/d`.
pub fn choi_from_tomography(
    change_of_basis: &Matrix,
    outputs: &[Matrix],
) -> TheoryResult<ChoiMatrix> {
    let n = linalg::ensure_square(change_of_basis, "change of basis")?;
    if outputs.len() != n {
        return Err(TheoryError::dimension(
            format!("{} channel outputs for a change of basis", outputs.len()),
            n,
            n,
        ));
    }
    let d = linalg::bipartite_dim(change_of_basis, "change of basis")?;
    if let Some(bad) = outputs.iter().find(|m| m.dim() != (d, d)) {
        let (rows, cols) = bad.dim();
        return Err(TheoryError::dimension("channel output", rows, cols));
    }

    let mut choi = Matrix::zeros((n, n));
    let norm = d as f64;
    for i in 0..d {
        for j in 0..d {
            let block = outputs
                .iter()
                .enumerate()
                .fold(Matrix::zeros((d, d)), |acc, (k, out)| {
                    acc + out.mapv(|z| z * change_of_basis[[d * i + j, k]])
                });
            choi.slice_mut(s![i * d..(i + 1) * d, j * d..(j + 1) * d])
                .assign(&block.mapv(|z| z / norm));
        }
    }
    ChoiMatrix::from_matrix(choi)
}
