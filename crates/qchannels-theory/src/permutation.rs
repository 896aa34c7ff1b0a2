//! Reordering of measured qubits.
//!
//! Tomography always measures qubits in ascending index order. When the
//! caller asked for a different order the reconstructed state has its tensor
//! factors permuted; [`PermutationCorrection`] undoes that.

use num_complex::Complex64;
use std::collections::BTreeSet;

use crate::error::{TheoryError, TheoryResult};
use crate::linalg::{self, Matrix};

/// The sorted measurement order and the permutation back to the requested
/// order.
///
/// The matrix `S` maps a state vector laid out in requested order onto the
/// sorted layout: `S · v_requested = v_sorted`.
#[derive(Debug, Clone, PartialEq)]
pub struct PermutationCorrection {
    requested: Vec<u32>,
    sorted: Vec<u32>,
    matrix: Matrix,
}

/// Swap bits `i` and `j` of `index`.
fn swap_bits(index: usize, i: usize, j: usize) -> usize {
    let bi = (index >> i) & 1;
    let bj = (index >> j) & 1;
    if bi == bj {
        index
    } else {
        index ^ ((1 << i) | (1 << j))
    }
}

/// Bubble-sort `qubits`, recording each adjacent transposition as a
/// permutation of the `2^k`-dimensional state space.
pub fn sort_with_permutation(qubits: &[u32]) -> TheoryResult<PermutationCorrection> {
    let k = qubits.len();
    if k == 0 {
        return Err(TheoryError::dimension("empty measurement qubit list", 0, 0));
    }
    let distinct: BTreeSet<u32> = qubits.iter().copied().collect();
    if distinct.len() != k {
        return Err(TheoryError::dimension(
            format!("duplicate qubit in measurement list {qubits:?}"),
            k,
            distinct.len(),
        ));
    }

    let dim = 1usize << k;
    let mut sorted = qubits.to_vec();
    let mut s = linalg::identity(dim);
    let one = Complex64::new(1.0, 0.0);

    for pass in 0..k {
        for j in 0..k - 1 - pass {
            if sorted[j] > sorted[j + 1] {
                sorted.swap(j, j + 1);
                let mut p = Matrix::zeros((dim, dim));
                for idx in 0..dim {
                    p[[swap_bits(idx, j, j + 1), idx]] = one;
                }
                s = p.dot(&s);
            }
        }
    }

    Ok(PermutationCorrection {
        requested: qubits.to_vec(),
        sorted,
        matrix: s,
    })
}

impl PermutationCorrection {
    pub fn requested(&self) -> &[u32] {
        &self.requested
    }

    /// Ascending measurement order.
    pub fn sorted(&self) -> &[u32] {
        &self.sorted
    }

    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Whether the requested order was already ascending.
    pub fn is_identity(&self) -> bool {
        self.requested == self.sorted
    }

    /// Map a state reconstructed in sorted order to the requested order:
    /// `S⁻¹ · ρ · S`, with `S⁻¹ = Sᵀ` for a permutation.
    pub fn correct(&self, rho_sorted: &Matrix) -> TheoryResult<Matrix> {
        let dim = self.matrix.nrows();
        if rho_sorted.dim() != (dim, dim) {
            let (rows, cols) = rho_sorted.dim();
            return Err(TheoryError::dimension(
                format!("state for {} measured qubits", self.requested.len()),
                rows,
                cols,
            ));
        }
        Ok(self.matrix.t().dot(rho_sorted).dot(&self.matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_bits() {
        assert_eq!(swap_bits(0b01, 0, 1), 0b10);
        assert_eq!(swap_bits(0b11, 0, 1), 0b11);
        assert_eq!(swap_bits(0b100, 0, 2), 0b001);
    }

    #[test]
    fn test_sorted_input_is_identity() {
        let corr = sort_with_permutation(&[1, 4, 7]).unwrap();
        assert!(corr.is_identity());
        assert_eq!(corr.matrix(), &linalg::identity(8));
    }

    #[test]
    fn test_two_qubit_swap() {
        let corr = sort_with_permutation(&[3, 0]).unwrap();
        assert_eq!(corr.sorted(), &[0, 3]);
        assert_eq!(corr.requested(), &[3, 0]);
        // |01> and |10> trade places
        assert_eq!(corr.matrix()[[1, 2]], Complex64::new(1.0, 0.0));
        assert_eq!(corr.matrix()[[2, 1]], Complex64::new(1.0, 0.0));
        assert_eq!(corr.matrix()[[0, 0]], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_three_qubit_rotation() {
        let corr = sort_with_permutation(&[2, 0, 1]).unwrap();
        assert_eq!(corr.sorted(), &[0, 1, 2]);

        // requested bit p is qubit [2, 0, 1][p]; sorted bit p is qubit p
        let one = Complex64::new(1.0, 0.0);
        let s = corr.matrix();
        assert_eq!(s[[4, 1]], one);
        assert_eq!(s[[1, 2]], one);
        assert_eq!(s[[2, 4]], one);
        assert_eq!(s[[0, 0]], one);
        assert_eq!(s[[7, 7]], one);
        assert!(linalg::approx_eq(&s.t().dot(s), &linalg::identity(8), 1e-12));
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(
            sort_with_permutation(&[]).unwrap_err(),
            TheoryError::Dimension { .. }
        ));
        assert!(sort_with_permutation(&[2, 2]).is_err());
    }

    #[test]
    fn test_correct_rejects_wrong_size() {
        let corr = sort_with_permutation(&[1, 0]).unwrap();
        assert!(corr.correct(&linalg::identity(2)).is_err());
    }
}
