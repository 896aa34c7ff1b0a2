//! Closed-form predictions for the channels with known action.

use std::fmt;
use std::sync::Arc;

use ndarray::array;
use num_complex::Complex64;
use qchannels_theory::linalg::{self, Matrix};
use qchannels_theory::{QuantumChannel, TheoryError, TheoryResult};

type MapFn = dyn Fn(&Matrix) -> Matrix + Send + Sync;

/// A channel's predicted action on `dim × dim` density matrices.
#[derive(Clone)]
pub struct TheoryChannel {
    dim: usize,
    map: Arc<MapFn>,
}

impl TheoryChannel {
    pub fn new(dim: usize, map: impl Fn(&Matrix) -> Matrix + Send + Sync + 'static) -> Self {
        Self {
            dim,
            map: Arc::new(map),
        }
    }

    /// `ρ ↦ UρU†`.
    pub fn unitary(u: Matrix) -> Self {
        Self::new(u.nrows(), linalg::unitary_channel(u))
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `second ∘ self`, or `None` when the dimensions differ.
    pub fn then(&self, second: &TheoryChannel) -> Option<TheoryChannel> {
        if self.dim != second.dim {
            return None;
        }
        let (a, b) = (Arc::clone(&self.map), Arc::clone(&second.map));
        Some(Self::new(self.dim, move |rho: &Matrix| b(&a(rho))))
    }
}

impl QuantumChannel for TheoryChannel {
    fn apply(&self, rho: &Matrix) -> TheoryResult<Matrix> {
        if rho.dim() != (self.dim, self.dim) {
            let (rows, cols) = rho.dim();
            return Err(TheoryError::Dimension {
                context: format!("input to a {}-dimensional channel", self.dim),
                rows,
                cols,
            });
        }
        Ok((self.map)(rho))
    }
}

impl fmt::Debug for TheoryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TheoryChannel").field("dim", &self.dim).finish_non_exhaustive()
    }
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// The Hadamard matrix.
pub fn hadamard_matrix() -> Matrix {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    linalg::real_matrix([[s, s], [s, -s]])
}

/// Spin-1 operators `(Jx, Jy, Jz)`.
fn spin_one() -> (Matrix, Matrix, Matrix) {
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let jx = linalg::real_matrix([[0.0, s, 0.0], [s, 0.0, s], [0.0, s, 0.0]]);
    let jy = array![
        [c(0.0, 0.0), c(0.0, -s), c(0.0, 0.0)],
        [c(0.0, s), c(0.0, 0.0), c(0.0, -s)],
        [c(0.0, 0.0), c(0.0, s), c(0.0, 0.0)],
    ];
    let jz = linalg::real_matrix([[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, -1.0]]);
    (jx, jy, jz)
}

/// The Landau–Streater channel on a qutrit.
///
/// The spin-1 map `ρ ↦ (JxρJx + JyρJy + JzρJz)/2` is written in the basis
/// `|−1⟩, |0⟩, |1⟩`; the circuit encodes `|0⟩ ↦ spin +1`, so the map is
/// conjugated by the anti-diagonal swap on both sides.
pub fn landau_streater(rho: &Matrix) -> Matrix {
    let (jx, jy, jz) = spin_one();
    let swap = linalg::real_matrix([[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]]);
    let r = swap.dot(rho).dot(&swap);
    let sum = jx.dot(&r).dot(&jx) + jy.dot(&r).dot(&jy) + jz.dot(&r).dot(&jz);
    swap.dot(&sum).dot(&swap).mapv(|v| v / 2.0)
}

/// The Werner–Holevo channel `ρ ↦ (I·tr ρ − ρᵀ)/(d − 1)`.
pub fn werner_holevo(rho: &Matrix) -> Matrix {
    let d = rho.nrows();
    let tr = linalg::trace(rho);
    let scaled = linalg::identity(d).mapv(|v| v * tr) - rho.t();
    scaled.mapv(|v| v / (d as f64 - 1.0))
}
