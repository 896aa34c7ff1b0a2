//! Turning measurement counts into a density matrix.

use ndarray::array;
use num_complex::Complex64;
use qchannels_hal::Counts;
use qchannels_theory::DensityMatrix;
use qchannels_theory::linalg::{self, Matrix};
use tracing::{debug, trace};

use crate::error::{TomographyError, TomographyResult};
use crate::settings::{MeasurementBasis, MeasurementSetting};

/// Reconstructs a state from the counts of every measurement setting.
///
/// `counts[i]` belongs to `settings[i]`; bit `j` of an outcome is the
/// result on qubit position `j`.
pub trait TomographyFitter: Send + Sync {
    fn fit(&self, settings: &[MeasurementSetting], counts: &[Counts]) -> TomographyResult<DensityMatrix>;
}

/// Pauli-expectation linear inversion, optionally projected onto the
/// closest physical state.
#[derive(Debug, Clone, Copy)]
pub struct LinearInversionFitter {
    project: bool,
}

impl LinearInversionFitter {
    pub fn new() -> Self {
        Self { project: true }
    }

    /// Return the raw inversion, which may have negative eigenvalues.
    pub fn without_projection() -> Self {
        Self { project: false }
    }

    pub fn projects(&self) -> bool {
        self.project
    }
}

impl Default for LinearInversionFitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-qubit Pauli operator in a Pauli string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pauli {
    I,
    Basis(MeasurementBasis),
}

impl Pauli {
    fn from_digit(d: usize) -> Self {
        match d {
            0 => Pauli::I,
            1 => Pauli::Basis(MeasurementBasis::X),
            2 => Pauli::Basis(MeasurementBasis::Y),
            _ => Pauli::Basis(MeasurementBasis::Z),
        }
    }

    fn matrix(self) -> Matrix {
        let c = |re: f64, im: f64| Complex64::new(re, im);
        match self {
            Pauli::I => linalg::identity(2),
            Pauli::Basis(MeasurementBasis::X) => linalg::real_matrix([[0.0, 1.0], [1.0, 0.0]]),
            Pauli::Basis(MeasurementBasis::Y) => {
                array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]]
            }
            Pauli::Basis(MeasurementBasis::Z) => linalg::real_matrix([[1.0, 0.0], [0.0, -1.0]]),
        }
    }
}

/// Pauli string number `index` over `k` qubits; position 0 is the lowest
/// base-4 digit.
fn pauli_string(index: usize, k: usize) -> Vec<Pauli> {
    (0..k).map(|j| Pauli::from_digit((index >> (2 * j)) & 3)).collect()
}

fn check_inputs(settings: &[MeasurementSetting], counts: &[Counts]) -> TomographyResult<usize> {
    if settings.is_empty() {
        return Err(TomographyError::Fit("no measurement settings".into()));
    }
    if settings.len() != counts.len() {
        return Err(TomographyError::Fit(format!(
            "{} settings but {} count histograms",
            settings.len(),
            counts.len()
        )));
    }
    let k = settings[0].len();
    if k == 0 {
        return Err(TomographyError::Fit("settings measure no qubits".into()));
    }
    for (setting, histogram) in settings.iter().zip(counts) {
        if setting.len() != k {
            return Err(TomographyError::Fit(format!(
                "setting {setting} has {} qubits, expected {k}",
                setting.len()
            )));
        }
        if histogram.total_shots() == 0 {
            return Err(TomographyError::Fit(format!("no shots for setting {setting}")));
        }
        if let Some((outcome, _)) = histogram.iter().find(|(outcome, _)| outcome.len() != k) {
            return Err(TomographyError::Fit(format!(
                "outcome '{outcome}' of setting {setting} is not {k} bits wide"
            )));
        }
    }
    Ok(k)
}

/// `⟨P⟩` estimated from one histogram: the mean of `Π (−1)^{b_j}` over the
/// positions where `P` is not the identity.
fn expectation(pauli: &[Pauli], counts: &Counts) -> f64 {
    let total = counts.total_shots() as f64;
    let signed: f64 = counts
        .iter()
        .map(|(outcome, n)| {
            let ones = outcome
                .bytes()
                .zip(pauli)
                .filter(|&(bit, p)| bit == b'1' && *p != Pauli::I)
                .count();
            if ones % 2 == 0 { n as f64 } else { -(n as f64) }
        })
        .sum();
    signed / total
}

impl TomographyFitter for LinearInversionFitter {
    fn fit(&self, settings: &[MeasurementSetting], counts: &[Counts]) -> TomographyResult<DensityMatrix> {
        let k = check_inputs(settings, counts)?;
        let dim = 1usize << k;
        let mut rho = Matrix::zeros((dim, dim));

        for index in 0..4usize.pow(k as u32) {
            let pauli = pauli_string(index, k);
            let compatible: Vec<f64> = settings
                .iter()
                .zip(counts)
                .filter(|(setting, _)| {
                    pauli
                        .iter()
                        .zip(setting.bases())
                        .all(|(p, b)| matches!(p, Pauli::I) || *p == Pauli::Basis(*b))
                })
                .map(|(_, histogram)| expectation(&pauli, histogram))
                .collect();
            if compatible.is_empty() {
                return Err(TomographyError::Fit(format!(
                    "no setting measures Pauli string {index} of {k} qubits"
                )));
            }
            let mean = compatible.iter().sum::<f64>() / compatible.len() as f64;
            if mean == 0.0 {
                continue;
            }

            let operator = pauli
                .iter()
                .rev()
                .fold(linalg::identity(1), |acc, p| linalg::kron(&acc, &p.matrix()));
            rho.scaled_add(Complex64::new(mean / dim as f64, 0.0), &operator);
        }

        let rho = if self.project { project_to_state(&rho)? } else { rho };
        debug!(qubits = k, projected = self.project, "fitted state");
        Ok(DensityMatrix::new(rho)?)
    }
}

/// Closest density matrix (in the 2-norm) to a trace-one Hermitian matrix:
/// negative eigenvalues are zeroed and their weight spread over the rest.
pub fn project_to_state(rho: &Matrix) -> TomographyResult<Matrix> {
    let (mut values, vectors) = linalg::eigh(rho)?;
    let d = values.len();

    // Ascending order, so the most negative eigenvalues come first.
    let mut carried = 0.0;
    let mut remaining = d;
    for value in values.iter_mut() {
        if *value + carried / remaining as f64 >= 0.0 {
            break;
        }
        carried += *value;
        *value = 0.0;
        remaining -= 1;
        if remaining == 0 {
            return Err(TomographyError::Fit(
                "matrix has no positive weight to project onto".into(),
            ));
        }
    }
    if remaining < d {
        trace!(zeroed = d - remaining, "projected out negative eigenvalues");
        let shift = carried / remaining as f64;
        for value in &mut values[d - remaining..] {
            *value += shift;
        }
    }
    Ok(linalg::reconstruct(&values, &vectors))
}
