//! Pauli measurement settings.

use std::fmt;

/// Basis a single qubit is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementBasis {
    X,
    Y,
    Z,
}

impl MeasurementBasis {
    pub const ALL: [MeasurementBasis; 3] = [MeasurementBasis::X, MeasurementBasis::Y, MeasurementBasis::Z];

    pub fn label(self) -> char {
        match self {
            MeasurementBasis::X => 'X',
            MeasurementBasis::Y => 'Y',
            MeasurementBasis::Z => 'Z',
        }
    }
}

/// One basis per measured qubit, indexed like the sorted qubit list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MeasurementSetting(Vec<MeasurementBasis>);

impl MeasurementSetting {
    pub fn new(bases: Vec<MeasurementBasis>) -> Self {
        Self(bases)
    }

    pub fn bases(&self) -> &[MeasurementBasis] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `"XYZ"`-style label, first qubit first.
    pub fn label(&self) -> String {
        self.0.iter().map(|b| b.label()).collect()
    }
}

impl fmt::Display for MeasurementSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// All `3^k` settings of `k` qubits, lexicographic over `{X, Y, Z}^k` with
/// the first qubit varying slowest.
pub fn measurement_settings(k: usize) -> Vec<MeasurementSetting> {
    let total = 3usize.pow(k as u32);
    (0..total)
        .map(|mut n| {
            let mut bases = vec![MeasurementBasis::X; k];
            for slot in bases.iter_mut().rev() {
                *slot = MeasurementBasis::ALL[n % 3];
                n /= 3;
            }
            MeasurementSetting(bases)
        })
        .collect()
}
