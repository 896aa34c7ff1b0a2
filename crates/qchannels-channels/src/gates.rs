//! Layers of independent single-qubit `u3` rotations.

use std::collections::BTreeMap;

use qchannels_ir::{Circuit, QubitId};
use qchannels_theory::linalg::{self, Matrix};

use crate::error::ChannelResult;
use crate::mask::QubitMask;

/// One `u3(θ, φ, λ)` per relative qubit. Angles without an entry are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneQubitGates {
    theta: BTreeMap<u32, f64>,
    phi: BTreeMap<u32, f64>,
    lambda: BTreeMap<u32, f64>,
}

impl OneQubitGates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theta(mut self, qubit: u32, theta: f64) -> Self {
        self.theta.insert(qubit, theta);
        self
    }

    pub fn with_phi(mut self, qubit: u32, phi: f64) -> Self {
        self.phi.insert(qubit, phi);
        self
    }

    pub fn with_lambda(mut self, qubit: u32, lambda: f64) -> Self {
        self.lambda.insert(qubit, lambda);
        self
    }

    /// Set all three angles of one qubit.
    pub fn with_u3(self, qubit: u32, theta: f64, phi: f64, lambda: f64) -> Self {
        self.with_theta(qubit, theta)
            .with_phi(qubit, phi)
            .with_lambda(qubit, lambda)
    }

    /// Angles `(θ, φ, λ)` of a relative qubit.
    pub fn angles(&self, qubit: u32) -> (f64, f64, f64) {
        let get = |m: &BTreeMap<u32, f64>| m.get(&qubit).copied().unwrap_or(0.0);
        (get(&self.theta), get(&self.phi), get(&self.lambda))
    }

    /// Whether no angle is set at all.
    pub fn is_empty(&self) -> bool {
        self.theta.is_empty() && self.phi.is_empty() && self.lambda.is_empty()
    }

    /// Relative qubits with any angle set, ascending; `[0]` when none are.
    pub fn system_qubits(&self) -> Vec<u32> {
        let mut qubits: Vec<u32> = self
            .theta
            .keys()
            .chain(self.phi.keys())
            .chain(self.lambda.keys())
            .copied()
            .collect();
        qubits.sort_unstable();
        qubits.dedup();
        if qubits.is_empty() { vec![0] } else { qubits }
    }

    /// Append one `u3` per qubit of `on` (relative indices) to `circuit`.
    pub fn append_on(&self, circuit: &mut Circuit, mask: &QubitMask, on: &[u32]) -> ChannelResult<()> {
        for &rel in on {
            let (theta, phi, lambda) = self.angles(rel);
            circuit.u3(theta, phi, lambda, QubitId(mask.resolve(rel)))?;
        }
        Ok(())
    }

    /// `u3(q_{n-1}) ⊗ … ⊗ u3(q_0)` over `on`, position 0 least significant.
    pub fn unitary_on(&self, on: &[u32]) -> Matrix {
        on.iter().rev().fold(linalg::identity(1), |acc, &rel| {
            let (theta, phi, lambda) = self.angles(rel);
            linalg::kron(&acc, &linalg::u3(theta, phi, lambda))
        })
    }
}
