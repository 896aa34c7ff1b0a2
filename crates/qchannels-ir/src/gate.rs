//! Quantum gate types.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

/// Row-major 2×2 unitary of a single-qubit gate.
pub type Matrix2 = [[Complex64; 2]; 2];

/// Standard gates with known semantics.
///
/// Angles are concrete radians; channel circuits never carry symbolic
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),
    /// Phase gate.
    P(f64),
    /// Universal single-qubit gate U(θ, φ, λ).
    U(f64, f64, f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate. Operands are `[control, target]`.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::P(_) => "p",
            StandardGate::U(_, _, _) => "u",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::CX | StandardGate::CZ | StandardGate::Swap => 2,
            _ => 1,
        }
    }

    /// The 2×2 unitary for single-qubit gates, `None` for two-qubit gates.
    ///
    /// `U(θ, φ, λ)` follows the OpenQASM convention
    /// `[[cos θ/2, -e^{iλ} sin θ/2], [e^{iφ} sin θ/2, e^{i(φ+λ)} cos θ/2]]`.
    pub fn matrix(&self) -> Option<Matrix2> {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        let i = Complex64::new(0.0, 1.0);
        let m = match *self {
            StandardGate::I => [[one, zero], [zero, one]],
            StandardGate::X => [[zero, one], [one, zero]],
            StandardGate::Y => [[zero, -i], [i, zero]],
            StandardGate::Z => [[one, zero], [zero, -one]],
            StandardGate::H => {
                let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
                [[h, h], [h, -h]]
            }
            StandardGate::S => [[one, zero], [zero, i]],
            StandardGate::Sdg => [[one, zero], [zero, -i]],
            StandardGate::T => [[one, zero], [zero, Complex64::cis(std::f64::consts::FRAC_PI_4)]],
            StandardGate::Tdg => [[one, zero], [zero, Complex64::cis(-std::f64::consts::FRAC_PI_4)]],
            StandardGate::Rx(theta) => {
                let (s, c) = (theta / 2.0).sin_cos();
                [[c * one, -i * s], [-i * s, c * one]]
            }
            StandardGate::Ry(theta) => {
                let (s, c) = (theta / 2.0).sin_cos();
                [[c * one, -s * one], [s * one, c * one]]
            }
            StandardGate::Rz(theta) => [
                [Complex64::cis(-theta / 2.0), zero],
                [zero, Complex64::cis(theta / 2.0)],
            ],
            StandardGate::P(theta) => [[one, zero], [zero, Complex64::cis(theta)]],
            StandardGate::U(theta, phi, lambda) => {
                let (s, c) = (theta / 2.0).sin_cos();
                [
                    [c * one, -Complex64::cis(lambda) * s],
                    [Complex64::cis(phi) * s, Complex64::cis(phi + lambda) * c],
                ]
            }
            StandardGate::CX | StandardGate::CZ | StandardGate::Swap => return None,
        };
        Some(m)
    }
}
