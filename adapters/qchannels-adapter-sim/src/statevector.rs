//! Statevector simulation engine.

use num_complex::Complex64;

use qchannels_ir::gate::Matrix2;
use qchannels_ir::{Circuit, Instruction, InstructionKind, StandardGate};

/// A pure state of `num_qubits` qubits. Basis index bit `q` is qubit `q`.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Run every gate of `circuit` from |0...0⟩. Measurements are treated as
    /// taking place at the end.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut sv = Self::new(circuit.num_qubits());
        for inst in circuit.instructions() {
            sv.apply(inst);
        }
        sv
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<_> = instruction.qubits.iter().map(|q| q.index()).collect();
                self.apply_gate(gate, &qubits);
            }
            InstructionKind::Measure | InstructionKind::Barrier => {}
        }
    }

    fn apply_gate(&mut self, gate: &StandardGate, qubits: &[usize]) {
        match gate {
            StandardGate::CX => self.apply_cx(qubits[0], qubits[1]),
            StandardGate::CZ => self.apply_cz(qubits[0], qubits[1]),
            StandardGate::Swap => self.apply_swap(qubits[0], qubits[1]),
            single => {
                if let Some(m) = single.matrix() {
                    self.apply_single(qubits[0], &m);
                }
            }
        }
    }

    // =========================================================================
    // Gate kernels
    // =========================================================================

    fn apply_single(&mut self, qubit: usize, m: &Matrix2) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = m[0][0] * a + m[0][1] * b;
                self.amplitudes[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_cx(&mut self, control: usize, target: usize) {
        let ctrl_mask = 1 << control;
        let tgt_mask = 1 << target;
        for i in 0..(1 << self.num_qubits) {
            if (i & ctrl_mask != 0) && (i & tgt_mask == 0) {
                let j = i | tgt_mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_cz(&mut self, control: usize, target: usize) {
        let both = (1 << control) | (1 << target);
        for i in 0..(1 << self.num_qubits) {
            if i & both == both {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    fn apply_swap(&mut self, q1: usize, q2: usize) {
        let mask1 = 1 << q1;
        let mask2 = 1 << q2;
        for i in 0..(1 << self.num_qubits) {
            if (i & mask1 != 0) && (i & mask2 == 0) {
                let j = (i & !mask1) | mask2;
                self.amplitudes.swap(i, j);
            }
        }
    }

    // =========================================================================
    // Readout
    // =========================================================================

    /// Probability of each classical register value when `measures` lists
    /// `(qubit, clbit)` pairs. Register bit `c` is clbit `c`; unmeasured
    /// clbits read 0.
    pub fn clbit_distribution(&self, measures: &[(usize, usize)], num_clbits: usize) -> Vec<f64> {
        let mut probs = vec![0.0; 1 << num_clbits];
        for (index, amp) in self.amplitudes.iter().enumerate() {
            let p = amp.norm_sqr();
            if p == 0.0 {
                continue;
            }
            let value = measures.iter().fold(0usize, |acc, &(q, c)| {
                if (index >> q) & 1 == 1 { acc | (1 << c) } else { acc & !(1 << c) }
            });
            probs[value] += p;
        }
        probs
    }
}

/// Register value to bitstring, clbit 0 first.
pub fn value_to_bitstring(value: usize, width: usize) -> String {
    (0..width)
        .map(|j| if (value >> j) & 1 == 1 { '1' } else { '0' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qchannels_ir::{ClbitId, QubitId};

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(sv.amplitudes[1..].iter().all(|a| a.norm() < 1e-12));
    }

    #[test]
    fn test_bell_state() {
        let mut circuit = Circuit::with_size("bell", 2, 0);
        circuit.h(QubitId(0)).unwrap().cx(QubitId(0), QubitId(1)).unwrap();
        let sv = Statevector::from_circuit(&circuit);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_sdg_h_maps_plus_i_to_zero() {
        let mut circuit = Circuit::with_size("y", 1, 0);
        let q = QubitId(0);
        circuit.h(q).unwrap().s(q).unwrap().sdg(q).unwrap().h(q).unwrap();
        let sv = Statevector::from_circuit(&circuit);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_cz_and_swap() {
        let mut circuit = Circuit::with_size("c", 2, 0);
        circuit
            .x(QubitId(0))
            .unwrap()
            .swap(QubitId(0), QubitId(1))
            .unwrap();
        let sv = Statevector::from_circuit(&circuit);
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(1.0, 0.0)));

        circuit.x(QubitId(0)).unwrap().cz(QubitId(0), QubitId(1)).unwrap();
        let sv = Statevector::from_circuit(&circuit);
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(-1.0, 0.0)));
    }

    #[test]
    fn test_distribution_follows_measure_map() {
        // |q2 q1 q0> = |100>, qubit 2 measured into clbit 0
        let mut circuit = Circuit::with_size("m", 3, 2);
        circuit.x(QubitId(2)).unwrap();
        circuit.measure(QubitId(2), ClbitId(0)).unwrap();
        circuit.measure(QubitId(0), ClbitId(1)).unwrap();
        let sv = Statevector::from_circuit(&circuit);

        let measures: Vec<_> = circuit
            .measurements()
            .map(|(q, c)| (q.index(), c.index()))
            .collect();
        let probs = sv.clbit_distribution(&measures, 2);
        assert_eq!(probs.len(), 4);
        assert!((probs[0b01] - 1.0).abs() < 1e-12);
        assert_eq!(value_to_bitstring(0b01, 2), "10");
    }
}
