//! Tests for Choi construction, channel reconstruction and Kraus recovery.

use ndarray::array;
use num_complex::Complex64;
use qchannels_theory::linalg::{self, Matrix};
use qchannels_theory::{
    KeepHalf, KrausChannel, QuantumChannel, build_choi_matrix, channel_from_choi, fidelity,
    kraus_from_choi, kraus_sets_equivalent, partial_trace, qutrit_density_basis,
};

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

fn x() -> Matrix {
    linalg::real_matrix([[0.0, 1.0], [1.0, 0.0]])
}

fn y() -> Matrix {
    array![[c(0.0, 0.0), c(0.0, -1.0)], [c(0.0, 1.0), c(0.0, 0.0)]]
}

fn z() -> Matrix {
    linalg::real_matrix([[1.0, 0.0], [0.0, -1.0]])
}

fn normalized(m: Matrix) -> Matrix {
    let tr = linalg::trace(&m);
    m.mapv(|v| v / tr)
}

// ---------------------------------------------------------------------------
// Partial trace
// ---------------------------------------------------------------------------

#[test]
fn partial_trace_recovers_both_factors() {
    let a = normalized(linalg::real_matrix([[1.0, 2.0], [3.0, 4.0]]));
    let b = normalized(linalg::real_matrix([[5.0, 6.0], [7.0, 8.0]]));
    let ab = linalg::kron(&a, &b);
    let ba = linalg::kron(&b, &a);

    assert!(linalg::approx_eq(&partial_trace(&ab, KeepHalf::First).unwrap(), &a, 1e-12));
    assert!(linalg::approx_eq(&partial_trace(&ab, KeepHalf::Second).unwrap(), &b, 1e-12));
    assert!(linalg::approx_eq(&partial_trace(&ba, KeepHalf::Second).unwrap(), &a, 1e-12));
    assert!(linalg::approx_eq(&partial_trace(&ba, KeepHalf::First).unwrap(), &b, 1e-12));

    let cm = normalized(linalg::real_matrix([[10.0, 0.0], [0.0, 20.0]]));
    let ac = linalg::kron(&a, &cm);
    assert!(linalg::approx_eq(&partial_trace(&ac, KeepHalf::First).unwrap(), &a, 1e-12));
    assert!(linalg::approx_eq(&partial_trace(&ac, KeepHalf::Second).unwrap(), &cm, 1e-12));

    for keep in [KeepHalf::First, KeepHalf::Second] {
        let tr = linalg::trace(&partial_trace(&ab, keep).unwrap());
        assert!((tr - c(1.0, 0.0)).norm() < 1e-12);
    }
}

// ---------------------------------------------------------------------------
// Choi matrices of the Pauli channels
// ---------------------------------------------------------------------------

#[test]
fn choi_of_pauli_channels() {
    let cases = [
        (
            linalg::identity(2),
            [[1.0, 0.0, 0.0, 1.0], [0.0; 4], [0.0; 4], [1.0, 0.0, 0.0, 1.0]],
        ),
        (
            x(),
            [[0.0; 4], [0.0, 1.0, 1.0, 0.0], [0.0, 1.0, 1.0, 0.0], [0.0; 4]],
        ),
        (
            y(),
            [[0.0; 4], [0.0, 1.0, -1.0, 0.0], [0.0, -1.0, 1.0, 0.0], [0.0; 4]],
        ),
        (
            z(),
            [[1.0, 0.0, 0.0, -1.0], [0.0; 4], [0.0; 4], [-1.0, 0.0, 0.0, 1.0]],
        ),
    ];
    for (gate, expected) in cases {
        let choi = build_choi_matrix(&linalg::unitary_channel(gate.clone()), 2).unwrap();
        let expected = linalg::real_matrix(expected).mapv(|v| v / 2.0);
        assert!(
            linalg::approx_eq(choi.as_matrix(), &expected, 1e-12),
            "gate {gate:?}: {:?}",
            choi.as_matrix()
        );
    }
}

#[test]
fn identity_qutrit_choi_and_round_trip() {
    let choi = build_choi_matrix(&|rho: &Matrix| rho.clone(), 3).unwrap();
    let mut expected = Matrix::zeros((9, 9));
    for i in [0, 4, 8] {
        for j in [0, 4, 8] {
            expected[[i, j]] = c(1.0 / 3.0, 0.0);
        }
    }
    assert!(linalg::approx_eq(choi.as_matrix(), &expected, 1e-12));
    assert!((choi.trace() - c(1.0, 0.0)).norm() < 1e-12);

    let channel = channel_from_choi(&choi);
    for rho in qutrit_density_basis() {
        let out = channel.apply(rho.as_matrix()).unwrap();
        assert!(linalg::approx_eq(&out, rho.as_matrix(), 1e-12));
    }
}

#[test]
fn pauli_round_trip_on_non_hermitian_inputs() {
    let i = c(0.0, 1.0);
    let o = c(0.0, 0.0);
    let l = c(1.0, 0.0);
    let inputs = [
        array![[l, o], [o, o]],
        array![[o, l], [o, o]],
        array![[o, o], [l, o]],
        array![[o, o], [o, l]],
        array![[o, i], [o, o]],
        array![[o, o], [i, o]],
        array![[i, o], [o, o]],
        array![[o, o], [o, l]],
    ];
    for gate in [linalg::identity(2), x(), y(), z()] {
        let channel = linalg::unitary_channel(gate);
        let rebuilt = channel_from_choi(&build_choi_matrix(&channel, 2).unwrap());
        for rho in &inputs {
            let expected = channel(rho);
            let got = rebuilt.apply(rho).unwrap();
            assert!(linalg::approx_eq(&got, &expected, 1e-12));
        }
    }
}

// ---------------------------------------------------------------------------
// Kraus recovery
// ---------------------------------------------------------------------------

fn cnot() -> Matrix {
    linalg::real_matrix([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0, 0.0],
    ])
}

#[test]
fn kraus_of_unitary_channels() {
    let choi = build_choi_matrix(&linalg::unitary_channel(cnot()), 4).unwrap();
    let ops = kraus_from_choi(&choi).unwrap();
    assert!(kraus_sets_equivalent(&ops, &[cnot()], 1e-9));

    let choi = build_choi_matrix(&|rho: &Matrix| rho.clone(), 4).unwrap();
    let ops = kraus_from_choi(&choi).unwrap();
    assert!(kraus_sets_equivalent(&ops, &[linalg::identity(4)], 1e-9));

    for pauli in [x(), y(), z()] {
        let choi = build_choi_matrix(&linalg::unitary_channel(pauli.clone()), 2).unwrap();
        let ops = kraus_from_choi(&choi).unwrap();
        assert_eq!(ops.len(), 1);
        assert!(kraus_sets_equivalent(&ops, &[pauli], 1e-9));
    }
}

#[test]
fn kraus_of_pauli_mixture() {
    let mixture = |rho: &Matrix| (x().dot(rho).dot(&x()) + z().dot(rho).dot(&z())).mapv(|v| v / 2.0);
    let choi = build_choi_matrix(&mixture, 2).unwrap();
    let ops = kraus_from_choi(&choi).unwrap();
    let s = std::f64::consts::FRAC_1_SQRT_2;
    let expected = [z().mapv(|v| v * s), x().mapv(|v| v * s)];
    assert!(kraus_sets_equivalent(&ops, &expected, 1e-9), "{ops:?}");

    let channel = KrausChannel::new(ops).unwrap();
    assert!(channel.is_trace_preserving(1e-9));
    let rho = linalg::real_matrix([[0.7, 0.2], [0.2, 0.3]]);
    assert!(linalg::approx_eq(&channel.apply(&rho).unwrap(), &mixture(&rho), 1e-9));
}

#[test]
fn kraus_channel_from_choi_reproduces_channel() {
    let u = linalg::u3(0.4, 1.1, -0.3);
    let channel = linalg::unitary_channel(u);
    let choi = build_choi_matrix(&channel, 2).unwrap();
    let kraus = KrausChannel::from_choi(&choi).unwrap();
    for rho in [
        linalg::real_matrix([[1.0, 0.0], [0.0, 0.0]]),
        linalg::real_matrix([[0.5, 0.5], [0.5, 0.5]]),
    ] {
        assert!(linalg::approx_eq(&kraus.apply(&rho).unwrap(), &channel(&rho), 1e-9));
    }
}

// ---------------------------------------------------------------------------
// Fidelity
// ---------------------------------------------------------------------------

#[test]
fn fidelity_of_pure_states_is_overlap() {
    let zero = linalg::real_matrix([[1.0, 0.0], [0.0, 0.0]]);
    let plus = linalg::real_matrix([[0.5, 0.5], [0.5, 0.5]]);
    let f = fidelity(&zero, &plus).unwrap();
    assert!((f - 0.5).abs() < 1e-9);

    let g = fidelity(&plus, &zero).unwrap();
    assert!((f - g).abs() < 1e-9);
}

#[test]
fn fidelity_with_maximally_mixed_state() {
    let mixed = linalg::identity(3).mapv(|v| v / 3.0);
    for rho in qutrit_density_basis() {
        let f = fidelity(rho.as_matrix(), &mixed).unwrap();
        assert!((f - 1.0 / 3.0).abs() < 1e-9);
    }
}
