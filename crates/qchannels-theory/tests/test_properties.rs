//! Property-based tests for the channel algebra.

use ndarray::Array2;
use num_complex::Complex64;
use proptest::prelude::*;
use qchannels_theory::linalg::{self, Matrix};
use qchannels_theory::{
    KeepHalf, QuantumChannel, build_choi_matrix, channel_from_choi, fidelity, partial_trace,
    sort_with_permutation,
};

/// A random density matrix `A·A† / Tr(A·A†)` of the given dimension.
fn arb_density(dim: usize) -> impl Strategy<Value = Matrix> {
    prop::collection::vec((-1.0f64..1.0, -1.0f64..1.0), dim * dim).prop_filter_map(
        "degenerate sample",
        move |entries| {
            let a = Array2::from_shape_fn((dim, dim), |(i, j)| {
                let (re, im) = entries[i * dim + j];
                Complex64::new(re, im)
            });
            let rho = a.dot(&linalg::dagger(&a));
            let tr = linalg::trace(&rho).re;
            (tr > 1e-3).then(|| rho.mapv(|z| z / tr))
        },
    )
}

/// A random single-qubit unitary.
fn arb_unitary() -> impl Strategy<Value = Matrix> {
    (0.0f64..std::f64::consts::PI, -3.0f64..3.0, -3.0f64..3.0)
        .prop_map(|(theta, phi, lambda)| linalg::u3(theta, phi, lambda))
}

/// The state of `qubits.len()` qubits where qubit `q` holds `states[q]`,
/// laid out with `qubits[0]` as the least significant position.
fn product_state(states: &[Matrix], qubits: &[u32]) -> Matrix {
    qubits
        .iter()
        .rev()
        .fold(linalg::identity(1), |acc, &q| linalg::kron(&acc, &states[q as usize]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn partial_trace_of_product_returns_factors(a in arb_density(2), b in arb_density(3)) {
        // Pad `a` into dimension 3 so both halves of the product match.
        let mut a3 = Matrix::zeros((3, 3));
        a3.slice_mut(ndarray::s![..2, ..2]).assign(&a);
        let ab = linalg::kron(&a3, &b);
        prop_assert!(linalg::approx_eq(&partial_trace(&ab, KeepHalf::First).unwrap(), &a3, 1e-10));
        prop_assert!(linalg::approx_eq(&partial_trace(&ab, KeepHalf::Second).unwrap(), &b, 1e-10));
    }

    #[test]
    fn choi_round_trip_reproduces_unitary_channel(u in arb_unitary(), rho in arb_density(2)) {
        let channel = linalg::unitary_channel(u);
        let choi = build_choi_matrix(&channel, 2).unwrap();
        prop_assert!((choi.trace().re - 1.0).abs() < 1e-10);
        prop_assert!(linalg::is_hermitian(choi.as_matrix(), 1e-10));

        let rebuilt = channel_from_choi(&choi).apply(&rho).unwrap();
        prop_assert!(linalg::approx_eq(&rebuilt, &channel(&rho), 1e-10));
    }

    #[test]
    fn fidelity_is_symmetric_and_bounded(a in arb_density(3), b in arb_density(3)) {
        let fab = fidelity(&a, &b).unwrap();
        let fba = fidelity(&b, &a).unwrap();
        prop_assert!((0.0..=1.0).contains(&fab));
        prop_assert!((fab - fba).abs() < 1e-6);
        prop_assert!((fidelity(&a, &a).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn permutation_correction_reorders_product_states(
        perm in Just(vec![0u32, 1, 2, 3]).prop_shuffle(),
        states in prop::collection::vec(arb_density(2), 4),
    ) {
        let corr = sort_with_permutation(&perm).unwrap();
        prop_assert_eq!(corr.sorted(), &[0, 1, 2, 3]);

        let sorted_state = product_state(&states, corr.sorted());
        let expected = product_state(&states, &perm);
        let corrected = corr.correct(&sorted_state).unwrap();
        prop_assert!(linalg::approx_eq(&corrected, &expected, 1e-12));
    }
}
