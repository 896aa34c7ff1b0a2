//! Channel circuits run end to end on the exact simulator.

use std::f64::consts::PI;
use std::sync::Arc;

use qchannels_adapter_sim::{SamplingMode, SimulatorBackend};
use qchannels_channels::{
    Channel, ChannelInstance, Coupling, DirectChoi, OneQubitGates, QUTRIT_BASIS_NAMES, QubitMask,
    qutrit_basis_preparations,
};
use qchannels_hal::Capabilities;
use qchannels_ir::{Circuit, QubitId};
use qchannels_theory::linalg::{self, Matrix};
use qchannels_theory::{
    QuantumChannel, build_choi_matrix, choi_from_tomography, fidelity, qutrit_density_basis,
    tomography_change_of_basis,
};
use qchannels_tomography::{Launcher, LauncherConfig};

fn exact_launcher() -> Launcher {
    let backend = SimulatorBackend::new().with_sampling(SamplingMode::Exact);
    Launcher::new(
        Arc::new(backend),
        LauncherConfig::default().with_shots(100_000),
    )
}

fn ket0() -> Matrix {
    linalg::real_matrix([[1.0, 0.0], [0.0, 0.0]])
}

// ---------------------------------------------------------------------------
// Single-qubit channels
// ---------------------------------------------------------------------------

#[tokio::test]
async fn hadamard_tomography_matches_theory() {
    let instance = Channel::Hadamard
        .with_mask(QubitMask::new().with(0, 3))
        .unwrap();
    let circuit = instance
        .circuit("hadamard", 5, &Coupling::all_to_all())
        .unwrap();

    let states = exact_launcher()
        .run(&[circuit], &instance.system_qubits())
        .await
        .unwrap();

    let expected = instance.theory().unwrap().apply(&ket0()).unwrap();
    let f = fidelity(&expected, states[0].as_matrix()).unwrap();
    assert!(f > 0.999, "fidelity {f}");
}

#[tokio::test]
async fn wrapped_hadamard_undoes_itself() {
    let h = OneQubitGates::new().with_u3(0, PI / 2.0, 0.0, PI);
    let channel = Channel::wrapped(h, Channel::Hadamard, OneQubitGates::new());
    let instance = ChannelInstance::unmasked(channel);
    let circuit = instance.circuit("hh", 1, &Coupling::all_to_all()).unwrap();

    let states = exact_launcher().run(&[circuit], &[0]).await.unwrap();

    let predicted = instance.theory().unwrap().apply(&ket0()).unwrap();
    assert!(linalg::approx_eq(&predicted, &ket0(), 1e-9));
    let f = fidelity(&ket0(), states[0].as_matrix()).unwrap();
    assert!(f > 0.999, "fidelity {f}");
}

#[tokio::test]
async fn circuit_with_full_register_is_fitted() {
    let mut circuit = Circuit::with_size("withc", 2, 2);
    circuit.h(QubitId(1)).unwrap();

    let states = exact_launcher().run(&[circuit], &[1]).await.unwrap();

    let plus = linalg::real_matrix([[0.5, 0.5], [0.5, 0.5]]);
    let f = fidelity(&plus, states[0].as_matrix()).unwrap();
    assert!(f > 0.999, "fidelity {f}");
}

// ---------------------------------------------------------------------------
// Qutrit preparation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preparations_reproduce_the_qutrit_basis() {
    let preps = qutrit_basis_preparations(0, 3, 4, &Coupling::all_to_all()).unwrap();
    let states = exact_launcher().run(&preps, &[0, 3]).await.unwrap();

    for ((state, expected), name) in states
        .iter()
        .zip(qutrit_density_basis())
        .zip(QUTRIT_BASIS_NAMES)
    {
        assert!(state.leakage() < 1e-3, "{name} leaks {}", state.leakage());
        let block = state.qutrit_block().unwrap();
        assert!(
            linalg::approx_eq(block.as_matrix(), expected.as_matrix(), 5e-3),
            "{name}: {:?}",
            block.as_matrix()
        );
    }
}

#[tokio::test]
async fn superposition_populates_three_levels() {
    let circuit = ChannelInstance::unmasked(Channel::QutritSuperposition)
        .circuit("sup", 2, &Coupling::all_to_all())
        .unwrap();
    let states = exact_launcher().run(&[circuit], &[0, 1]).await.unwrap();

    let third = linalg::real_matrix([[1.0 / 3.0; 3]; 3]);
    let block = states[0].qutrit_block().unwrap();
    assert!(states[0].leakage() < 1e-3);
    assert!(linalg::approx_eq(block.as_matrix(), &third, 5e-3));
}

// ---------------------------------------------------------------------------
// Qutrit channels
// ---------------------------------------------------------------------------

async fn basis_state_choi_fidelity(channel: Channel) -> f64 {
    let coupling = Coupling::all_to_all();
    let instance = ChannelInstance::unmasked(channel);
    let theory = instance.theory().unwrap();

    let mut circuits = qutrit_basis_preparations(0, 3, 4, &coupling).unwrap();
    for circuit in &mut circuits {
        let name = format!("{}_{}", instance.name(), circuit.name());
        circuit.set_name(name);
        instance.append_to(circuit, &coupling).unwrap();
    }

    let states = exact_launcher()
        .run(&circuits, &instance.system_qubits())
        .await
        .unwrap();

    let basis: Vec<Matrix> = qutrit_density_basis()
        .into_iter()
        .map(|rho| rho.into_inner())
        .collect();
    let outputs: Vec<Matrix> = states
        .iter()
        .map(|state| state.qutrit_block().unwrap().into_inner())
        .collect();
    for (input, output) in basis.iter().zip(&outputs) {
        let expected = theory.apply(input).unwrap();
        assert!(linalg::approx_eq(&expected, output, 5e-3));
    }

    let change = tomography_change_of_basis(&basis).unwrap();
    let measured = choi_from_tomography(&change, &outputs).unwrap();
    let predicted = build_choi_matrix(&theory, 3).unwrap();
    fidelity(predicted.as_matrix(), measured.as_matrix()).unwrap()
}

#[tokio::test]
async fn landau_streater_choi() {
    let f = basis_state_choi_fidelity(Channel::LandauStreater).await;
    assert!(f > 0.99, "fidelity {f}");
}

#[tokio::test]
async fn werner_holevo_choi() {
    let f = basis_state_choi_fidelity(Channel::WernerHolevo).await;
    assert!(f > 0.99, "fidelity {f}");
}

#[tokio::test]
async fn direct_choi_of_landau_streater() {
    let layout = DirectChoi::simulator(Channel::LandauStreater).unwrap();
    let circuit = layout
        .circuit("direct", layout.min_qubits(), &Coupling::all_to_all())
        .unwrap();

    let states = exact_launcher()
        .run(&[circuit], &layout.tomography_qubits())
        .await
        .unwrap();

    let measured = layout.choi(&states[0]).unwrap();
    let theory = layout.channel().theory().unwrap();
    let predicted = build_choi_matrix(&theory, 3).unwrap();
    let f = fidelity(predicted.as_matrix(), measured.as_matrix()).unwrap();
    assert!(f > 0.98, "fidelity {f}");
}

// ---------------------------------------------------------------------------
// Coupling
// ---------------------------------------------------------------------------

fn bell(coupling: &Coupling) -> Circuit {
    let mut circuit = Circuit::with_size("bell", 5, 0);
    circuit.h(QubitId(0)).unwrap();
    coupling
        .cnot(&mut circuit, QubitId(0), QubitId(1))
        .unwrap();
    circuit
}

#[tokio::test]
async fn reversed_cnot_matches_direct_cnot() {
    let ibmqx4 = Capabilities::ibmqx4();
    let coupling = Coupling::from_capabilities(&ibmqx4);
    let device = SimulatorBackend::emulating(ibmqx4).with_sampling(SamplingMode::Exact);
    let on_device = Launcher::new(Arc::new(device), LauncherConfig::default())
        .run(&[bell(&coupling)], &[0, 1])
        .await
        .unwrap();

    let direct = exact_launcher()
        .run(&[bell(&Coupling::all_to_all())], &[0, 1])
        .await
        .unwrap();

    let h = 0.5;
    let expected = linalg::real_matrix([
        [h, 0.0, 0.0, h],
        [0.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 0.0],
        [h, 0.0, 0.0, h],
    ]);
    for state in on_device.iter().chain(&direct) {
        let f = fidelity(&expected, state.as_matrix()).unwrap();
        assert!(f > 0.99, "fidelity {f}");
    }
}
