//! CLI parsing, configuration files and end-to-end experiments on the exact
//! simulator.

use std::io::Write;

use clap::Parser;
use qchannels_channels::{Channel, ChannelName, QubitMask};
use qchannels_cli::cli::{Cli, Commands};
use qchannels_cli::config::{ConfigError, ExperimentConfig};
use qchannels_cli::experiments::{self, DirectChoiMasks, ExperimentContext};
use qchannels_cli::registry::default_registry;

fn exact_config() -> ExperimentConfig {
    ExperimentConfig {
        exact: true,
        shots: 100_000,
        ..ExperimentConfig::default()
    }
}

fn exact_context() -> ExperimentContext {
    ExperimentContext::new(&default_registry(), &exact_config()).unwrap()
}

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn parse_choi_with_mask() {
    let cli = Cli::try_parse_from([
        "qchannels",
        "choi",
        "-c",
        "landau_streater",
        "--mask",
        "0:1,3:0",
        "-s",
        "1024",
    ])
    .unwrap();

    assert_eq!(cli.shots, Some(1024));
    match cli.command {
        Commands::Choi { channel, mask } => {
            assert_eq!(channel, ChannelName::LandauStreater);
            assert_eq!(mask.unwrap().resolve(3), 0);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_rejects_unknown_channel() {
    let err = Cli::try_parse_from(["qchannels", "state", "-c", "amplitude-damping"]).unwrap_err();
    assert!(err.to_string().contains("amplitude-damping"));
}

#[test]
fn parse_rejects_bad_mask() {
    assert!(Cli::try_parse_from(["qchannels", "hadamard", "--mask", "0-3"]).is_err());
}

#[test]
fn global_flags_override_config() {
    let cli = Cli::try_parse_from([
        "qchannels",
        "-vv",
        "direct-choi",
        "-c",
        "werner-holevo",
        "-b",
        "ibmqx4",
        "--seed",
        "5",
    ])
    .unwrap();
    assert_eq!(cli.verbose, 2);

    let mut config = ExperimentConfig::default();
    cli.apply_to(&mut config);
    assert_eq!(config.backend, "ibmqx4");
    assert_eq!(config.seed, Some(5));
    assert_eq!(config.shots, 8192);
    assert!(matches!(
        cli.command,
        Commands::DirectChoi {
            identity_mask: None,
            ..
        }
    ));
}

// ============================================================================
// Configuration files
// ============================================================================

#[test]
fn config_from_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "backend: ibmq_16_melbourne\nshots: 2048\nmax_credits: null").unwrap();

    let config = ExperimentConfig::from_file(file.path()).unwrap();
    assert_eq!(config.backend, "ibmq_16_melbourne");
    assert_eq!(config.shots, 2048);
    assert_eq!(config.max_credits, None);
    assert!(!config.exact);

    let loaded = ExperimentConfig::load(Some(file.path())).unwrap();
    assert_eq!(loaded.backend, config.backend);
}

#[test]
fn config_file_errors() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "shots: 0").unwrap();
    let err = ExperimentConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "shots: [1, 2]").unwrap();
    let err = ExperimentConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));

    let err = ExperimentConfig::from_file("/nonexistent/qchannels.yaml").unwrap_err();
    assert!(matches!(err, ConfigError::IoError(_)));
}

// ============================================================================
// Experiments
// ============================================================================

#[tokio::test]
async fn unknown_backend_is_reported() {
    let config = ExperimentConfig {
        backend: "ibmqx5".into(),
        ..ExperimentConfig::default()
    };
    let err = ExperimentContext::new(&default_registry(), &config)
        .err()
        .unwrap();
    assert!(format!("{err:#}").contains("ibmqx5"));
}

#[tokio::test]
async fn hadamard_experiment() {
    let ctx = exact_context();
    let report = experiments::hadamard(&ctx, QubitMask::new().with(0, 3))
        .await
        .unwrap();
    assert_eq!(report.qubits, [3]);
    let comparison = report.comparison.unwrap();
    assert!(comparison.fidelity > 0.999, "fidelity {}", comparison.fidelity);
}

#[tokio::test]
async fn state_of_a_qutrit_channel_uses_the_qutrit_block() {
    let ctx = exact_context();
    let report = experiments::state_tomography(&ctx, Channel::WernerHolevo, QubitMask::new())
        .await
        .unwrap();
    assert_eq!(report.state.dim(), 4);
    let comparison = report.comparison.unwrap();
    assert_eq!(comparison.expected.dim(), (3, 3));
    assert!(comparison.fidelity > 0.99);

    let report =
        experiments::state_tomography(&ctx, Channel::QutritSuperposition, QubitMask::new())
            .await
            .unwrap();
    assert!(report.comparison.is_none());
}

#[tokio::test]
async fn basis_state_choi_experiment() {
    let ctx = exact_context();
    let report = experiments::basis_state_choi(&ctx, Channel::LandauStreater, QubitMask::new())
        .await
        .unwrap();
    assert_eq!(report.outputs.len(), 9);
    assert_eq!(report.outputs[0].name, "rho_A0");
    assert!(report.outputs.iter().all(|o| o.fidelity > 0.99 && o.trace > 0.99));
    assert!(report.fidelity > 0.99, "fidelity {}", report.fidelity);
    assert!((experiments::choi_trace(&report.measured) - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn choi_needs_a_qutrit_channel() {
    let ctx = exact_context();
    let err = experiments::basis_state_choi(&ctx, Channel::Hadamard, QubitMask::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("qutrit"));
}

#[tokio::test]
async fn direct_choi_experiment() {
    let ctx = exact_context();
    let report =
        experiments::direct_choi(&ctx, Channel::WernerHolevo, DirectChoiMasks::default())
            .await
            .unwrap();
    assert!(report.outputs.is_empty());
    assert!(report.fidelity > 0.98, "fidelity {}", report.fidelity);
}

#[tokio::test]
async fn placement_errors_surface_on_devices() {
    // qubits 0 and 3 are not coupled on ibmqx4
    let config = ExperimentConfig {
        backend: "ibmqx4".into(),
        ..exact_config()
    };
    let ctx = ExperimentContext::new(&default_registry(), &config).unwrap();
    assert!(!ctx.is_simulator());
    let err = experiments::basis_state_choi(&ctx, Channel::LandauStreater, QubitMask::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Cannot place CNOT 3 -> 0"));
}
