//! Tomography workflows behind the experiment subcommands.

use anyhow::{Context, Result, anyhow, bail};
use qchannels_channels::{
    Channel, ChannelInstance, Coupling, DirectChoi, QUTRIT_BASIS_NAMES, QubitMask,
    TheoryChannel, qutrit_basis_preparations,
};
use qchannels_hal::BackendRegistry;
use qchannels_ir::Circuit;
use qchannels_theory::{
    ChoiMatrix, DensityMatrix, Matrix, QuantumChannel, build_choi_matrix, choi_from_tomography,
    fidelity, linalg, qutrit_density_basis, tomography_change_of_basis,
};
use qchannels_tomography::{LaunchPhase, Launcher};
use tracing::info;

use crate::config::ExperimentConfig;

/// A launcher bound to one backend and the CNOT placement it needs.
pub struct ExperimentContext {
    launcher: Launcher,
    coupling: Coupling,
    is_simulator: bool,
}

impl ExperimentContext {
    pub fn new(registry: &BackendRegistry, config: &ExperimentConfig) -> Result<Self> {
        let launcher = Launcher::from_registry(
            registry,
            &config.backend,
            config.backend_config(),
            config.launcher_config(),
        )
        .with_context(|| format!("Failed to create backend '{}'", config.backend))?;

        let capabilities = launcher.backend().capabilities();
        let coupling = Coupling::from_capabilities(capabilities);
        let is_simulator = capabilities.is_simulator;
        Ok(Self {
            launcher,
            coupling,
            is_simulator,
        })
    }

    /// Report launch progress to `observer`.
    pub fn with_observer(
        mut self,
        observer: impl Fn(&LaunchPhase) + Send + Sync + 'static,
    ) -> Self {
        self.launcher = self.launcher.with_observer(observer);
        self
    }

    pub fn backend_name(&self) -> &str {
        self.launcher.backend().name()
    }

    pub fn is_simulator(&self) -> bool {
        self.is_simulator
    }

    pub fn coupling(&self) -> &Coupling {
        &self.coupling
    }

    async fn run(&self, circuits: &[Circuit], qubits: &[u32]) -> Result<Vec<DensityMatrix>> {
        let states = self.launcher.run(circuits, qubits).await?;
        Ok(states)
    }
}

/// Predicted state next to the measured one.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub expected: Matrix,
    pub measured: Matrix,
    pub fidelity: f64,
}

/// Result of single-state tomography.
#[derive(Debug, Clone)]
pub struct StateReport {
    pub channel: String,
    pub qubits: Vec<u32>,
    pub state: DensityMatrix,
    /// Present when the channel has a theory map of matching dimension.
    pub comparison: Option<Comparison>,
}

/// Tomography of `channel` applied to `|0…0⟩` on its system qubits.
pub async fn state_tomography(
    ctx: &ExperimentContext,
    channel: Channel,
    mask: QubitMask,
) -> Result<StateReport> {
    let instance = channel.with_mask(mask)?;
    let qubits = instance.system_qubits();
    let circuit = instance.circuit(instance.name(), instance.min_qubits(), &ctx.coupling)?;
    info!(channel = %instance.name(), ?qubits, "state tomography");

    let state = ctx
        .run(&[circuit], &qubits)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no state returned for '{}'", instance.name()))?;

    let comparison = match instance.theory() {
        Some(theory) => compare_from_zero(&theory, &state)?,
        None => None,
    };
    Ok(StateReport {
        channel: instance.name(),
        qubits,
        state,
        comparison,
    })
}

/// Compare with the theory output on `|0⟩⟨0|`. Qutrit predictions are
/// compared against the post-selected qutrit block of a two-qubit state.
fn compare_from_zero(theory: &TheoryChannel, state: &DensityMatrix) -> Result<Option<Comparison>> {
    let d = theory.dim();
    let measured = if d == state.dim() {
        state.as_matrix().clone()
    } else if d == 3 && state.dim() == 4 {
        state.qutrit_block()?.into_inner()
    } else {
        return Ok(None);
    };
    let expected = theory.apply(DensityMatrix::basis_state(d, 0)?.as_matrix())?;
    let fidelity = fidelity(&expected, &measured)?;
    Ok(Some(Comparison {
        expected,
        measured,
        fidelity,
    }))
}

/// Tomography of the Hadamard channel on `|0⟩`.
pub async fn hadamard(ctx: &ExperimentContext, mask: QubitMask) -> Result<StateReport> {
    state_tomography(ctx, Channel::Hadamard, mask).await
}

/// Output of the channel on one qutrit basis state.
#[derive(Debug, Clone)]
pub struct BasisOutput {
    pub name: &'static str,
    /// Fidelity of the post-selected output with the predicted one.
    pub fidelity: f64,
    /// Population left in the qutrit subspace before post-selection.
    pub trace: f64,
}

/// Result of a Choi experiment.
#[derive(Debug, Clone)]
pub struct ChoiReport {
    pub channel: String,
    /// Per-input results of the basis-state experiment; empty for the
    /// direct experiment.
    pub outputs: Vec<BasisOutput>,
    pub measured: ChoiMatrix,
    pub expected: ChoiMatrix,
    pub fidelity: f64,
}

fn qutrit_theory(instance: &ChannelInstance) -> Result<TheoryChannel> {
    match instance.theory() {
        Some(theory) if theory.dim() == 3 => Ok(theory),
        Some(theory) => bail!(
            "channel '{}' acts on dimension {}, a Choi experiment needs a qutrit channel",
            instance.name(),
            theory.dim()
        ),
        None => bail!("channel '{}' has no theory map", instance.name()),
    }
}

/// The basis-state experiment: prepare the nine qutrit basis states, apply
/// the channel, post-select the qutrit block and assemble the Choi matrix.
pub async fn basis_state_choi(
    ctx: &ExperimentContext,
    channel: Channel,
    mask: QubitMask,
) -> Result<ChoiReport> {
    let instance = channel.with_mask(mask)?;
    let theory = qutrit_theory(&instance)?;
    let system = instance.system_qubits();
    let &[low, high] = system.as_slice() else {
        bail!(
            "channel '{}' acts on {} qubits, a qutrit pair needs 2",
            instance.name(),
            system.len()
        );
    };

    let mut circuits = qutrit_basis_preparations(low, high, instance.min_qubits(), &ctx.coupling)?;
    for circuit in &mut circuits {
        let name = format!("{}_{}", instance.name(), circuit.name());
        circuit.set_name(name);
        instance.append_to(circuit, &ctx.coupling)?;
    }
    info!(channel = %instance.name(), ?system, "basis-state Choi experiment");
    let states = ctx.run(&circuits, &system).await?;

    let basis: Vec<Matrix> = qutrit_density_basis()
        .into_iter()
        .map(DensityMatrix::into_inner)
        .collect();
    let mut outputs = Vec::with_capacity(basis.len());
    let mut blocks = Vec::with_capacity(basis.len());
    for ((state, input), name) in states.iter().zip(&basis).zip(QUTRIT_BASIS_NAMES) {
        let block = state
            .qutrit_block()
            .with_context(|| format!("post-selecting {name}"))?
            .into_inner();
        let expected = theory.apply(input)?;
        outputs.push(BasisOutput {
            name,
            fidelity: fidelity(&expected, &block)?,
            trace: 1.0 - state.leakage(),
        });
        blocks.push(block);
    }

    let change = tomography_change_of_basis(&basis)?;
    let measured = choi_from_tomography(&change, &blocks)?;
    let expected = build_choi_matrix(&theory, 3)?;
    let fidelity = fidelity(expected.as_matrix(), measured.as_matrix())?;
    Ok(ChoiReport {
        channel: instance.name(),
        outputs,
        measured,
        expected,
        fidelity,
    })
}

/// Where the direct experiment places its qubits. Unset masks fall back to
/// the simulator or hardware layout.
#[derive(Debug, Clone, Default)]
pub struct DirectChoiMasks {
    pub channel: Option<QubitMask>,
    pub identity: Option<QubitMask>,
}

/// The direct experiment: one entangled circuit, four-qubit tomography.
pub async fn direct_choi(
    ctx: &ExperimentContext,
    channel: Channel,
    masks: DirectChoiMasks,
) -> Result<ChoiReport> {
    let defaults = if ctx.is_simulator {
        DirectChoi::simulator(channel.clone())?
    } else {
        DirectChoi::hardware(channel.clone())?
    };
    let layout = match masks {
        DirectChoiMasks {
            channel: None,
            identity: None,
        } => defaults,
        DirectChoiMasks { channel: c, identity: i } => DirectChoi::with_masks(
            channel,
            i.unwrap_or_else(|| defaults.identity().mask().clone()),
            c.unwrap_or_else(|| defaults.channel().mask().clone()),
        )?,
    };
    let theory = qutrit_theory(layout.channel())?;

    let name = format!("{}_direct_choi", layout.channel().name());
    let circuit = layout.circuit(name, layout.min_qubits(), &ctx.coupling)?;
    let qubits = layout.tomography_qubits();
    info!(channel = %layout.channel().name(), ?qubits, "direct Choi experiment");

    let state = ctx
        .run(&[circuit], &qubits)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no state returned for the direct Choi circuit"))?;

    let measured = layout.choi(&state)?;
    let expected = build_choi_matrix(&theory, 3)?;
    let fidelity = fidelity(expected.as_matrix(), measured.as_matrix())?;
    Ok(ChoiReport {
        channel: layout.channel().name(),
        outputs: Vec::new(),
        measured,
        expected,
        fidelity,
    })
}

/// Trace of a Choi matrix, which is 1 for a trace-preserving channel.
pub fn choi_trace(choi: &ChoiMatrix) -> f64 {
    linalg::trace(choi.as_matrix()).re
}
