//! Simulator backend implementation.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, instrument};
use uuid::Uuid;

use qchannels_hal::{
    Backend, BackendAvailability, BackendConfig, BackendFactory, Capabilities, Counts,
    ExecutionResult, ExperimentResult, HalError, HalResult, Job, JobId, JobStatus,
    ValidationResult,
};
use qchannels_ir::Circuit;

use crate::sampling::{Sampler, SamplingMode};
use crate::statevector::{Statevector, value_to_bitstring};

/// Default register size of the plain simulator.
pub const DEFAULT_MAX_QUBITS: u32 = 20;

/// Job data for the simulator.
struct SimJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Local statevector simulator.
///
/// By default it accepts any gate on any qubit pair. Built with
/// [`SimulatorBackend::emulating`], it instead enforces a device's qubit
/// count, gate set, CNOT directions and batch limit, so circuits prepared for
/// hardware can be checked and run locally.
pub struct SimulatorBackend {
    /// Backend configuration.
    config: BackendConfig,
    /// Cached capabilities.
    capabilities: Capabilities,
    /// Active jobs.
    jobs: Arc<Mutex<FxHashMap<String, SimJob>>>,
    sampler: Sampler,
}

impl SimulatorBackend {
    /// Create a new simulator backend with default settings.
    pub fn new() -> Self {
        Self::with_max_qubits(DEFAULT_MAX_QUBITS)
    }

    /// Create a simulator with custom max qubits.
    pub fn with_max_qubits(max_qubits: u32) -> Self {
        Self::from_parts(
            BackendConfig::new("simulator"),
            Capabilities::simulator(max_qubits),
            SamplingMode::Random,
        )
    }

    /// Behave like the device `capabilities` describes.
    pub fn emulating(capabilities: Capabilities) -> Self {
        let config = BackendConfig::new(capabilities.name.clone());
        Self::from_parts(config, capabilities, SamplingMode::Random)
    }

    /// Replace the sampling mode.
    pub fn with_sampling(mut self, mode: SamplingMode) -> Self {
        self.sampler = Sampler::new(mode);
        self
    }

    pub fn sampling(&self) -> SamplingMode {
        self.sampler.mode()
    }

    fn from_parts(config: BackendConfig, capabilities: Capabilities, mode: SamplingMode) -> Self {
        Self {
            config,
            capabilities,
            jobs: Arc::new(Mutex::new(FxHashMap::default())),
            sampler: Sampler::new(mode),
        }
    }

    fn check_batch(&self, circuits: &[Circuit]) -> HalResult<()> {
        if let Some(max) = self.capabilities.max_experiments {
            if circuits.len() > max as usize {
                return Err(HalError::BatchTooLarge {
                    experiments: circuits.len(),
                    max: max as usize,
                });
            }
        }
        Ok(())
    }

    fn check_circuit(&self, circuit: &Circuit) -> HalResult<()> {
        let caps = &self.capabilities;
        if circuit.num_qubits() > caps.num_qubits as usize {
            return Err(HalError::CircuitTooLarge(format!(
                "{}: {} qubits but {} supports {}",
                circuit.name(),
                circuit.num_qubits(),
                caps.name,
                caps.num_qubits
            )));
        }
        for inst in circuit.instructions() {
            let Some(gate) = inst.as_gate() else { continue };
            if !caps.gate_set.contains(gate.name()) {
                return Err(HalError::InvalidCircuit(format!(
                    "{}: gate '{}' is not supported by {}",
                    circuit.name(),
                    gate.name(),
                    caps.name
                )));
            }
            if gate.num_qubits() == 2 {
                let (a, b) = (inst.qubits[0].0, inst.qubits[1].0);
                if !caps.topology.allows(a, b) {
                    return Err(HalError::InvalidCircuit(format!(
                        "{}: {} {} -> {} is not on the coupling map of {}",
                        circuit.name(),
                        gate.name(),
                        a,
                        b,
                        caps.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Run one circuit and draw `shots` samples of its classical register.
    ///
    /// A circuit without measurements reads every qubit, qubit `q` into bit `q`.
    fn run_circuit(&self, circuit: &Circuit, shots: u32) -> ExperimentResult {
        let sv = Statevector::from_circuit(circuit);

        let mut measures: Vec<(usize, usize)> = circuit
            .measurements()
            .map(|(q, c)| (q.index(), c.index()))
            .collect();
        let mut width = circuit.num_clbits();
        if measures.is_empty() {
            width = circuit.num_qubits();
            measures = (0..width).map(|q| (q, q)).collect();
        }

        let probs = sv.clbit_distribution(&measures, width);
        let counts: Counts = self
            .sampler
            .sample(&probs, shots)
            .into_iter()
            .enumerate()
            .filter(|&(_, n)| n > 0)
            .map(|(value, n)| (value_to_bitstring(value, width), n))
            .collect();
        ExperimentResult::new(circuit.name(), counts, shots)
    }

    /// Run a batch synchronously.
    #[instrument(skip_all, fields(circuits = circuits.len(), shots = shots))]
    fn run_batch(&self, circuits: &[Circuit], shots: u32) -> ExecutionResult {
        let start = Instant::now();
        let experiments = circuits.iter().map(|c| self.run_circuit(c, shots)).collect();
        let elapsed = start.elapsed();
        debug!("Batch simulated in {:?}", elapsed);
        ExecutionResult::new(experiments).with_execution_time(elapsed.as_millis() as u64)
    }

    fn update_job(&self, job_id: &JobId, f: impl FnOnce(&mut SimJob)) {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            f(sim_job);
        }
    }
}

impl Default for SimulatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for SimulatorBackend {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    async fn availability(&self) -> HalResult<BackendAvailability> {
        Ok(BackendAvailability::always_available())
    }

    async fn validate(&self, circuits: &[Circuit]) -> HalResult<ValidationResult> {
        let mut reasons: Vec<String> = Vec::new();
        if let Err(e) = self.check_batch(circuits) {
            reasons.push(e.to_string());
        }
        reasons.extend(
            circuits
                .iter()
                .filter_map(|c| self.check_circuit(c).err())
                .map(|e| e.to_string()),
        );
        if reasons.is_empty() {
            Ok(ValidationResult::Valid)
        } else {
            Ok(ValidationResult::Invalid { reasons })
        }
    }

    #[instrument(skip(self, circuits), fields(circuits = circuits.len()))]
    async fn submit(
        &self,
        circuits: &[Circuit],
        shots: u32,
        max_credits: Option<u32>,
    ) -> HalResult<JobId> {
        if shots == 0 || shots > self.capabilities.max_shots {
            return Err(HalError::InvalidShots(format!(
                "{shots} shots requested, {} accepts 1 to {}",
                self.capabilities.name, self.capabilities.max_shots
            )));
        }
        self.check_batch(circuits)?;
        for circuit in circuits {
            self.check_circuit(circuit)?;
        }

        let job_id = JobId::new(Uuid::new_v4().to_string());
        let job = Job::new(job_id.clone(), circuits.len(), shots)
            .with_backend(self.name())
            .with_max_credits(max_credits)
            .with_status(JobStatus::Running);

        {
            let mut jobs = self
                .jobs
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            jobs.insert(job_id.0.clone(), SimJob { job, result: None });
        }
        debug!("Submitted job: {}", job_id);

        let result = self.run_batch(circuits, shots);
        self.update_job(&job_id, |sim_job| {
            sim_job.result = Some(result);
            sim_job.job = sim_job.job.clone().with_status(JobStatus::Completed);
        });

        Ok(job_id)
    }

    async fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|j| j.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    async fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let sim_job = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match (&sim_job.job.status, &sim_job.result) {
            (JobStatus::Completed, Some(result)) => Ok(result.clone()),
            (status, _) => Err(HalError::Backend(format!(
                "job {job_id} has no result (status: {status})"
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(sim_job) = jobs.get_mut(&job_id.0) {
            if !sim_job.job.status.is_terminal() {
                sim_job.job = sim_job.job.clone().with_status(JobStatus::Cancelled);
            }
            Ok(())
        } else {
            Err(HalError::JobNotFound(job_id.0.clone()))
        }
    }
}

impl BackendFactory for SimulatorBackend {
    /// Reads `device` (`"ibmqx4"` or `"ibmq_16_melbourne"`), `max_qubits`,
    /// `seed` and `exact` from the extra settings.
    fn from_config(config: BackendConfig) -> HalResult<Self> {
        let capabilities = match config.extra.get("device").and_then(|v| v.as_str()) {
            None => Capabilities::simulator(
                config
                    .extra_u64("max_qubits")
                    .map_or(DEFAULT_MAX_QUBITS, |v| v as u32),
            ),
            Some("ibmqx4") => Capabilities::ibmqx4(),
            Some("ibmq_16_melbourne") => Capabilities::ibmq_16_melbourne(),
            Some(other) => {
                return Err(HalError::Configuration(format!(
                    "unknown device '{other}' to emulate"
                )));
            }
        };

        let mode = if config.extra_bool("exact").unwrap_or(false) {
            SamplingMode::Exact
        } else if let Some(seed) = config.extra_u64("seed") {
            SamplingMode::Seeded(seed)
        } else {
            SamplingMode::Random
        };

        Ok(Self::from_parts(config, capabilities, mode))
    }
}
