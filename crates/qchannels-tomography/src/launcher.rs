//! Batched tomography runs.
//!
//! A run goes through four phases:
//!
//! ```text
//!   Expanding ──→ Dispatching{1/n} ──→ … ──→ Dispatching{n/n} ──→ Reassembling ──→ Done
//! ```
//!
//! Every input circuit is expanded into `3^k` measurement circuits. The
//! whole list is cut into chunks no larger than the backend accepts per job,
//! and each chunk is submitted and awaited before the next one goes out.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use qchannels_hal::{
    Backend, BackendConfig, BackendRegistry, Counts, ExperimentResult, HalError, ValidationResult,
};
use qchannels_ir::Circuit;
use qchannels_theory::{DensityMatrix, PermutationCorrection, sort_with_permutation};
use tracing::{debug, info, instrument};

use crate::circuits::{measurement_circuit_name, measurement_circuits};
use crate::error::{TomographyError, TomographyResult};
use crate::fitter::{LinearInversionFitter, TomographyFitter};
use crate::settings::{MeasurementSetting, measurement_settings};

/// Per-job experiment limit assumed for hardware that does not state one.
pub const MAX_JOBS_PER_CHUNK: usize = 70;

/// Chunk size on simulators, large enough to send any batch at once.
pub const SIMULATOR_CHUNK_SIZE: usize = 1_000_000;

/// Knobs of a tomography run.
#[derive(Debug, Clone, PartialEq)]
pub struct LauncherConfig {
    /// Shots per measurement circuit.
    pub shots: u32,
    /// Credit cap per job on metered backends.
    pub max_credits: Option<u32>,
    /// Overrides the chunk size derived from the backend.
    pub max_jobs_per_chunk: Option<usize>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            shots: 8192,
            max_credits: Some(15),
            max_jobs_per_chunk: None,
        }
    }
}

impl LauncherConfig {
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_max_credits(mut self, max_credits: Option<u32>) -> Self {
        self.max_credits = max_credits;
        self
    }

    pub fn with_max_jobs_per_chunk(mut self, max_jobs: usize) -> Self {
        self.max_jobs_per_chunk = Some(max_jobs);
        self
    }
}

/// Where a run currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPhase {
    /// Building measurement circuits.
    Expanding,
    /// Waiting on chunk `chunk` (1-based) of `of`.
    Dispatching { chunk: usize, of: usize },
    /// Fitting states from the returned counts.
    Reassembling,
    Done,
}

impl fmt::Display for LaunchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaunchPhase::Expanding => write!(f, "Expanding measurement circuits"),
            LaunchPhase::Dispatching { chunk, of } => write!(f, "Running chunk {chunk}/{of}"),
            LaunchPhase::Reassembling => write!(f, "Fitting states"),
            LaunchPhase::Done => write!(f, "Done"),
        }
    }
}

type Observer = Box<dyn Fn(&LaunchPhase) + Send + Sync>;

/// Runs state tomography for batches of circuits on one backend.
pub struct Launcher {
    backend: Arc<dyn Backend>,
    config: LauncherConfig,
    fitter: Box<dyn TomographyFitter>,
    observer: Option<Observer>,
}

impl Launcher {
    /// Launch on an existing backend, fitting with [`LinearInversionFitter`].
    pub fn new(backend: Arc<dyn Backend>, config: LauncherConfig) -> Self {
        Self {
            backend,
            config,
            fitter: Box::new(LinearInversionFitter::new()),
            observer: None,
        }
    }

    /// Construct the backend `name` from `registry`.
    pub fn from_registry(
        registry: &BackendRegistry,
        name: &str,
        backend_config: BackendConfig,
        config: LauncherConfig,
    ) -> TomographyResult<Self> {
        let backend = registry.create(name, backend_config)?;
        Ok(Self::new(Arc::from(backend), config))
    }

    pub fn with_fitter(mut self, fitter: impl TomographyFitter + 'static) -> Self {
        self.fitter = Box::new(fitter);
        self
    }

    /// Call `observer` on every phase change.
    pub fn with_observer(mut self, observer: impl Fn(&LaunchPhase) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    /// Circuits per submitted job.
    pub fn chunk_size(&self) -> usize {
        if let Some(n) = self.config.max_jobs_per_chunk {
            return n.max(1);
        }
        let caps = self.backend.capabilities();
        if caps.is_simulator {
            SIMULATOR_CHUNK_SIZE
        } else {
            caps.max_experiments
                .map_or(MAX_JOBS_PER_CHUNK, |n| (n as usize).max(1))
        }
    }

    fn enter(&self, phase: LaunchPhase) {
        debug!(%phase, "launcher phase");
        if let Some(observer) = &self.observer {
            observer(&phase);
        }
    }

    /// Reconstruct the state of `qubits` at the end of each circuit.
    ///
    /// The returned states are laid out with `qubits[0]` as the least
    /// significant tensor position, one per input circuit in input order.
    #[instrument(skip_all, fields(backend = self.backend.name(), circuits = circuits.len(), qubits = ?qubits))]
    pub async fn run(&self, circuits: &[Circuit], qubits: &[u32]) -> TomographyResult<Vec<DensityMatrix>> {
        check_unique_names(circuits)?;
        let correction = sort_with_permutation(qubits)
            .map_err(|e| TomographyError::InvalidQubits(e.to_string()))?;

        self.enter(LaunchPhase::Expanding);
        let settings = measurement_settings(qubits.len());
        let mut jobs = Vec::with_capacity(circuits.len() * settings.len());
        for circuit in circuits {
            jobs.extend(measurement_circuits(circuit, correction.sorted(), &settings)?);
        }

        let results = self.dispatch(&jobs).await?;

        self.enter(LaunchPhase::Reassembling);
        let states = self.reassemble(circuits, &settings, &correction, results)?;

        self.enter(LaunchPhase::Done);
        info!(states = states.len(), "tomography complete");
        Ok(states)
    }

    /// Submit `jobs` chunk by chunk, returning results in submission order.
    async fn dispatch(&self, jobs: &[Circuit]) -> TomographyResult<Vec<ExperimentResult>> {
        let chunk_size = self.chunk_size();
        let of = jobs.len().div_ceil(chunk_size);
        info!(jobs = jobs.len(), chunks = of, chunk_size, "dispatching");

        let mut results = Vec::with_capacity(jobs.len());
        for (index, chunk) in jobs.chunks(chunk_size).enumerate() {
            self.enter(LaunchPhase::Dispatching { chunk: index + 1, of });
            let experiments = self
                .run_chunk(chunk)
                .await
                .map_err(|source| TomographyError::Backend { chunk: index, source })?;
            results.extend(experiments);
        }
        Ok(results)
    }

    async fn run_chunk(&self, chunk: &[Circuit]) -> Result<Vec<ExperimentResult>, HalError> {
        if let ValidationResult::Invalid { reasons } = self.backend.validate(chunk).await? {
            return Err(HalError::InvalidCircuit(reasons.join("; ")));
        }
        let job_id = self
            .backend
            .submit(chunk, self.config.shots, self.config.max_credits)
            .await?;
        debug!(%job_id, circuits = chunk.len(), "chunk submitted");
        let result = self.backend.wait(&job_id).await?;
        Ok(result.experiments)
    }

    fn reassemble(
        &self,
        circuits: &[Circuit],
        settings: &[MeasurementSetting],
        correction: &PermutationCorrection,
        results: Vec<ExperimentResult>,
    ) -> TomographyResult<Vec<DensityMatrix>> {
        let group = settings.len();
        if results.len() % group != 0 || results.len() != circuits.len() * group {
            return Err(TomographyError::Reassembly(format!(
                "got {} results for {} circuits of {group} settings each",
                results.len(),
                circuits.len()
            )));
        }

        // Measurement circuits read sorted qubit `j` into clbit `j`; parents
        // may carry wider registers.
        let measured: Vec<usize> = (0..correction.sorted().len()).collect();
        let mut results = results.into_iter();
        let mut states = Vec::with_capacity(circuits.len());
        for circuit in circuits {
            let mut counts: Vec<Counts> = Vec::with_capacity(group);
            for setting in settings {
                let expected = measurement_circuit_name(circuit.name(), setting);
                let result = results
                    .next()
                    .ok_or_else(|| TomographyError::Reassembly("result list ended early".into()))?;
                if result.name != expected {
                    return Err(TomographyError::Reassembly(format!(
                        "expected result '{expected}', found '{}'",
                        result.name
                    )));
                }
                let marginal = result.counts.marginal(&measured).ok_or_else(|| {
                    TomographyError::Reassembly(format!(
                        "result '{expected}' has outcomes narrower than {} clbits",
                        measured.len()
                    ))
                })?;
                counts.push(marginal);
            }
            let sorted = self.fitter.fit(settings, &counts)?;
            let rho = correction.correct(sorted.as_matrix())?;
            states.push(DensityMatrix::new(rho)?);
        }
        Ok(states)
    }
}

impl fmt::Debug for Launcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn check_unique_names(circuits: &[Circuit]) -> TomographyResult<()> {
    let mut seen = HashSet::with_capacity(circuits.len());
    for circuit in circuits {
        if !seen.insert(circuit.name()) {
            return Err(TomographyError::DuplicateName {
                name: circuit.name().to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LauncherConfig::default();
        assert_eq!(config.shots, 8192);
        assert_eq!(config.max_credits, Some(15));
        assert_eq!(config.max_jobs_per_chunk, None);

        let config = config.with_shots(100).with_max_jobs_per_chunk(5);
        assert_eq!(config.shots, 100);
        assert_eq!(config.max_jobs_per_chunk, Some(5));
    }

    #[test]
    fn test_duplicate_names() {
        let circuits = [
            Circuit::new("a"),
            Circuit::new("b"),
            Circuit::new("a"),
        ];
        let err = check_unique_names(&circuits).unwrap_err();
        assert!(matches!(err, TomographyError::DuplicateName { name } if name == "a"));
        assert!(check_unique_names(&circuits[..2]).is_ok());
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(
            LaunchPhase::Dispatching { chunk: 2, of: 4 }.to_string(),
            "Running chunk 2/4"
        );
    }
}
