//! Backend capability introspection.
//!
//! [`Capabilities`] describe what a backend accepts: qubit count, gate set,
//! connectivity and per-job limits. The tomography launcher sizes its chunks
//! from them, and channel circuits consult the [`Topology`] when placing
//! CNOTs.
//!
//! Edges of a [`TopologyKind::Directed`] topology are `(control, target)`
//! pairs. For every other kind edges are bidirectional.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a quantum backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the backend.
    pub name: String,
    /// Number of qubits available.
    pub num_qubits: u32,
    /// Supported gate set (OpenQASM naming).
    pub gate_set: GateSet,
    /// Qubit connectivity.
    pub topology: Topology,
    /// Maximum number of shots per experiment.
    pub max_shots: u32,
    /// Maximum number of circuits per job. `None` means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_experiments: Option<u32>,
    /// Whether this is a simulator (`true`) or real hardware (`false`).
    pub is_simulator: bool,
    /// Additional capability flags such as `"statevector"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// Create capabilities for an all-to-all simulator.
    pub fn simulator(num_qubits: u32) -> Self {
        Self {
            name: "simulator".into(),
            num_qubits,
            gate_set: GateSet::universal(),
            topology: Topology::full(num_qubits),
            max_shots: 1_000_000,
            max_experiments: None,
            is_simulator: true,
            features: vec!["statevector".into()],
        }
    }

    /// The 5-qubit IBM QX4 device ("Tenerife").
    ///
    /// CNOTs are only native along the directed coupling map
    /// `1→0, 2→0, 2→1, 3→2, 3→4, 4→2`.
    pub fn ibmqx4() -> Self {
        Self {
            name: "ibmqx4".into(),
            num_qubits: 5,
            gate_set: GateSet::ibmqx(),
            topology: Topology::directed(vec![(1, 0), (2, 0), (2, 1), (3, 2), (3, 4), (4, 2)]),
            max_shots: 8192,
            max_experiments: Some(70),
            is_simulator: false,
            features: vec![],
        }
    }

    /// The 14-qubit IBM Q Melbourne device, a 2×7 ladder.
    pub fn ibmq_16_melbourne() -> Self {
        Self {
            name: "ibmq_16_melbourne".into(),
            num_qubits: 14,
            gate_set: GateSet::ibmqx(),
            topology: Topology::directed(vec![
                (1, 0),
                (1, 2),
                (2, 3),
                (4, 3),
                (4, 10),
                (5, 4),
                (5, 6),
                (5, 9),
                (6, 8),
                (7, 8),
                (9, 8),
                (9, 10),
                (11, 3),
                (11, 10),
                (11, 12),
                (12, 2),
                (13, 1),
                (13, 12),
            ]),
            max_shots: 8192,
            max_experiments: Some(75),
            is_simulator: false,
            features: vec![],
        }
    }

    /// Replace the topology.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Rename the descriptor.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Gate set supported by a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Native gates (execute without decomposition on this backend).
    pub native: Vec<String>,
}

impl GateSet {
    /// Every gate of the circuit IR.
    pub fn universal() -> Self {
        Self {
            single_qubit: [
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "rx", "ry", "rz", "p", "u",
            ]
            .map(String::from)
            .to_vec(),
            two_qubit: ["cx", "cz", "swap"].map(String::from).to_vec(),
            native: vec![],
        }
    }

    /// Gate set of the IBM QX devices: any single-qubit gate compiles to
    /// `u`, and CNOT is the only entangling gate.
    pub fn ibmqx() -> Self {
        Self {
            single_qubit: [
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "rx", "ry", "rz", "p", "u",
            ]
            .map(String::from)
            .to_vec(),
            two_qubit: vec!["cx".into()],
            native: vec!["u".into(), "cx".into()],
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate is native (executes without decomposition).
    ///
    /// An empty `native` list means every supported gate is native.
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }
}

/// Qubit connectivity topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    /// Kind of topology.
    pub kind: TopologyKind,
    /// Coupling edges.
    pub edges: Vec<(u32, u32)>,
}

impl Topology {
    /// Create a fully connected topology.
    pub fn full(n: u32) -> Self {
        let mut edges = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        Self {
            kind: TopologyKind::FullyConnected,
            edges,
        }
    }

    /// Create a linear chain.
    pub fn linear(n: u32) -> Self {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Self {
            kind: TopologyKind::Linear,
            edges,
        }
    }

    /// Create a custom bidirectional topology from edges.
    pub fn custom(edges: Vec<(u32, u32)>) -> Self {
        Self {
            kind: TopologyKind::Custom,
            edges,
        }
    }

    /// Create a directed coupling map of `(control, target)` pairs.
    pub fn directed(edges: Vec<(u32, u32)>) -> Self {
        Self {
            kind: TopologyKind::Directed,
            edges,
        }
    }

    /// Whether every pair of qubits interacts directly.
    pub fn is_all_to_all(&self) -> bool {
        self.kind == TopologyKind::FullyConnected
    }

    /// Check if two qubits share an edge, in either direction.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.is_all_to_all()
            || self
                .edges
                .iter()
                .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
    }

    /// Whether a CNOT with this control and target runs natively.
    pub fn allows(&self, control: u32, target: u32) -> bool {
        match self.kind {
            TopologyKind::Directed => self.edges.contains(&(control, target)),
            _ => self.is_connected(control, target),
        }
    }
}

/// Kind of qubit topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyKind {
    /// Fully connected (all-to-all).
    FullyConnected,
    /// Linear chain.
    Linear,
    /// Custom bidirectional edges.
    Custom,
    /// Directed `(control, target)` coupling map.
    Directed,
}
