//! Channel circuits.
//!
//! Each [`Channel`] knows which relative qubits carry the system and which
//! the environment, how to emit its gates, and (where one exists) its
//! closed-form [`TheoryChannel`]. A [`ChannelInstance`] pins a channel to
//! device qubits through a [`QubitMask`].
//!
//! Qutrit channels encode `|0⟩, |1⟩, |2⟩` on the system pair `[a, b]` as
//! `|00⟩`, `a = 1` and `b = 1`.

use std::f64::consts::PI;

use qchannels_ir::{Circuit, QubitId};
use qchannels_theory::linalg::Matrix;

use crate::coupling::Coupling;
use crate::error::ChannelResult;
use crate::gates::OneQubitGates;
use crate::mask::QubitMask;
use crate::theory::{self, TheoryChannel};

/// A named channel with its circuit and, where known, its prediction.
#[derive(Debug, Clone, PartialEq)]
pub enum Channel {
    /// `ρ ↦ HρH` on one qubit.
    Hadamard,
    /// Does nothing. The system qubits and the dimension of the prediction
    /// are free.
    Identity { system: Vec<u32>, dim: usize },
    /// Landau–Streater channel on a qutrit held by qubits `[0, 3]`, with
    /// environment `[1, 2]`.
    LandauStreater,
    /// Werner–Holevo channel, same layout as Landau–Streater.
    WernerHolevo,
    /// Prepares `(|00⟩ + |01⟩ + |10⟩)/√3` from `|00⟩` on `[0, 1]`.
    QutritSuperposition,
    /// Independent `u3` rotations.
    OneQubitGates(OneQubitGates),
    /// Rotations on the inner channel's system qubits before and after it.
    Wrapped {
        before: OneQubitGates,
        channel: Box<Channel>,
        after: OneQubitGates,
    },
}

impl Channel {
    /// The identity on the qutrit pair `[0, 3]`.
    pub fn identity() -> Self {
        Channel::Identity {
            system: vec![0, 3],
            dim: 3,
        }
    }

    pub fn identity_on(system: Vec<u32>, dim: usize) -> Self {
        Channel::Identity { system, dim }
    }

    pub fn wrapped(before: OneQubitGates, channel: Channel, after: OneQubitGates) -> Self {
        Channel::Wrapped {
            before,
            channel: Box::new(channel),
            after,
        }
    }

    /// Kebab-case name, also used to label circuits.
    pub fn name(&self) -> String {
        match self {
            Channel::Hadamard => "hadamard".into(),
            Channel::Identity { .. } => "identity".into(),
            Channel::LandauStreater => "landau-streater".into(),
            Channel::WernerHolevo => "werner-holevo".into(),
            Channel::QutritSuperposition => "qutrit-superposition".into(),
            Channel::OneQubitGates(_) => "one-qubit-gates".into(),
            Channel::Wrapped { channel, .. } => format!("wrapped-{}", channel.name()),
        }
    }

    /// Relative qubits the channel acts on, in tensor-position order.
    pub fn system_qubits(&self) -> Vec<u32> {
        match self {
            Channel::Hadamard => vec![0],
            Channel::Identity { system, .. } => system.clone(),
            Channel::LandauStreater | Channel::WernerHolevo => vec![0, 3],
            Channel::QutritSuperposition => vec![0, 1],
            Channel::OneQubitGates(gates) => gates.system_qubits(),
            Channel::Wrapped { channel, .. } => channel.system_qubits(),
        }
    }

    /// Relative ancilla qubits, expected to start in `|0⟩`.
    pub fn env_qubits(&self) -> Vec<u32> {
        match self {
            Channel::LandauStreater | Channel::WernerHolevo => vec![1, 2],
            Channel::Wrapped { channel, .. } => channel.env_qubits(),
            _ => vec![],
        }
    }

    /// System qubits followed by environment qubits.
    pub fn qubits(&self) -> Vec<u32> {
        let mut qubits = self.system_qubits();
        qubits.extend(self.env_qubits());
        qubits
    }

    /// Closed-form prediction, if the channel has one.
    pub fn theory(&self) -> Option<TheoryChannel> {
        match self {
            Channel::Hadamard => Some(TheoryChannel::unitary(theory::hadamard_matrix())),
            Channel::Identity { dim, .. } => Some(TheoryChannel::new(*dim, Matrix::clone)),
            Channel::LandauStreater => Some(TheoryChannel::new(3, theory::landau_streater)),
            Channel::WernerHolevo => Some(TheoryChannel::new(3, theory::werner_holevo)),
            Channel::QutritSuperposition => None,
            Channel::OneQubitGates(gates) => Some(TheoryChannel::unitary(
                gates.unitary_on(&gates.system_qubits()),
            )),
            Channel::Wrapped {
                before,
                channel,
                after,
            } => {
                let system = channel.system_qubits();
                let before = TheoryChannel::unitary(before.unitary_on(&system));
                let after = TheoryChannel::unitary(after.unitary_on(&system));
                before.then(&channel.theory()?)?.then(&after)
            }
        }
    }

    /// Emit the channel's gates onto `circuit`.
    pub fn append_to(
        &self,
        circuit: &mut Circuit,
        mask: &QubitMask,
        coupling: &Coupling,
    ) -> ChannelResult<()> {
        let mut e = Emitter {
            circuit,
            mask,
            coupling,
        };
        match self {
            Channel::Hadamard => {
                e.h(0)?;
            }
            Channel::Identity { .. } => {}
            Channel::LandauStreater => {
                e.u2(PI, PI, 0)?.h(3)?;
                e.cnot(3, 2)?.cnot(2, 0)?.cnot(3, 2)?;
                e.u2(PI, PI, 0)?.h(3)?;
                spin_flip_core(&mut e)?;
            }
            Channel::WernerHolevo => {
                e.x(0)?;
                spin_flip_core(&mut e)?;
            }
            Channel::QutritSuperposition => {
                let theta = 2.0 * (1.0 / 3.0f64.sqrt()).acos();
                e.u3(theta, 0.0, 0.0, 0)?.u3(0.0, 0.0, -PI / 2.0, 1)?;
                e.cnot(0, 1)?;
                e.u3(PI / 4.0, 0.0, -PI / 2.0, 1)?;
                e.cnot(0, 1)?;
                e.u3(PI, 0.0, -PI / 2.0, 0)?.u3(PI / 4.0, 0.0, PI, 1)?;
            }
            Channel::OneQubitGates(gates) => {
                gates.append_on(e.circuit, mask, &gates.system_qubits())?;
            }
            Channel::Wrapped {
                before,
                channel,
                after,
            } => {
                let system = channel.system_qubits();
                before.append_on(e.circuit, mask, &system)?;
                channel.append_to(e.circuit, mask, coupling)?;
                after.append_on(e.circuit, mask, &system)?;
            }
        }
        Ok(())
    }

    /// Pin the channel to device qubits.
    pub fn with_mask(self, mask: QubitMask) -> ChannelResult<ChannelInstance> {
        ChannelInstance::new(self, mask)
    }
}

/// Gate sequence shared by the Landau–Streater and Werner–Holevo circuits.
/// The environment pair must start in `|00⟩`.
fn spin_flip_core(e: &mut Emitter<'_>) -> ChannelResult<()> {
    e.u2(0.0, 0.0, 1)?.u3(PI / 4.0, 0.0, 0.0, 2)?.y(3)?;

    e.cnot(1, 0)?.cnot(3, 2)?;
    e.h(0)?.u3(PI / 4.0, 0.0, PI, 2)?;
    e.cnot(2, 0)?;
    e.h(0)?.u3(PI / 4.0, 0.0, PI, 2)?;
    e.cnot(1, 0)?.cnot(3, 2)?;

    e.u3(PI / 4.0, 0.0, 0.0, 1)?.u3(-PI / 4.0, 0.0, 0.0, 2)?;
    e.cnot(2, 1)?;

    e.h(0)?.u3(PI / 4.0, 0.0, PI, 1)?;
    e.cnot(1, 0)?;
    e.u3(3.0 * PI / 4.0, 0.0, PI, 0)?.u3(PI / 4.0, 0.0, PI, 1)?;
    e.cnot(2, 1)?;

    e.u3(-PI / 4.0, 0.0, 0.0, 1)?.h(2)?.h(3)?;
    e.cnot(3, 2)?;
    e.h(3)?.u2(0.0, 0.0, 2)?;

    e.cnot(2, 0)?.u3(PI / 4.0, 0.0, 0.0, 0)?;
    e.cnot(1, 0)?.u3(-PI / 4.0, 0.0, 0.0, 0)?;
    e.cnot(2, 0)?.u3(-PI / 4.0, 0.0, 0.0, 0)?;
    Ok(())
}

/// Emits gates on relative qubits through a mask and coupling policy.
struct Emitter<'a> {
    circuit: &'a mut Circuit,
    mask: &'a QubitMask,
    coupling: &'a Coupling,
}

impl Emitter<'_> {
    fn q(&self, rel: u32) -> QubitId {
        QubitId(self.mask.resolve(rel))
    }

    fn h(&mut self, rel: u32) -> ChannelResult<&mut Self> {
        let q = self.q(rel);
        self.circuit.h(q)?;
        Ok(self)
    }

    fn x(&mut self, rel: u32) -> ChannelResult<&mut Self> {
        let q = self.q(rel);
        self.circuit.x(q)?;
        Ok(self)
    }

    fn y(&mut self, rel: u32) -> ChannelResult<&mut Self> {
        let q = self.q(rel);
        self.circuit.y(q)?;
        Ok(self)
    }

    fn u2(&mut self, phi: f64, lambda: f64, rel: u32) -> ChannelResult<&mut Self> {
        let q = self.q(rel);
        self.circuit.u2(phi, lambda, q)?;
        Ok(self)
    }

    fn u3(&mut self, theta: f64, phi: f64, lambda: f64, rel: u32) -> ChannelResult<&mut Self> {
        let q = self.q(rel);
        self.circuit.u3(theta, phi, lambda, q)?;
        Ok(self)
    }

    fn cnot(&mut self, control: u32, target: u32) -> ChannelResult<&mut Self> {
        let (c, t) = (self.q(control), self.q(target));
        self.coupling.cnot(self.circuit, c, t)?;
        Ok(self)
    }
}

/// A channel placed on device qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInstance {
    channel: Channel,
    mask: QubitMask,
}

impl ChannelInstance {
    /// Fails when the mask sends two of the channel's qubits to one place.
    pub fn new(channel: Channel, mask: QubitMask) -> ChannelResult<Self> {
        mask.check_injective(&channel.qubits())?;
        Ok(Self { channel, mask })
    }

    /// The channel with the identity mask.
    pub fn unmasked(channel: Channel) -> Self {
        Self {
            channel,
            mask: QubitMask::new(),
        }
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn mask(&self) -> &QubitMask {
        &self.mask
    }

    pub fn name(&self) -> String {
        self.channel.name()
    }

    /// Absolute system qubits.
    pub fn system_qubits(&self) -> Vec<u32> {
        self.mask.resolve_all(&self.channel.system_qubits())
    }

    /// Absolute environment qubits.
    pub fn env_qubits(&self) -> Vec<u32> {
        self.mask.resolve_all(&self.channel.env_qubits())
    }

    /// Highest absolute qubit used, plus one.
    pub fn min_qubits(&self) -> u32 {
        self.mask
            .resolve_all(&self.channel.qubits())
            .into_iter()
            .max()
            .map_or(0, |q| q + 1)
    }

    pub fn theory(&self) -> Option<TheoryChannel> {
        self.channel.theory()
    }

    /// Emit the channel's gates onto an existing circuit.
    pub fn append_to(&self, circuit: &mut Circuit, coupling: &Coupling) -> ChannelResult<()> {
        self.channel.append_to(circuit, &self.mask, coupling)
    }

    /// A fresh `num_qubits`-wide circuit holding only this channel.
    pub fn circuit(
        &self,
        name: impl Into<String>,
        num_qubits: u32,
        coupling: &Coupling,
    ) -> ChannelResult<Circuit> {
        let mut circuit = Circuit::with_size(name, num_qubits, 0);
        self.append_to(&mut circuit, coupling)?;
        Ok(circuit)
    }
}
