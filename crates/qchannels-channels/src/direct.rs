//! The direct Choi experiment.
//!
//! A qutrit channel's Choi state is prepared in a single circuit: the
//! channel's system pair is put in `(|0⟩+|1⟩+|2⟩)/√3`, copied onto an idle
//! identity pair with two CNOTs, and then sent through the channel. Two-qubit
//! tomography of both pairs gives a 16×16 state whose qutrit-qutrit block is
//! the Choi matrix.

use qchannels_ir::{Circuit, QubitId};
use qchannels_theory::linalg;
use qchannels_theory::{ChoiMatrix, DensityMatrix};

use crate::channel::{Channel, ChannelInstance};
use crate::coupling::Coupling;
use crate::error::{ChannelError, ChannelResult};
use crate::mask::QubitMask;

/// Rows and columns of the two-pair state outside the qutrit subspace.
pub const DIRECT_CHOI_DROPPED: [usize; 7] = [3, 7, 11, 15, 12, 13, 14];

/// Placement of a qutrit channel and its identity partner on the device.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectChoi {
    channel: ChannelInstance,
    identity: ChannelInstance,
}

impl DirectChoi {
    /// Fails unless the channel acts on two qubits disjoint from the
    /// identity pair.
    pub fn new(channel: ChannelInstance, identity: ChannelInstance) -> ChannelResult<Self> {
        for (role, instance) in [("channel", &channel), ("identity", &identity)] {
            let system = instance.system_qubits();
            if system.len() != 2 {
                return Err(ChannelError::Layout(format!(
                    "{role} '{}' acts on {} qubits, a qutrit pair needs 2",
                    instance.name(),
                    system.len()
                )));
            }
        }
        let mut used = channel.system_qubits();
        used.extend(channel.env_qubits());
        if let Some(q) = identity.system_qubits().iter().find(|q| used.contains(q)) {
            return Err(ChannelError::Layout(format!(
                "identity pair overlaps '{}' on qubit {q}",
                channel.name()
            )));
        }
        Ok(Self { channel, identity })
    }

    /// Layout for a simulator: identity on `[0, 1]`, channel on `3, 2`
    /// with its environment on `8, 7`.
    pub fn simulator(channel: Channel) -> ChannelResult<Self> {
        Self::with_masks(
            channel,
            QubitMask::new().with(0, 0).with(1, 1),
            QubitMask::new().with(3, 2).with(0, 3).with(2, 7).with(1, 8),
        )
    }

    /// Layout for a 20-qubit device: identity on `[6, 7]`, channel on
    /// `12, 11` with its environment on `17, 16`.
    pub fn hardware(channel: Channel) -> ChannelResult<Self> {
        Self::with_masks(
            channel,
            QubitMask::new().with(0, 6).with(1, 7),
            QubitMask::new().with(3, 11).with(0, 12).with(2, 16).with(1, 17),
        )
    }

    /// Identity on relative `[0, 1]` under `identity_mask`, channel under
    /// `channel_mask`.
    pub fn with_masks(
        channel: Channel,
        identity_mask: QubitMask,
        channel_mask: QubitMask,
    ) -> ChannelResult<Self> {
        let identity = Channel::identity_on(vec![0, 1], 3).with_mask(identity_mask)?;
        Self::new(channel.with_mask(channel_mask)?, identity)
    }

    pub fn channel(&self) -> &ChannelInstance {
        &self.channel
    }

    pub fn identity(&self) -> &ChannelInstance {
        &self.identity
    }

    /// Channel system qubits followed by identity system qubits.
    pub fn tomography_qubits(&self) -> Vec<u32> {
        let mut qubits = self.channel.system_qubits();
        qubits.extend(self.identity.system_qubits());
        qubits
    }

    /// Highest absolute qubit used, plus one.
    pub fn min_qubits(&self) -> u32 {
        self.channel.min_qubits().max(self.identity.min_qubits())
    }

    /// Preparation, copy and channel on a fresh `num_qubits`-wide circuit.
    pub fn circuit(
        &self,
        name: impl Into<String>,
        num_qubits: u32,
        coupling: &Coupling,
    ) -> ChannelResult<Circuit> {
        let system = self.channel.system_qubits();
        let copy = self.identity.system_qubits();

        let prep = Channel::QutritSuperposition
            .with_mask(QubitMask::new().with(0, system[0]).with(1, system[1]))?;
        let mut circuit = prep.circuit(name, num_qubits, coupling)?;
        for (&from, &to) in system.iter().zip(&copy) {
            coupling.cnot(&mut circuit, QubitId(from), QubitId(to))?;
        }
        self.identity.append_to(&mut circuit, coupling)?;
        self.channel.append_to(&mut circuit, coupling)?;
        Ok(circuit)
    }

    /// Choi matrix from the tomographic state of [`Self::tomography_qubits`].
    pub fn choi(&self, state: &DensityMatrix) -> ChannelResult<ChoiMatrix> {
        if state.dim() != 16 {
            return Err(ChannelError::Layout(format!(
                "direct Choi state must be 16-dimensional, got {}",
                state.dim()
            )));
        }
        let block = linalg::remove_indices(state.as_matrix(), &DIRECT_CHOI_DROPPED);
        Ok(ChoiMatrix::from_matrix(block)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_layout() {
        let layout = DirectChoi::simulator(Channel::LandauStreater).unwrap();
        assert_eq!(layout.channel().system_qubits(), vec![3, 2]);
        assert_eq!(layout.channel().env_qubits(), vec![8, 7]);
        assert_eq!(layout.tomography_qubits(), vec![3, 2, 0, 1]);
        assert_eq!(layout.min_qubits(), 9);

        let circuit = layout
            .circuit("ls", 9, &Coupling::all_to_all())
            .unwrap();
        assert_eq!(circuit.num_qubits(), 9);
        assert_eq!(circuit.name(), "ls");
    }

    #[test]
    fn test_hardware_layout() {
        let layout = DirectChoi::hardware(Channel::WernerHolevo).unwrap();
        assert_eq!(layout.tomography_qubits(), vec![12, 11, 6, 7]);
        assert_eq!(layout.min_qubits(), 18);
    }

    #[test]
    fn test_rejects_bad_layouts() {
        let err = DirectChoi::simulator(Channel::Hadamard).unwrap_err();
        assert!(matches!(err, ChannelError::Layout(_)));

        let err = DirectChoi::with_masks(
            Channel::LandauStreater,
            QubitMask::new().with(0, 1).with(1, 4),
            QubitMask::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ChannelError::Layout(msg) if msg.contains("qubit 1")));
    }

    #[test]
    fn test_choi_keeps_qutrit_rows() {
        let layout = DirectChoi::simulator(Channel::identity()).unwrap();
        let mixed = DensityMatrix::new(linalg::identity(16).mapv(|z| z / 16.0)).unwrap();
        let choi = layout.choi(&mixed).unwrap();
        assert_eq!(choi.dim(), 3);

        let small = DensityMatrix::new(linalg::identity(4).mapv(|z| z / 4.0)).unwrap();
        assert!(matches!(layout.choi(&small), Err(ChannelError::Layout(_))));
    }
}
