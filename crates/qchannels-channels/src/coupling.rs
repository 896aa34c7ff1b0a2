//! CNOT placement on devices with restricted connectivity.

use qchannels_hal::{Capabilities, Topology};
use qchannels_ir::{Circuit, QubitId};
use tracing::trace;

use crate::error::{ChannelError, ChannelResult};

/// Decides how a CNOT is emitted for a given device.
///
/// - all-to-all, or the edge `control → target` exists: a plain `cx`;
/// - only `target → control` exists: the reversed CNOT conjugated by
///   Hadamards on both qubits;
/// - otherwise: [`ChannelError::Placement`].
#[derive(Debug, Clone)]
pub struct Coupling {
    topology: Option<Topology>,
}

impl Coupling {
    /// Every CNOT is native.
    pub fn all_to_all() -> Self {
        Self { topology: None }
    }

    /// Place CNOTs on an explicit topology.
    pub fn from_topology(topology: Topology) -> Self {
        if topology.is_all_to_all() {
            Self::all_to_all()
        } else {
            Self {
                topology: Some(topology),
            }
        }
    }

    /// Place CNOTs on the device a backend describes.
    pub fn from_capabilities(capabilities: &Capabilities) -> Self {
        Self::from_topology(capabilities.topology.clone())
    }

    pub fn is_all_to_all(&self) -> bool {
        self.topology.is_none()
    }

    /// Append `CNOT(control, target)` to `circuit`.
    pub fn cnot(&self, circuit: &mut Circuit, control: QubitId, target: QubitId) -> ChannelResult<()> {
        let Some(topology) = &self.topology else {
            circuit.cx(control, target)?;
            return Ok(());
        };

        if topology.allows(control.0, target.0) {
            circuit.cx(control, target)?;
        } else if topology.allows(target.0, control.0) {
            trace!("reversing CNOT {} -> {}", control, target);
            circuit
                .h(control)?
                .h(target)?
                .cx(target, control)?
                .h(control)?
                .h(target)?;
        } else {
            return Err(ChannelError::Placement {
                control: control.0,
                target: target.0,
            });
        }
        Ok(())
    }
}

impl Default for Coupling {
    fn default() -> Self {
        Self::all_to_all()
    }
}
