//! Measurement suffixes for state tomography.

use qchannels_ir::{Circuit, ClbitId, QubitId};

use crate::error::{TomographyError, TomographyResult};
use crate::settings::{MeasurementBasis, MeasurementSetting};

/// Name of the sub-circuit measuring `parent` in `setting`.
pub fn measurement_circuit_name(parent: &str, setting: &MeasurementSetting) -> String {
    format!("{parent}_meas_{}", setting.label())
}

/// One copy of `parent` per setting, with `sorted_qubits[j]` rotated into
/// the setting's basis and measured into clbit `j`.
pub fn measurement_circuits(
    parent: &Circuit,
    sorted_qubits: &[u32],
    settings: &[MeasurementSetting],
) -> TomographyResult<Vec<Circuit>> {
    settings
        .iter()
        .map(|setting| measurement_circuit(parent, sorted_qubits, setting))
        .collect()
}

fn measurement_circuit(
    parent: &Circuit,
    sorted_qubits: &[u32],
    setting: &MeasurementSetting,
) -> TomographyResult<Circuit> {
    if setting.len() != sorted_qubits.len() {
        return Err(TomographyError::InvalidQubits(format!(
            "setting {setting} does not cover {} qubits",
            sorted_qubits.len()
        )));
    }

    let mut circuit = parent.clone();
    circuit.set_name(measurement_circuit_name(parent.name(), setting));
    circuit.ensure_clbits(sorted_qubits.len() as u32);

    for (j, (&q, &basis)) in sorted_qubits.iter().zip(setting.bases()).enumerate() {
        let qubit = QubitId(q);
        match basis {
            MeasurementBasis::X => {
                circuit.h(qubit)?;
            }
            MeasurementBasis::Y => {
                circuit.sdg(qubit)?.h(qubit)?;
            }
            MeasurementBasis::Z => {}
        }
        circuit.measure(qubit, ClbitId(j as u32))?;
    }
    Ok(circuit)
}
