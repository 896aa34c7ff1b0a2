//! Preparation circuits for the qutrit input basis.

use qchannels_ir::{Circuit, QubitId};

use crate::coupling::Coupling;
use crate::error::ChannelResult;

/// Circuit names, in the order of `qutrit_density_basis()`.
pub const QUTRIT_BASIS_NAMES: [&str; 9] = [
    "rho_A0", "rho_A1", "rho_A2", "rho_B0", "rho_B1", "rho_B2", "rho_C0", "rho_C1", "rho_C2",
];

/// Nine `num_qubits`-wide circuits preparing the qutrit basis states on the
/// pair `[low, high]` (`|1⟩` sets `low`, `|2⟩` sets `high`):
///
/// | name | state |
/// |------|-------|
/// | `rho_A0..A2` | `|0⟩, |1⟩, |2⟩` |
/// | `rho_B0..B2` | `(|0⟩+|1⟩)/√2, (|0⟩+|2⟩)/√2, (|1⟩+|2⟩)/√2` |
/// | `rho_C0..C2` | `(|0⟩+i|1⟩)/√2, (|0⟩+i|2⟩)/√2, (|1⟩+i|2⟩)/√2` |
pub fn qutrit_basis_preparations(
    low: u32,
    high: u32,
    num_qubits: u32,
    coupling: &Coupling,
) -> ChannelResult<Vec<Circuit>> {
    let (a, b) = (QubitId(low), QubitId(high));
    let blank = |index: usize| Circuit::with_size(QUTRIT_BASIS_NAMES[index], num_qubits, 0);

    // (|1> + |2>)/√2: superpose `high`, set `low`, then clear `low` where `high` is set.
    let one_plus_two = |index: usize| -> ChannelResult<Circuit> {
        let mut c = blank(index);
        c.h(b)?.x(a)?;
        coupling.cnot(&mut c, b, a)?;
        Ok(c)
    };

    let mut circuits = Vec::with_capacity(9);
    circuits.push(blank(0));

    let mut c = blank(1);
    c.x(a)?;
    circuits.push(c);

    let mut c = blank(2);
    c.x(b)?;
    circuits.push(c);

    let mut c = blank(3);
    c.h(a)?;
    circuits.push(c);

    let mut c = blank(4);
    c.h(b)?;
    circuits.push(c);

    circuits.push(one_plus_two(5)?);

    let mut c = blank(6);
    c.h(a)?.s(a)?;
    circuits.push(c);

    let mut c = blank(7);
    c.h(b)?.s(b)?;
    circuits.push(c);

    let mut c = one_plus_two(8)?;
    c.s(b)?;
    circuits.push(c);

    Ok(circuits)
}
