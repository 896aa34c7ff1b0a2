//! Channel circuits for qchannels.
//!
//! A channel experiment is a preparation circuit, a channel circuit and a
//! tomography suffix. This crate builds the first two:
//!
//! - [`Channel`]: the named channels (Hadamard, Landau–Streater,
//!   Werner–Holevo, ...) with their gate sequences and closed-form
//!   predictions
//! - [`QubitMask`]: where a channel's relative qubits land on the device
//! - [`Coupling`]: how CNOTs are placed on directed coupling maps
//! - [`qutrit_basis_preparations`]: the nine input states of a qutrit Choi
//!   experiment
//! - [`DirectChoi`]: the single-circuit Choi state layout
//! - [`ChannelName`]: lookup by name
//!
//! # Example
//!
//! ```rust
//! use qchannels_channels::{ChannelName, Coupling, QubitMask};
//!
//! let channel = "landau-streater".parse::<ChannelName>().unwrap().channel();
//! let instance = channel.with_mask("0:1,1:0".parse::<QubitMask>().unwrap()).unwrap();
//! assert_eq!(instance.system_qubits(), vec![1, 3]);
//!
//! let circuit = instance.circuit("ls", 4, &Coupling::all_to_all()).unwrap();
//! assert!(circuit.gate_count() > 0);
//! ```

pub mod channel;
pub mod coupling;
pub mod direct;
pub mod error;
pub mod gates;
pub mod mask;
pub mod qutrit;
pub mod registry;
pub mod theory;

pub use channel::{Channel, ChannelInstance};
pub use coupling::Coupling;
pub use direct::{DIRECT_CHOI_DROPPED, DirectChoi};
pub use error::{ChannelError, ChannelResult};
pub use gates::OneQubitGates;
pub use mask::QubitMask;
pub use qutrit::{QUTRIT_BASIS_NAMES, qutrit_basis_preparations};
pub use registry::ChannelName;
pub use theory::TheoryChannel;
