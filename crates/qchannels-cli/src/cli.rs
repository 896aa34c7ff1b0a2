//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use qchannels_channels::{ChannelName, QubitMask};

use crate::config::ExperimentConfig;

/// qchannels - quantum channel tomography on simulators and devices
#[derive(Debug, Parser)]
#[command(name = "qchannels")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// YAML experiment configuration
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend to run on (simulator, ibmqx4, ibmq_16_melbourne)
    #[arg(short, long, global = true)]
    pub backend: Option<String>,

    /// Shots per circuit
    #[arg(short, long, global = true)]
    pub shots: Option<u32>,

    /// Seed for simulator sampling
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Deterministic simulator counts
    #[arg(long, global = true)]
    pub exact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List registered backends and their capabilities
    Backends,

    /// List the named channels
    Channels,

    /// Tomography of a channel applied to |0...0>
    State {
        /// Channel name
        #[arg(short, long)]
        channel: ChannelName,

        /// Qubit placement as rel:abs pairs, e.g. 0:1,3:2
        #[arg(short, long)]
        mask: Option<QubitMask>,
    },

    /// Tomography of the Hadamard channel
    Hadamard {
        /// Qubit placement as rel:abs pairs, e.g. 0:3
        #[arg(short, long)]
        mask: Option<QubitMask>,
    },

    /// Choi matrix from the nine qutrit basis states
    Choi {
        /// Channel name
        #[arg(short, long)]
        channel: ChannelName,

        /// Qubit placement as rel:abs pairs
        #[arg(short, long)]
        mask: Option<QubitMask>,
    },

    /// Choi matrix from a single entangled circuit
    DirectChoi {
        /// Channel name
        #[arg(short, long)]
        channel: ChannelName,

        /// Channel placement; defaults depend on the backend
        #[arg(short, long)]
        mask: Option<QubitMask>,

        /// Identity pair placement; defaults depend on the backend
        #[arg(long)]
        identity_mask: Option<QubitMask>,
    },
}

impl Cli {
    /// Apply the global flags on top of a loaded configuration.
    pub fn apply_to(&self, config: &mut ExperimentConfig) {
        if let Some(backend) = &self.backend {
            config.backend.clone_from(backend);
        }
        if let Some(shots) = self.shots {
            config.shots = shots;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.exact {
            config.exact = true;
        }
    }
}
