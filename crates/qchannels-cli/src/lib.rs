//! Library side of the `qchannels` command-line tool.
//!
//! The binary is a thin shell over these modules: [`cli`] holds the argument
//! definitions, [`config`] the layered experiment configuration,
//! [`registry`] the backends known by name and [`experiments`] the
//! tomography workflows behind each subcommand.

pub mod cli;
pub mod config;
pub mod display;
pub mod experiments;
pub mod registry;
