//! CLI command implementations.

pub mod backends;
pub mod channels;
pub mod choi;
pub mod common;
pub mod state;
