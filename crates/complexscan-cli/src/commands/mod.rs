//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function.

pub mod aggregate;
pub mod build;
pub mod process;
pub mod search;
pub mod status;
pub mod subunit;
