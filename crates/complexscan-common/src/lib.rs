//! complexscan Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the complexscan workspace.
//!
//! # Overview
//!
//! - **Error Handling**: [`ScanError`] and the crate-wide [`Result`] alias
//! - **Logging**: per-stage tracing setup with console and file layers
//!
//! # Example
//!
//! ```no_run
//! use complexscan_common::logging::{init_logging, LogConfig, LogOutput};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::builder()
//!         .output(LogOutput::Both)
//!         .log_file_name("hmmer_search.log")
//!         .build();
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{Result, ScanError};
