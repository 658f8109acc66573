//! Terraform driver for nodekit.
//!
//! Drives the external orchestration tool through init, apply, and output
//! reads as synchronous subprocesses, streams its diagnostics live to the
//! operator, classifies failures (init vs. quota vs. generic), and parses
//! declared outputs back into ordered per-region collections.

pub mod error;
pub mod output;
pub mod runner;

pub use error::{Result, TerraformError};
pub use output::parse_list_literal;
pub use runner::Terraform;
