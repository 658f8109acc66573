//! Append-only HCL document model.
//!
//! Holds the declarative infrastructure description (providers, resources,
//! outputs) that the provisioning engine builds in memory and hands to the
//! external orchestration tool as a single `.tf` file.

pub mod document;
pub mod error;
pub mod value;

pub use document::{Attribute, Block, Body, Document};
pub use error::{HclError, Result};
pub use value::Value;
