//! Shared constants, naming rules, and result types for nodekit.

pub mod constants;
pub mod error;
pub mod naming;
pub mod result;

pub use error::{CoreError, Result};
pub use result::ProvisioningResult;

use std::path::PathBuf;

/// Base directory for nodekit state (`~/.nodekit`), created on demand.
pub fn base_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or(CoreError::HomeDirNotFound)?
        .join(".nodekit");

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

/// Directory holding the serialized document and terraform's own state.
///
/// Exactly one provisioning run may use this directory at a time; the
/// external tool's state file is not safe for concurrent invocations.
pub fn terraform_dir() -> Result<PathBuf> {
    let dir = base_dir()?.join("terraform");

    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}
