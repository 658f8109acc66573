//! HCL document error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HclError {
    #[error("failed to write document to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, HclError>;
