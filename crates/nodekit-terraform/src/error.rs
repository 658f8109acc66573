//! Terraform driver error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerraformError {
    #[error(
        "terraform not found. It is a required dependency for creating remote nodes; \
         install instructions: https://developer.hashicorp.com/terraform/downloads"
    )]
    NotInstalled,

    #[error("terraform init failed: {0}")]
    Init(String),

    #[error(
        "elastic IP address limit exceeded for this region; request a quota increase, \
         reduce the node count, or retry in a different region"
    )]
    EipLimitExceeded,

    #[error("terraform apply failed: {0}")]
    Apply(String),

    #[error("terraform destroy failed: {0}")]
    Destroy(String),

    #[error("failed to read output '{name}': {reason}")]
    Output { name: String, reason: String },

    #[error("malformed output list literal: {0}")]
    MalformedOutput(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TerraformError>;
