pub mod create;
pub mod destroy;
pub mod outputs;

use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Resolves the document directory, creating it when missing.
pub fn resolve_dir(dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match dir {
        Some(dir) => {
            if !dir.exists() {
                std::fs::create_dir_all(&dir)?;
            }
            Ok(dir)
        }
        None => Ok(nodekit_core::terraform_dir()?),
    }
}

/// Token cancelled on Ctrl-C so a hung cloud operation can be aborted
/// instead of leaving the subprocess running detached.
pub fn ctrl_c_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, aborting terraform");
            handle.cancel();
        }
    });
    cancel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_dir_creates_missing_directory() {
        let base = tempfile::tempdir().unwrap();
        let target = base.path().join("docs");
        let resolved = resolve_dir(Some(target.clone())).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }
}
