//! Terraform subprocess driver.
//!
//! Runs the tool's initialize / apply / output lifecycle strictly in order
//! inside one document directory. The directory (document plus terraform's
//! own state) is not safe for concurrent invocation, so callers must hold at
//! most one driver run per directory at a time; no in-process locking is
//! attempted. Failed init/apply runs are never retried here: apply is not
//! idempotent-safe and partially created resources need operator inspection.

use crate::error::{Result, TerraformError};
use crate::output::parse_list_literal;
use nodekit_core::ProvisioningResult;
use nodekit_core::constants::{
    EIP_LIMIT_MARKER, INSTANCE_IDS_OUTPUT, INSTANCE_IPS_OUTPUT, TERRAFORM_BIN,
};
use nodekit_core::naming::output_name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

struct RunOutcome {
    status: ExitStatus,
    stderr: String,
}

/// Driver for one document directory.
pub struct Terraform {
    binary: PathBuf,
    workdir: PathBuf,
    credential_env: HashMap<String, String>,
    cancel: CancellationToken,
}

impl Terraform {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            binary: PathBuf::from(TERRAFORM_BIN),
            workdir: workdir.into(),
            credential_env: HashMap::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// Overrides the binary resolved from PATH; used by tests to drive the
    /// lifecycle against a stub executable.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Cloud credentials merged over the inherited process environment, so
    /// tests and callers can inject credentials without mutating the real
    /// environment.
    pub fn with_credential_env(mut self, env: HashMap<String, String>) -> Self {
        self.credential_env = env;
        self
    }

    /// Token that aborts any in-flight subprocess; the child is killed and
    /// the pending call returns [`TerraformError::Cancelled`].
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Checks that the terraform binary is available on PATH.
    pub async fn check_installed() -> Result<()> {
        match Command::new(TERRAFORM_BIN).arg("version").output().await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TerraformError::NotInstalled)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        cmd.current_dir(&self.workdir);
        cmd.envs(&self.credential_env);
        cmd.kill_on_drop(true);
        cmd
    }

    /// Initializes the document directory. Fatal on failure; not retried.
    pub async fn init(&self) -> Result<()> {
        let outcome = self.run_streaming(&["init"]).await?;
        if !outcome.status.success() {
            return Err(TerraformError::Init(outcome.stderr.trim().to_string()));
        }
        Ok(())
    }

    /// Reconciles real cloud resources to the document, streaming the
    /// tool's combined output live while capturing stderr for failure
    /// classification.
    pub async fn apply(&self) -> Result<()> {
        let outcome = self.run_streaming(&["apply", "-auto-approve"]).await?;
        if !outcome.status.success() {
            return Err(classify_apply_failure(&outcome.stderr));
        }
        Ok(())
    }

    /// Tears down everything the document declares.
    pub async fn destroy(&self) -> Result<()> {
        let outcome = self.run_streaming(&["destroy", "-auto-approve"]).await?;
        if !outcome.status.success() {
            return Err(TerraformError::Destroy(outcome.stderr.trim().to_string()));
        }
        Ok(())
    }

    /// Reads a declared list output as ordered strings.
    ///
    /// Prefers the machine-readable mode and falls back to parsing the
    /// plain list-literal rendering on terraform releases without `-json`.
    pub async fn output(&self, name: &str) -> Result<Vec<String>> {
        let json = self.run_captured(&["output", "-json", name]).await?;
        if json.status.success() {
            let values: Vec<String> = serde_json::from_slice(&json.stdout)?;
            return Ok(values);
        }
        tracing::debug!(output = name, "json output mode unavailable, falling back to text");

        let plain = self.run_captured(&["output", name]).await?;
        if !plain.status.success() {
            return Err(TerraformError::Output {
                name: name.to_string(),
                reason: String::from_utf8_lossy(&plain.stderr).trim().to_string(),
            });
        }
        parse_list_literal(&String::from_utf8_lossy(&plain.stdout))
    }

    /// Full provisioning lifecycle: init, apply, then per-region output
    /// reads — instance IDs always, public IPs only when elastic IPs were
    /// requested. The first failed read aborts the rest; either the full
    /// per-region result set is returned or an error with no partial data.
    pub async fn provision(
        &self,
        regions: &[String],
        scoped: bool,
        use_elastic_ips: bool,
    ) -> Result<ProvisioningResult> {
        self.init().await?;
        self.apply().await?;

        let mut result = ProvisioningResult::new();
        for region in regions {
            let scope = scoped.then_some(region.as_str());
            let ids = self.output(&output_name(INSTANCE_IDS_OUTPUT, scope)).await?;
            result.instance_ids.insert(region.clone(), ids);

            if use_elastic_ips {
                let ips = self.output(&output_name(INSTANCE_IPS_OUTPUT, scope)).await?;
                result.public_ips.insert(region.clone(), ips);
            }
        }
        Ok(result)
    }

    /// Runs terraform with stdout/stderr streamed live to the operator's
    /// terminal while stderr is also captured for classification.
    async fn run_streaming(&self, args: &[&str]) -> Result<RunOutcome> {
        tracing::debug!(
            dir = %self.workdir.display(),
            "running: terraform {}",
            args.join(" ")
        );

        if self.cancel.is_cancelled() {
            return Err(TerraformError::Cancelled);
        }

        let mut cmd = self.command(args);
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(spawn_failure)?;

        // Tee raw bytes: line-based reads would stop at the first invalid
        // UTF-8 sequence and drop everything after it, including a quota
        // marker printed later in the run.
        let stdout = child.stdout.take();
        let stdout_task = tokio::spawn(async move {
            if let Some(mut stdout) = stdout {
                let mut sink = tokio::io::stdout();
                let mut buf = [0u8; 4096];
                loop {
                    match stdout.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            sink.write_all(&buf[..n]).await.ok();
                            sink.flush().await.ok();
                        }
                    }
                }
            }
        });

        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut captured = Vec::new();
            if let Some(mut stderr) = stderr {
                let mut sink = tokio::io::stderr();
                let mut buf = [0u8; 4096];
                loop {
                    match stderr.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            sink.write_all(&buf[..n]).await.ok();
                            sink.flush().await.ok();
                            captured.extend_from_slice(&buf[..n]);
                        }
                    }
                }
            }
            String::from_utf8_lossy(&captured).into_owned()
        });

        let status = tokio::select! {
            status = child.wait() => status?,
            _ = self.cancel.cancelled() => {
                child.kill().await.ok();
                return Err(TerraformError::Cancelled);
            }
        };

        stdout_task.await.ok();
        let stderr = stderr_task.await.unwrap_or_default();
        Ok(RunOutcome { status, stderr })
    }

    async fn run_captured(&self, args: &[&str]) -> Result<std::process::Output> {
        if self.cancel.is_cancelled() {
            return Err(TerraformError::Cancelled);
        }

        let mut cmd = self.command(args);
        tokio::select! {
            output = cmd.output() => output.map_err(spawn_failure),
            _ = self.cancel.cancelled() => Err(TerraformError::Cancelled),
        }
    }
}

/// Maps a spawn failure: a missing binary becomes the dedicated
/// not-installed error, anything else stays an IO error.
fn spawn_failure(e: std::io::Error) -> TerraformError {
    if e.kind() == std::io::ErrorKind::NotFound {
        TerraformError::NotInstalled
    } else {
        TerraformError::Io(e)
    }
}

/// Maps a failed apply to its error kind: the elastic-IP quota marker on
/// stderr gets a dedicated, user-actionable error; anything else surfaces
/// the tool's own diagnostics unmodified.
fn classify_apply_failure(stderr: &str) -> TerraformError {
    if stderr.contains(EIP_LIMIT_MARKER) {
        TerraformError::EipLimitExceeded
    } else {
        TerraformError::Apply(stderr.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_marker_maps_to_dedicated_error() {
        let stderr = "Error: Error creating EIP: AddressLimitExceeded: \
                      The maximum number of addresses has been reached.";
        assert!(matches!(
            classify_apply_failure(stderr),
            TerraformError::EipLimitExceeded
        ));
    }

    #[test]
    fn other_failures_surface_verbatim() {
        let stderr = "Error: error launching source instance: InvalidAMIID.NotFound\n";
        match classify_apply_failure(stderr) {
            TerraformError::Apply(msg) => {
                assert!(msg.contains("InvalidAMIID.NotFound"));
            }
            other => panic!("expected generic apply error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    fn stub_binary(dir: &Path, script: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join("terraform-stub");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn provision_reads_scoped_outputs_per_region() {
        let dir = tempfile::tempdir().unwrap();
        let stub = stub_binary(
            dir.path(),
            r#"#!/bin/sh
case "$1" in
  init|apply) exit 0 ;;
  output)
    case "$3" in
      instance_ids_us-east-1) echo '["i-aaa1","i-aaa2"]' ;;
      instance_ips_us-east-1) echo '["1.1.1.1","1.1.1.2"]' ;;
      instance_ids_eu-west-1) echo '["i-bbb1","i-bbb2"]' ;;
      instance_ips_eu-west-1) echo '["2.2.2.1","2.2.2.2"]' ;;
      *) exit 1 ;;
    esac ;;
  *) exit 1 ;;
esac
"#,
        );

        let tf = Terraform::new(dir.path()).with_binary(stub);
        let regions = vec!["us-east-1".to_string(), "eu-west-1".to_string()];
        let result = tf.provision(&regions, true, true).await.unwrap();

        assert_eq!(
            result.instance_ids["us-east-1"],
            vec!["i-aaa1".to_string(), "i-aaa2".to_string()]
        );
        assert_eq!(
            result.correlated("eu-west-1").unwrap(),
            vec![("i-bbb1", "2.2.2.1"), ("i-bbb2", "2.2.2.2")]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn apply_quota_failure_surfaces_dedicated_error() {
        let dir = tempfile::tempdir().unwrap();
        let stub = stub_binary(
            dir.path(),
            r#"#!/bin/sh
if [ "$1" = "apply" ]; then
  echo "Error creating EIP: AddressLimitExceeded" >&2
  exit 1
fi
exit 0
"#,
        );

        let tf = Terraform::new(dir.path()).with_binary(stub);
        assert!(matches!(
            tf.apply().await,
            Err(TerraformError::EipLimitExceeded)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn quota_marker_after_non_utf8_stderr_is_still_captured() {
        let dir = tempfile::tempdir().unwrap();
        let stub = stub_binary(
            dir.path(),
            r#"#!/bin/sh
if [ "$1" = "apply" ]; then
  printf '\377\n' >&2
  echo "Error creating EIP: AddressLimitExceeded" >&2
  exit 1
fi
exit 0
"#,
        );

        let tf = Terraform::new(dir.path()).with_binary(stub);
        assert!(matches!(
            tf.apply().await,
            Err(TerraformError::EipLimitExceeded)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn init_failure_is_fatal_with_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let stub = stub_binary(
            dir.path(),
            r#"#!/bin/sh
if [ "$1" = "init" ]; then
  echo "Error: Failed to query available provider packages" >&2
  exit 1
fi
exit 0
"#,
        );

        let tf = Terraform::new(dir.path()).with_binary(stub);
        match tf.init().await {
            Err(TerraformError::Init(msg)) => {
                assert!(msg.contains("Failed to query available provider packages"));
            }
            other => panic!("expected init error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_reports_not_installed_on_every_path() {
        let dir = tempfile::tempdir().unwrap();
        let tf = Terraform::new(dir.path()).with_binary(dir.path().join("no-such-binary"));
        assert!(matches!(
            tf.output("instance_ids").await,
            Err(TerraformError::NotInstalled)
        ));
        assert!(matches!(tf.init().await, Err(TerraformError::NotInstalled)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn output_falls_back_to_plain_list_literal() {
        let dir = tempfile::tempdir().unwrap();
        let stub = stub_binary(
            dir.path(),
            r#"#!/bin/sh
if [ "$2" = "-json" ]; then
  echo "Usage: terraform output [NAME]" >&2
  exit 1
fi
echo '["i-plain1", "i-plain2",]'
"#,
        );

        let tf = Terraform::new(dir.path()).with_binary(stub);
        let values = tf.output("instance_ids").await.unwrap();
        assert_eq!(values, vec!["i-plain1".to_string(), "i-plain2".to_string()]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn credential_env_reaches_the_subprocess() {
        let dir = tempfile::tempdir().unwrap();
        let stub = stub_binary(
            dir.path(),
            r#"#!/bin/sh
if [ "$2" = "-json" ]; then
  exit 1
fi
echo "[\"$NODEKIT_TEST_CRED\"]"
"#,
        );

        let mut env = HashMap::new();
        env.insert("NODEKIT_TEST_CRED".to_string(), "injected".to_string());
        let tf = Terraform::new(dir.path())
            .with_binary(stub)
            .with_credential_env(env);
        assert_eq!(
            tf.output("instance_ids").await.unwrap(),
            vec!["injected".to_string()]
        );
    }

    #[tokio::test]
    async fn cancelled_token_aborts_before_spawn() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let tf = Terraform::new(std::env::temp_dir()).with_cancellation(cancel);
        assert!(matches!(
            tf.run_captured(&["version"]).await,
            Err(TerraformError::Cancelled)
        ));
        assert!(matches!(
            tf.run_streaming(&["version"]).await,
            Err(TerraformError::Cancelled)
        ));
    }
}
