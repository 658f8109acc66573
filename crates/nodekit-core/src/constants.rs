//! Constants shared across the provisioning engine.

/// Name of the terraform binary looked up on PATH.
pub const TERRAFORM_BIN: &str = "terraform";

/// File name of the serialized infrastructure document, one per run.
pub const NODE_CONFIG_FILE: &str = "node_config.tf";

/// Credential profile that terraform resolves on its own; the profile
/// attribute is omitted from the provider block when this is used.
pub const DEFAULT_CREDENTIAL_PROFILE: &str = "default";

/// Marker AWS prints on stderr when the elastic IP quota is exhausted.
pub const EIP_LIMIT_MARKER: &str = "AddressLimitExceeded";

/// SSH ingress port, scoped to the operator IP.
pub const SSH_PORT: u16 = 22;

/// Node API (HTTP RPC) ingress port, scoped to the operator IP.
pub const API_PORT: u16 = 9650;

/// P2P staking port, open to the world so peers can connect.
pub const P2P_PORT: u16 = 9651;

/// Port number used for the catch-all egress rule.
pub const OUTBOUND_PORT: u16 = 0;

/// Root volume size for provisioned nodes, in GiB.
pub const ROOT_VOLUME_SIZE_GIB: u64 = 1024;

/// Suffix appended to key pair names to form the certificate file name.
pub const CERT_SUFFIX: &str = "-kp.pem";

/// Output name carrying the created instance IDs.
pub const INSTANCE_IDS_OUTPUT: &str = "instance_ids";

/// Output name carrying the elastic IPs, present only when requested.
pub const INSTANCE_IPS_OUTPUT: &str = "instance_ips";
