//! Typed descriptions of the AWS resources a provisioning run declares.

use nodekit_core::constants::{API_PORT, OUTBOUND_PORT, P2P_PORT, SSH_PORT};
use serde::{Deserialize, Serialize};

/// Binds one region to a named credential profile. At most one binding per
/// region may exist in a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderBinding {
    pub region: String,

    /// Named profile from the shared credentials file; "default" makes the
    /// provider resolve credentials on its own.
    pub credential_profile: String,
}

impl ProviderBinding {
    pub fn new(region: impl Into<String>, credential_profile: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credential_profile: credential_profile.into(),
        }
    }
}

/// SSH key pair for a region.
///
/// When `use_existing` is false the document carries a private-key-generation
/// resource shared by all regions, an AWS key pair, and a local certificate
/// file; when true the instances reference `existing_key_name` directly and
/// no key blocks are emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyPairSpec {
    pub region: String,
    pub key_name: String,

    /// Where the generated private key certificate lands on disk.
    pub cert_path: String,

    pub use_existing: bool,
    pub existing_key_name: String,
}

/// Direction of a security group rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ingress,
    Egress,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        }
    }
}

/// One inline rule of a security group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngressEgressRule {
    pub direction: Direction,
    pub description: String,
    pub protocol: String,
    pub from_port: u16,
    pub to_port: u16,
    pub cidr_blocks: Vec<String>,
}

impl IngressEgressRule {
    fn single_port(
        direction: Direction,
        description: &str,
        protocol: &str,
        port: u16,
        cidr: String,
    ) -> Self {
        Self {
            direction,
            description: description.to_string(),
            protocol: protocol.to_string(),
            from_port: port,
            to_port: port,
            cidr_blocks: vec![cidr],
        }
    }
}

/// A named security group and its rules, one per region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupSpec {
    pub region: String,
    pub name: String,
    pub rules: Vec<IngressEgressRule>,
}

impl SecurityGroupSpec {
    /// The fixed baseline: SSH and node API reachable from the operator IP
    /// only, the staking port open to all peers, and unrestricted egress.
    pub fn baseline(
        region: impl Into<String>,
        name: impl Into<String>,
        operator_ip: &str,
    ) -> Self {
        let operator_cidr = format!("{operator_ip}/32");
        Self {
            region: region.into(),
            name: name.into(),
            rules: vec![
                IngressEgressRule::single_port(
                    Direction::Ingress,
                    "SSH",
                    "tcp",
                    SSH_PORT,
                    operator_cidr.clone(),
                ),
                IngressEgressRule::single_port(
                    Direction::Ingress,
                    "API HTTP",
                    "tcp",
                    API_PORT,
                    operator_cidr,
                ),
                IngressEgressRule::single_port(
                    Direction::Ingress,
                    "P2P staking",
                    "tcp",
                    P2P_PORT,
                    "0.0.0.0/0".to_string(),
                ),
                IngressEgressRule::single_port(
                    Direction::Egress,
                    "Outbound traffic",
                    "-1",
                    OUTBOUND_PORT,
                    "0.0.0.0/0".to_string(),
                ),
            ],
        }
    }
}

/// Incremental widening of a security group created by a prior run, to admit
/// a new operator IP. Each rule type already present is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupRuleAddition {
    pub region: String,

    /// ID of the existing group, as reported by the cloud provider.
    pub target_group_id: String,

    pub ip_address: String,
    pub already_has_tcp_rule: bool,
    pub already_has_http_rule: bool,
}

/// How instances reference their SSH key pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPairReference {
    /// Key pair declared in this document; referenced by traversal.
    Created,
    /// Pre-existing AWS key pair, referenced by name.
    Existing(String),
}

/// A countable fleet of identical instances in one region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceFleetSpec {
    pub region: String,
    pub count: u32,
    pub ami: String,
    pub instance_type: String,
    pub security_group_name: String,
    pub key_pair: KeyPairReference,
    pub root_volume_size_gib: u64,
}

/// Elastic IPs bound 1:1 by index to the same region's instance fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElasticIpSpec {
    pub region: String,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_has_four_rules() {
        let sg = SecurityGroupSpec::baseline("us-east-1", "validator-sg", "1.2.3.4");
        assert_eq!(sg.rules.len(), 4);

        let ssh = &sg.rules[0];
        assert_eq!(ssh.direction, Direction::Ingress);
        assert_eq!(ssh.from_port, SSH_PORT);
        assert_eq!(ssh.cidr_blocks, vec!["1.2.3.4/32".to_string()]);

        let egress = &sg.rules[3];
        assert_eq!(egress.direction, Direction::Egress);
        assert_eq!(egress.protocol, "-1");
        assert_eq!(egress.cidr_blocks, vec!["0.0.0.0/0".to_string()]);
    }

    #[test]
    fn staking_port_is_world_reachable() {
        let sg = SecurityGroupSpec::baseline("us-east-1", "validator-sg", "1.2.3.4");
        let p2p = &sg.rules[2];
        assert_eq!(p2p.from_port, P2P_PORT);
        assert_eq!(p2p.cidr_blocks, vec!["0.0.0.0/0".to_string()]);
    }
}
