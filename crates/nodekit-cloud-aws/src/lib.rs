//! AWS document builder for nodekit.
//!
//! Translates typed resource specs into the declarative HCL document the
//! orchestration tool applies: provider bindings, key pairs, security
//! groups (new or incrementally widened), countable instance fleets,
//! elastic IPs, and per-region outputs.

pub mod document;
pub mod spec;

pub use document::AwsDocument;
pub use spec::{
    Direction, ElasticIpSpec, IngressEgressRule, InstanceFleetSpec, KeyPairReference,
    KeyPairSpec, ProviderBinding, SecurityGroupRuleAddition, SecurityGroupSpec,
};
