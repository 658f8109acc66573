//! AWS infrastructure document builder.
//!
//! Appends provider, key pair, security group, instance, elastic IP, and
//! output blocks to an HCL document, one region at a time. Every operation
//! only appends; resources that may be requested twice (the shared private
//! key, per-region groups and fleets, incremental rules) are de-duplicated
//! through the document's block guard before anything is emitted.

use crate::spec::{
    ElasticIpSpec, InstanceFleetSpec, KeyPairReference, KeyPairSpec, ProviderBinding,
    SecurityGroupRuleAddition, SecurityGroupSpec,
};
use nodekit_core::constants::{
    API_PORT, DEFAULT_CREDENTIAL_PROFILE, INSTANCE_IDS_OUTPUT, INSTANCE_IPS_OUTPUT,
    NODE_CONFIG_FILE, SSH_PORT,
};
use nodekit_core::naming::{output_name, resource_name, sanitize_ip};
use nodekit_hcl::{Document, Value};
use std::path::{Path, PathBuf};

/// Resource label of the instance fleet (region-suffixed when scoped).
const NODE_RESOURCE: &str = "node";
/// Resource label of the elastic IP pool.
const EIP_RESOURCE: &str = "node_eip";
/// Resource label of the security group.
const SG_RESOURCE: &str = "node_sg";
/// Resource label of the AWS key pair.
const KEY_PAIR_RESOURCE: &str = "kp";
/// Label of the shared private-key-generation resource, declared at most
/// once per document regardless of region count.
const PRIVATE_KEY_RESOURCE: &str = "pk";
/// Resource label of the local certificate file.
const CERT_FILE_RESOURCE: &str = "ssh_cert";

/// Builder for the declarative document of one provisioning run.
///
/// In scoped mode every resource and output name embeds its region, and each
/// provider binding carries an alias, so several regions can coexist in one
/// document. Unscoped mode keeps the unsuffixed single-region layout written
/// by older releases.
#[derive(Debug, Default)]
pub struct AwsDocument {
    doc: Document,
    scoped: bool,
}

impl AwsDocument {
    pub fn new(scoped: bool) -> Self {
        Self {
            doc: Document::new(),
            scoped,
        }
    }

    fn scope<'a>(&self, region: &'a str) -> Option<&'a str> {
        self.scoped.then_some(region)
    }

    /// `provider = aws.<region>` reference for scoped resources.
    fn provider_ref(&self, region: &str) -> Option<Value> {
        self.scoped
            .then(|| Value::traversal(["aws".to_string(), region.to_string()]))
    }

    /// Declares the provider binding for a region. Skipped when the region
    /// is already bound; a document holds at most one binding per region.
    pub fn add_provider(&mut self, binding: &ProviderBinding) {
        let already_bound = self.doc.blocks_of_type("provider").any(|block| {
            block.labels().first().is_some_and(|l| l == "aws")
                && matches!(
                    block.body().get_attribute("region"),
                    Some(Value::String(region)) if *region == binding.region
                )
        });
        if already_bound {
            tracing::debug!(region = %binding.region, "provider already bound, skipping");
            return;
        }

        let provider = self.doc.append_block("provider", &["aws"]);
        provider.set_attribute("region", Value::string(&binding.region));
        if binding.credential_profile != DEFAULT_CREDENTIAL_PROFILE {
            provider.set_attribute("profile", Value::string(&binding.credential_profile));
        }
        if self.scoped {
            provider.set_attribute("alias", Value::string(&binding.region));
        }
    }

    /// Declares the key pair for a region: the shared private-key generator
    /// (at most once per document), the AWS key pair, and the local
    /// certificate file. A no-op when an existing key pair is reused.
    pub fn add_key_pair(&mut self, spec: &KeyPairSpec) {
        if spec.use_existing {
            tracing::debug!(
                region = %spec.region,
                key = %spec.existing_key_name,
                "reusing existing key pair, no key blocks emitted"
            );
            return;
        }

        if !self
            .doc
            .has_block("resource", &["tls_private_key", PRIVATE_KEY_RESOURCE])
        {
            let pk = self
                .doc
                .append_block("resource", &["tls_private_key", PRIVATE_KEY_RESOURCE]);
            pk.set_attribute("algorithm", Value::string("RSA"));
            pk.set_attribute("rsa_bits", Value::int(4096));
        }

        let kp_name = resource_name(KEY_PAIR_RESOURCE, self.scope(&spec.region));
        if !self.doc.has_block("resource", &["aws_key_pair", &kp_name]) {
            let provider = self.provider_ref(&spec.region);
            let kp = self.doc.append_block("resource", &["aws_key_pair", &kp_name]);
            kp.set_attribute("key_name", Value::string(&spec.key_name));
            kp.set_attribute(
                "public_key",
                Value::traversal([
                    "tls_private_key",
                    PRIVATE_KEY_RESOURCE,
                    "public_key_openssh",
                ]),
            );
            if let Some(provider) = provider {
                kp.set_attribute("provider", provider);
            }
        }

        let cert_name = resource_name(CERT_FILE_RESOURCE, self.scope(&spec.region));
        if !self.doc.has_block("resource", &["local_file", &cert_name]) {
            let cert = self.doc.append_block("resource", &["local_file", &cert_name]);
            cert.set_attribute("filename", Value::string(&spec.cert_path));
            cert.set_attribute(
                "content",
                Value::traversal(["tls_private_key", PRIVATE_KEY_RESOURCE, "private_key_pem"]),
            );
        }
    }

    /// Declares the security group for a region with its inline rules.
    /// Never duplicated for a region within one document.
    pub fn add_security_group(&mut self, spec: &SecurityGroupSpec) {
        let sg_name = resource_name(SG_RESOURCE, self.scope(&spec.region));
        if self
            .doc
            .has_block("resource", &["aws_security_group", &sg_name])
        {
            tracing::debug!(region = %spec.region, "security group already declared, skipping");
            return;
        }

        let provider = self.provider_ref(&spec.region);
        let sg = self
            .doc
            .append_block("resource", &["aws_security_group", &sg_name]);
        sg.set_attribute("name", Value::string(&spec.name));
        sg.set_attribute(
            "description",
            Value::string("Allow SSH and API access to validator nodes"),
        );
        if let Some(provider) = provider {
            sg.set_attribute("provider", provider);
        }
        for rule in &spec.rules {
            let body = sg.append_block(rule.direction.as_str(), &[]);
            body.set_attribute("description", Value::string(&rule.description));
            body.set_attribute("from_port", Value::int(i64::from(rule.from_port)));
            body.set_attribute("to_port", Value::int(i64::from(rule.to_port)));
            body.set_attribute("protocol", Value::string(&rule.protocol));
            body.set_attribute(
                "cidr_blocks",
                Value::string_list(rule.cidr_blocks.iter().cloned()),
            );
        }
    }

    /// Widens a security group created by a prior run to admit a new
    /// operator IP. One standalone rule resource per missing rule type,
    /// keyed by the sanitized IP; a no-op when both rule types are present.
    pub fn add_security_group_rules(&mut self, addition: &SecurityGroupRuleAddition) {
        let ip = sanitize_ip(&addition.ip_address);
        if !addition.already_has_tcp_rule {
            let name = resource_name(&format!("ssh_ip_{ip}"), self.scope(&addition.region));
            self.append_standalone_rule(&name, addition, SSH_PORT);
        }
        if !addition.already_has_http_rule {
            let name = resource_name(&format!("api_ip_{ip}"), self.scope(&addition.region));
            self.append_standalone_rule(&name, addition, API_PORT);
        }
    }

    fn append_standalone_rule(
        &mut self,
        name: &str,
        addition: &SecurityGroupRuleAddition,
        port: u16,
    ) {
        if self
            .doc
            .has_block("resource", &["aws_security_group_rule", name])
        {
            return;
        }

        let provider = self.provider_ref(&addition.region);
        let rule = self
            .doc
            .append_block("resource", &["aws_security_group_rule", name]);
        rule.set_attribute("type", Value::string("ingress"));
        rule.set_attribute("from_port", Value::int(i64::from(port)));
        rule.set_attribute("to_port", Value::int(i64::from(port)));
        rule.set_attribute("protocol", Value::string("tcp"));
        rule.set_attribute(
            "cidr_blocks",
            Value::string_list([format!("{}/32", addition.ip_address)]),
        );
        rule.set_attribute("security_group_id", Value::string(&addition.target_group_id));
        if let Some(provider) = provider {
            rule.set_attribute("provider", provider);
        }
    }

    /// Declares the countable instance fleet for a region.
    pub fn add_instance_fleet(&mut self, spec: &InstanceFleetSpec) {
        let node_name = resource_name(NODE_RESOURCE, self.scope(&spec.region));
        if self.doc.has_block("resource", &["aws_instance", &node_name]) {
            tracing::debug!(region = %spec.region, "instance fleet already declared, skipping");
            return;
        }

        let provider = self.provider_ref(&spec.region);
        let kp_name = resource_name(KEY_PAIR_RESOURCE, self.scope(&spec.region));
        let node = self.doc.append_block("resource", &["aws_instance", &node_name]);
        node.set_attribute("count", Value::int(i64::from(spec.count)));
        node.set_attribute("ami", Value::string(&spec.ami));
        node.set_attribute("instance_type", Value::string(&spec.instance_type));
        match &spec.key_pair {
            KeyPairReference::Created => {
                node.set_attribute(
                    "key_name",
                    Value::traversal(["aws_key_pair".to_string(), kp_name, "key_name".to_string()]),
                );
            }
            KeyPairReference::Existing(name) => {
                node.set_attribute("key_name", Value::string(name));
            }
        }
        node.set_attribute(
            "security_groups",
            Value::string_list([spec.security_group_name.clone()]),
        );
        if let Some(provider) = provider {
            node.set_attribute("provider", provider);
        }
        let root = node.append_block("root_block_device", &[]);
        root.set_attribute("volume_size", Value::int(spec.root_volume_size_gib as i64));
    }

    /// Declares elastic IPs bound by creation index to the region's fleet.
    pub fn add_elastic_ips(&mut self, spec: &ElasticIpSpec) {
        let eip_name = resource_name(EIP_RESOURCE, self.scope(&spec.region));
        if self.doc.has_block("resource", &["aws_eip", &eip_name]) {
            return;
        }

        let provider = self.provider_ref(&spec.region);
        let node_name = resource_name(NODE_RESOURCE, self.scope(&spec.region));
        let eip = self.doc.append_block("resource", &["aws_eip", &eip_name]);
        eip.set_attribute("count", Value::int(i64::from(spec.count)));
        eip.set_attribute(
            "instance",
            Value::traversal([
                "aws_instance".to_string(),
                format!("{node_name}[count.index]"),
                "id".to_string(),
            ]),
        );
        eip.set_attribute("vpc", Value::bool(true));
        if let Some(provider) = provider {
            eip.set_attribute("provider", provider);
        }
    }

    /// Declares the region's outputs: instance IDs always, public IPs only
    /// when elastic IPs were requested for the region.
    pub fn add_outputs(&mut self, region: &str, use_elastic_ips: bool) {
        let node_name = resource_name(NODE_RESOURCE, self.scope(region));
        let eip_name = resource_name(EIP_RESOURCE, self.scope(region));

        if use_elastic_ips {
            let name = output_name(INSTANCE_IPS_OUTPUT, self.scope(region));
            if !self.doc.has_block("output", &[&name]) {
                let out = self.doc.append_block("output", &[&name]);
                out.set_attribute(
                    "value",
                    Value::traversal([
                        "aws_eip".to_string(),
                        format!("{eip_name}[*]"),
                        "public_ip".to_string(),
                    ]),
                );
            }
        }

        let name = output_name(INSTANCE_IDS_OUTPUT, self.scope(region));
        if !self.doc.has_block("output", &[&name]) {
            let out = self.doc.append_block("output", &[&name]);
            out.set_attribute(
                "value",
                Value::traversal([
                    "aws_instance".to_string(),
                    format!("{node_name}[*]"),
                    "id".to_string(),
                ]),
            );
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn render(&self) -> String {
        self.doc.render()
    }

    /// Serializes the document into `dir` as the run's single `.tf` file.
    pub fn save(&self, dir: &Path) -> nodekit_hcl::Result<PathBuf> {
        self.doc.save(&dir.join(NODE_CONFIG_FILE))
    }
}
