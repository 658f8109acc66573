//! `nodekit create` — build the document and provision the fleet.

use colored::Colorize;
use nodekit_cloud_aws::{
    AwsDocument, ElasticIpSpec, InstanceFleetSpec, KeyPairReference, KeyPairSpec,
    ProviderBinding, SecurityGroupSpec,
};
use nodekit_core::constants::{CERT_SUFFIX, ROOT_VOLUME_SIZE_GIB};
use nodekit_terraform::Terraform;
use std::path::PathBuf;

pub struct CreateOptions {
    pub regions: Vec<String>,
    pub nodes: u32,
    pub ami: String,
    pub instance_type: String,
    pub authorize_ip: String,
    pub profile: String,
    pub use_elastic_ips: bool,
    pub key_name: Option<String>,
    pub scoped: bool,
    pub dir: Option<PathBuf>,
    pub yes: bool,
}

pub async fn handle(opts: CreateOptions) -> anyhow::Result<()> {
    if !opts.yes {
        println!(
            "{}",
            "Provisioning creates billable cloud resources (instances, elastic IPs)."
                .yellow()
        );
        println!("Re-run with {} to proceed.", "--yes".cyan());
        return Ok(());
    }

    Terraform::check_installed().await?;

    let dir = super::resolve_dir(opts.dir)?;
    let operator = std::env::var("USER").unwrap_or_else(|_| "operator".to_string());

    // A single region keeps the unsuffixed legacy document layout unless
    // scoped naming is requested explicitly.
    let scoped = opts.scoped || opts.regions.len() > 1;
    let mut doc = AwsDocument::new(scoped);

    for region in &opts.regions {
        doc.add_provider(&ProviderBinding::new(region, &opts.profile));

        let sg_name = format!("{operator}-{region}-validator-sg");
        doc.add_security_group(&SecurityGroupSpec::baseline(
            region,
            &sg_name,
            &opts.authorize_ip,
        ));

        let key_pair = match &opts.key_name {
            Some(existing) => KeyPairReference::Existing(existing.clone()),
            None => {
                let key_name = format!("{operator}-{region}");
                let cert_path = nodekit_core::base_dir()?
                    .join(format!("{key_name}{CERT_SUFFIX}"))
                    .display()
                    .to_string();
                doc.add_key_pair(&KeyPairSpec {
                    region: region.clone(),
                    key_name,
                    cert_path,
                    use_existing: false,
                    existing_key_name: String::new(),
                });
                KeyPairReference::Created
            }
        };

        if opts.use_elastic_ips {
            doc.add_elastic_ips(&ElasticIpSpec {
                region: region.clone(),
                count: opts.nodes,
            });
        }

        doc.add_instance_fleet(&InstanceFleetSpec {
            region: region.clone(),
            count: opts.nodes,
            ami: opts.ami.clone(),
            instance_type: opts.instance_type.clone(),
            security_group_name: sg_name,
            key_pair,
            root_volume_size_gib: ROOT_VOLUME_SIZE_GIB,
        });

        doc.add_outputs(region, opts.use_elastic_ips);
    }

    let path = doc.save(&dir)?;
    tracing::debug!(document = %path.display(), "document serialized");

    println!(
        "Creating {} node(s) in {}...",
        opts.nodes,
        opts.regions.join(", ")
    );

    let tf = Terraform::new(&dir).with_cancellation(super::ctrl_c_token());
    let result = tf
        .provision(&opts.regions, scoped, opts.use_elastic_ips)
        .await?;

    println!();
    println!(
        "{}",
        "New validator node(s) successfully provisioned!".green()
    );
    for region in result.regions() {
        println!("{}", region.bold());
        if let Some(pairs) = result.correlated(region) {
            for (id, ip) in pairs {
                println!("  {id}  {ip}");
            }
        } else if let Some(ids) = result.instance_ids.get(region) {
            for id in ids {
                println!("  {id}");
            }
        }
    }

    Ok(())
}
