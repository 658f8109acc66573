//! `nodekit outputs` — re-read outputs from an already-applied document.

use colored::Colorize;
use nodekit_core::ProvisioningResult;
use nodekit_core::constants::{INSTANCE_IDS_OUTPUT, INSTANCE_IPS_OUTPUT};
use nodekit_core::naming::output_name;
use nodekit_terraform::Terraform;
use std::path::PathBuf;

pub async fn handle(
    regions: Vec<String>,
    use_elastic_ips: bool,
    scoped: bool,
    dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    Terraform::check_installed().await?;

    let dir = super::resolve_dir(dir)?;
    let tf = Terraform::new(&dir).with_cancellation(super::ctrl_c_token());

    let scoped = scoped || regions.len() > 1;
    let mut result = ProvisioningResult::new();
    for region in &regions {
        let scope = scoped.then_some(region.as_str());
        let ids = tf.output(&output_name(INSTANCE_IDS_OUTPUT, scope)).await?;
        result.instance_ids.insert(region.clone(), ids);
        if use_elastic_ips {
            let ips = tf.output(&output_name(INSTANCE_IPS_OUTPUT, scope)).await?;
            result.public_ips.insert(region.clone(), ips);
        }
    }

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
