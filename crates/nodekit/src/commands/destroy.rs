//! `nodekit destroy` — tear down everything the document declares.

use colored::Colorize;
use nodekit_terraform::Terraform;
use std::path::PathBuf;

pub async fn handle(dir: Option<PathBuf>, yes: bool) -> anyhow::Result<()> {
    if !yes {
        println!(
            "{}",
            "This deletes every resource in the document directory.".yellow()
        );
        println!("Re-run with {} to proceed.", "--yes".cyan());
        return Ok(());
    }

    Terraform::check_installed().await?;

    let dir = super::resolve_dir(dir)?;
    let tf = Terraform::new(&dir).with_cancellation(super::ctrl_c_token());
    tf.destroy().await?;

    println!("{}", "All declared resources destroyed.".green());
    Ok(())
}
