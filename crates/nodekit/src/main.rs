mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nodekit")]
#[command(about = "Provision and manage validator node infrastructure", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision validator nodes in one or more cloud regions
    Create {
        /// Target region; repeat for a multi-region document
        #[arg(short, long = "region", required = true)]
        regions: Vec<String>,
        /// Number of nodes per region
        #[arg(short, long, default_value = "1")]
        nodes: u32,
        /// AMI to launch the nodes from
        #[arg(long)]
        ami: String,
        /// EC2 instance type
        #[arg(long, default_value = "c5.2xlarge")]
        instance_type: String,
        /// Operator IP granted SSH and API access (a /32 rule)
        #[arg(long)]
        authorize_ip: String,
        /// AWS credential profile
        #[arg(long, env = "NODEKIT_AWS_PROFILE", default_value = "default")]
        profile: String,
        /// Attach a stable elastic IP to every node
        #[arg(long)]
        use_elastic_ips: bool,
        /// Reuse an existing AWS key pair instead of creating one
        #[arg(long)]
        key_name: Option<String>,
        /// Embed the region in resource names even for a single region
        #[arg(long)]
        scoped: bool,
        /// Document directory (defaults to ~/.nodekit/terraform)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Skip the cloud-spend confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Tear down everything the document directory declares
    Destroy {
        /// Document directory (defaults to ~/.nodekit/terraform)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Re-read instance IDs and IPs from an applied document
    Outputs {
        /// Region to read outputs for; repeat for multi-region documents
        #[arg(short, long = "region", required = true)]
        regions: Vec<String>,
        /// Also read elastic IP outputs
        #[arg(long)]
        use_elastic_ips: bool,
        /// The document was written with region-scoped names
        #[arg(long)]
        scoped: bool,
        /// Document directory (defaults to ~/.nodekit/terraform)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Create {
            regions,
            nodes,
            ami,
            instance_type,
            authorize_ip,
            profile,
            use_elastic_ips,
            key_name,
            scoped,
            dir,
            yes,
        } => {
            commands::create::handle(commands::create::CreateOptions {
                regions,
                nodes,
                ami,
                instance_type,
                authorize_ip,
                profile,
                use_elastic_ips,
                key_name,
                scoped,
                dir,
                yes,
            })
            .await?;
        }
        Commands::Destroy { dir, yes } => {
            commands::destroy::handle(dir, yes).await?;
        }
        Commands::Outputs {
            regions,
            use_elastic_ips,
            scoped,
            dir,
        } => {
            commands::outputs::handle(regions, use_elastic_ips, scoped, dir).await?;
        }
        Commands::Version => {
            println!("nodekit {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
