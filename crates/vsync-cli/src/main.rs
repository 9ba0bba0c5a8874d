use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "vsync")]
#[command(about = "SNMP VLAN discovery and phpIPAM sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover VLANs on every enabled device; optionally snapshot and sync them
    Run {
        /// Config paths in merge order (defaults to config.yaml)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Reconcile discovered VLANs into phpIPAM
        #[arg(long, alias = "phpipam", default_value_t = false)]
        ipam: bool,

        /// Write a JSON snapshot per device
        #[arg(long, default_value_t = false)]
        backup: bool,

        /// Repeat every SECS seconds (0 = single pass)
        #[arg(long = "loop", value_name = "SECS", default_value_t = 0)]
        loop_secs: u64,
    },

    /// Query one device and print its VLAN table
    Discover {
        /// Config paths in merge order (defaults to config.yaml)
        #[arg(long = "config")]
        config_paths: Vec<String>,

        /// Device name as configured
        #[arg(long)]
        device: String,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> local...)
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");

    // Tracing starts once the config says where logs go (see commands::load_config).
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Run {
            config_paths,
            ipam,
            backup,
            loop_secs,
        } => {
            commands::run::run(commands::run::RunArgs {
                config_paths,
                ipam,
                backup,
                loop_secs,
            })
            .await?;
        }

        Commands::Discover {
            config_paths,
            device,
        } => {
            commands::run::discover_one(config_paths, &device).await?;
        }

        Commands::ConfigHash { paths } => {
            commands::init_tracing(None);
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = vsync_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }
    }

    Ok(())
}
