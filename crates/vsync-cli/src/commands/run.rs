//! `vsync run` and `vsync discover`.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use vsync_artifacts::SnapshotWriter;
use vsync_config::{resolve_secrets, ConfigMode};
use vsync_discovery::{SnmpWalkCommand, VendorTable};
use vsync_ipam::PhpipamClient;
use vsync_runtime::Orchestrator;

use super::load_config;

pub struct RunArgs {
    pub config_paths: Vec<String>,
    pub ipam: bool,
    pub backup: bool,
    pub loop_secs: u64,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let mode = if args.ipam {
        ConfigMode::Sync
    } else {
        ConfigMode::Discover
    };
    let (loaded, cfg) = load_config(&args.config_paths, mode)?;
    info!(config_hash = %loaded.config_hash, mode = mode.as_str(), "config loaded");

    let secrets = resolve_secrets(&cfg, mode)?;
    let vendors = VendorTable::from_config(&cfg.vendors)?;
    let transport = SnmpWalkCommand::from_config(&cfg.snmp);

    let client = match (&cfg.phpipam, args.ipam) {
        (Some(ipam_cfg), true) => {
            let token = secrets
                .ipam_token
                .clone()
                .context("SECRETS_MISSING: phpipam token")?;
            Some(PhpipamClient::from_config(ipam_cfg, token)?)
        }
        _ => None,
    };
    let writer = args.backup.then(|| SnapshotWriter::new(&cfg.backup.dir));

    let mut orch = Orchestrator::new(&cfg, &vendors, &secrets.community, &transport);
    if let Some(client) = client.as_ref() {
        orch = orch.with_inventory(client);
    }
    if let Some(writer) = writer.as_ref() {
        orch = orch.with_snapshots(writer);
    }

    if args.loop_secs > 0 {
        orch.run_every(Duration::from_secs(args.loop_secs), None).await;
    } else {
        let report = orch.run_cycle().await;
        for d in &report.devices {
            match d.counts {
                Some(counts) => println!("{} vlans={} {}", d.device, d.vlans, counts),
                None => println!("{} vlans={}", d.device, d.vlans),
            }
        }
        info!(devices = report.devices.len(), "run complete");
    }
    Ok(())
}

pub async fn discover_one(config_paths: Vec<String>, device: &str) -> Result<()> {
    let (_, cfg) = load_config(&config_paths, ConfigMode::Discover)?;
    let secrets = resolve_secrets(&cfg, ConfigMode::Discover)?;
    let vendors = VendorTable::from_config(&cfg.vendors)?;
    let transport = SnmpWalkCommand::from_config(&cfg.snmp);

    let dev = cfg
        .device(device)
        .with_context(|| format!("unknown device '{}'", device))?;

    let vlans = Orchestrator::new(&cfg, &vendors, &secrets.community, &transport)
        .discover_device(dev)
        .await;

    for v in &vlans {
        println!("{:4} - {}", v.vlan_id, v.name);
    }
    println!("vlans={}", vlans.len());
    Ok(())
}
