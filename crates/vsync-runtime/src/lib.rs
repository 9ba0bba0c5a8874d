//! vsync-runtime
//!
//! Run orchestration: for each enabled device, in configured order,
//! discover -> (snapshot) -> (reconcile). Strictly sequential. Optionally
//! repeats on a fixed interval.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info};
use vsync_artifacts::SnapshotWriter;
use vsync_config::{DeviceConfig, SyncConfig};
use vsync_discovery::{discover, SnmpTransport, VendorTable};
use vsync_ipam::Inventory;
use vsync_reconcile::{reconcile, ReconcileCounts};
use vsync_schemas::VlanRecord;

/// What happened to one device during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOutcome {
    pub device: String,
    pub vlans: usize,
    pub snapshot: Option<PathBuf>,
    /// `None` when reconciliation was off, skipped, or aborted.
    pub counts: Option<ReconcileCounts>,
}

impl DeviceOutcome {
    fn skipped(device: &str) -> Self {
        Self {
            device: device.to_string(),
            vlans: 0,
            snapshot: None,
            counts: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub devices: Vec<DeviceOutcome>,
}

impl CycleReport {
    pub fn device(&self, name: &str) -> Option<&DeviceOutcome> {
        self.devices.iter().find(|d| d.device == name)
    }
}

pub struct Orchestrator<'a> {
    cfg: &'a SyncConfig,
    vendors: &'a VendorTable,
    community: &'a str,
    transport: &'a dyn SnmpTransport,
    inventory: Option<&'a dyn Inventory>,
    snapshots: Option<&'a SnapshotWriter>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        cfg: &'a SyncConfig,
        vendors: &'a VendorTable,
        community: &'a str,
        transport: &'a dyn SnmpTransport,
    ) -> Self {
        Self {
            cfg,
            vendors,
            community,
            transport,
            inventory: None,
            snapshots: None,
        }
    }

    /// Reconcile every non-empty discovery against `inventory`.
    pub fn with_inventory(mut self, inventory: &'a dyn Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Write a snapshot for every non-empty discovery.
    pub fn with_snapshots(mut self, writer: &'a SnapshotWriter) -> Self {
        self.snapshots = Some(writer);
        self
    }

    pub async fn discover_device(&self, device: &DeviceConfig) -> Vec<VlanRecord> {
        discover(
            self.transport,
            &device.ip,
            &device.vendor,
            self.community,
            self.vendors,
        )
        .await
    }

    /// One pass over all enabled devices.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        for device in self.cfg.enabled_devices() {
            report.devices.push(self.run_device(device).await);
        }
        report
    }

    async fn run_device(&self, device: &DeviceConfig) -> DeviceOutcome {
        let vlans = self.discover_device(device).await;
        if vlans.is_empty() {
            return DeviceOutcome::skipped(&device.name);
        }

        info!(device = %device.name, "VLANs found on {}:", device.name);
        for v in &vlans {
            info!(device = %device.name, "  {:4} - {}", v.vlan_id, v.name);
        }

        let snapshot = match self.snapshots {
            Some(writer) => match writer.write(&device.name, &vlans) {
                Ok(path) => {
                    info!(device = %device.name, "snapshot saved: {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    error!(device = %device.name, "snapshot failed: {:#}", e);
                    None
                }
            },
            None => None,
        };

        let counts = match self.inventory {
            Some(inv) => reconcile(inv, &device.name, &vlans).await.ok(),
            None => None,
        };

        DeviceOutcome {
            device: device.name.clone(),
            vlans: vlans.len(),
            snapshot,
            counts,
        }
    }

    /// Repeat [`run_cycle`](Self::run_cycle) every `interval` (sleep after each pass).
    ///
    /// `max_cycles: None` runs until the process is terminated.
    pub async fn run_every(&self, interval: Duration, max_cycles: Option<usize>) -> usize {
        info!("running every {}s", interval.as_secs());
        let mut cycles = 0usize;
        loop {
            self.run_cycle().await;
            cycles += 1;
            if max_cycles.is_some_and(|max| cycles >= max) {
                return cycles;
            }
            tokio::time::sleep(interval).await;
        }
    }
}
