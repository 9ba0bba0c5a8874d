use tracing::{error, info, warn};
use vsync_ipam::Inventory;
use vsync_schemas::VlanRecord;

use crate::{plan, ReconcileCounts, ReconcileError, VlanAction};

/// Description written on every VLAN record this tool creates or updates.
pub fn vlan_description(device: &str) -> String {
    format!("SNMP - {device}")
}

/// Description for a freshly created device domain.
pub fn domain_description(device: &str) -> String {
    format!("VLANs {device}")
}

fn find_domain(domains: &[vsync_ipam::InventoryDomain], device: &str) -> Option<u64> {
    domains.iter().find(|d| d.name == device).map(|d| d.id)
}

/// Look up the device's domain by exact name, creating it if absent.
///
/// A failed listing counts as "no domains"; a failed create is logged and the
/// re-fetch decides (a concurrent creator may have won).
pub async fn resolve_domain(inv: &dyn Inventory, device: &str) -> Result<u64, ReconcileError> {
    let domains = inv.list_domains().await.unwrap_or_else(|e| {
        warn!(device = %device, "listing domains failed: {e}");
        Vec::new()
    });
    if let Some(id) = find_domain(&domains, device) {
        return Ok(id);
    }

    if let Err(e) = inv.create_domain(device, &domain_description(device)).await {
        warn!(device = %device, "creating domain failed: {e}");
    }

    let domains = inv.list_domains().await.unwrap_or_else(|e| {
        warn!(device = %device, "listing domains failed: {e}");
        Vec::new()
    });
    find_domain(&domains, device).ok_or_else(|| ReconcileError::DomainUnresolved {
        device: device.to_string(),
    })
}

/// Reconcile one device's discovered VLANs against its inventory domain.
///
/// Failed writes are logged and not counted. Returns an error only when the
/// domain or its current VLAN set cannot be established.
pub async fn reconcile(
    inv: &dyn Inventory,
    device: &str,
    discovered: &[VlanRecord],
) -> Result<ReconcileCounts, ReconcileError> {
    let domain_id = match resolve_domain(inv, device).await {
        Ok(id) => id,
        Err(e) => {
            error!(device = %device, "{e}");
            return Err(e);
        }
    };

    // phpIPAM answers 404 for a domain with no VLANs yet. Any other failure
    // leaves the current set unknown, and writing against it would duplicate.
    let current = match inv.list_vlans(domain_id).await {
        Ok(v) => v,
        Err(e) if e.is_not_found() => Vec::new(),
        Err(e) => {
            error!(device = %device, domain_id, "listing vlans failed: {e}");
            return Err(ReconcileError::Inventory(e));
        }
    };

    let description = vlan_description(device);
    let mut counts = ReconcileCounts::default();

    for action in plan(discovered, &current).actions {
        match action {
            VlanAction::Create { number, name } => {
                match inv.create_vlan(domain_id, number, &name, &description).await {
                    Ok(()) => {
                        counts.created += 1;
                        info!(device = %device, vlan_id = number, "created VLAN {} - {}", number, name);
                    }
                    Err(e) => warn!(device = %device, vlan_id = number, "create failed: {e}"),
                }
            }
            VlanAction::Update {
                record_id,
                number,
                old_name,
                new_name,
            } => match inv.update_vlan(record_id, &new_name, &description).await {
                Ok(()) => {
                    counts.updated += 1;
                    info!(
                        device = %device,
                        vlan_id = number,
                        "updated VLAN {} - {} (was {})",
                        number,
                        new_name,
                        old_name
                    );
                }
                Err(e) => warn!(device = %device, vlan_id = number, "update failed: {e}"),
            },
            VlanAction::Remove {
                record_id,
                number,
                name,
            } => match inv.delete_vlan(record_id).await {
                Ok(()) => {
                    counts.removed += 1;
                    info!(device = %device, vlan_id = number, "removed VLAN {} - {}", number, name);
                }
                Err(e) => warn!(device = %device, vlan_id = number, "delete failed: {e}"),
            },
            VlanAction::Unchanged { .. } => counts.unchanged += 1,
        }
    }

    info!(
        device = %device,
        created = counts.created,
        updated = counts.updated,
        removed = counts.removed,
        unchanged = counts.unchanged,
        "reconcile complete"
    );

    Ok(counts)
}
