//! In-memory [`Inventory`]: same contract as the HTTP client, no network.
//!
//! Used to exercise reconciliation end to end. Failures can be injected per
//! VLAN number, for domain creation, and for VLAN listing.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::{Inventory, InventoryDomain, InventoryError, InventoryVlanEntry};

#[derive(Debug, Clone)]
struct StoredVlan {
    domain_id: u64,
    entry: InventoryVlanEntry,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u64,
    domains: Vec<InventoryDomain>,
    vlans: Vec<StoredVlan>,
    calls: Vec<String>,
    failing_numbers: BTreeSet<u32>,
    reject_domain_create: bool,
    list_vlans_error: Option<InventoryError>,
}

impl MemoryState {
    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

fn refused(method: &str, path: String) -> InventoryError {
    InventoryError::Status {
        method: method.to_string(),
        url: path,
        status: 500,
    }
}

#[derive(Debug, Default)]
pub struct MemoryInventory {
    state: Mutex<MemoryState>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Add a domain and return its id.
    pub fn add_domain(&self, name: &str) -> u64 {
        let mut s = self.state();
        let id = s.alloc_id();
        s.domains.push(InventoryDomain {
            id,
            name: name.to_string(),
            description: None,
        });
        id
    }

    /// Add a VLAN record to a domain and return its record id.
    pub fn add_vlan(&self, domain_id: u64, number: u32, name: &str) -> u64 {
        let mut s = self.state();
        let id = s.alloc_id();
        s.vlans.push(StoredVlan {
            domain_id,
            entry: InventoryVlanEntry::new(id, number, name),
        });
        id
    }

    /// Writes (create/update/delete) touching `number` fail with a 500.
    pub fn fail_writes_for(&self, number: u32) {
        self.state().failing_numbers.insert(number);
    }

    /// Domain creation is refused and nothing is stored.
    pub fn reject_domain_creation(&self) {
        self.state().reject_domain_create = true;
    }

    /// Every VLAN listing fails with `err`.
    pub fn fail_vlan_listing(&self, err: InventoryError) {
        self.state().list_vlans_error = Some(err);
    }

    pub fn domain_id(&self, name: &str) -> Option<u64> {
        self.state()
            .domains
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.id)
    }

    pub fn domain_count(&self) -> usize {
        self.state().domains.len()
    }

    /// VLANs stored for a domain, ordered by number.
    pub fn vlans(&self, domain_id: u64) -> Vec<InventoryVlanEntry> {
        let mut out: Vec<InventoryVlanEntry> = self
            .state()
            .vlans
            .iter()
            .filter(|v| v.domain_id == domain_id)
            .map(|v| v.entry.clone())
            .collect();
        out.sort_by_key(|e| e.number);
        out
    }

    /// Log of operations in call order, e.g. `"POST vlan/ 10"`.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Number of write calls (POST/PATCH/DELETE) issued so far.
    pub fn write_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| !c.starts_with("GET"))
            .count()
    }
}

#[async_trait]
impl Inventory for MemoryInventory {
    async fn list_domains(&self) -> Result<Vec<InventoryDomain>, InventoryError> {
        let mut s = self.state();
        s.calls.push("GET l2domains/".to_string());
        Ok(s.domains.clone())
    }

    async fn create_domain(&self, name: &str, description: &str) -> Result<(), InventoryError> {
        let mut s = self.state();
        s.calls.push(format!("POST l2domains/ {name}"));
        if s.reject_domain_create {
            return Err(refused("POST", "l2domains/".to_string()));
        }
        if s.domains.iter().any(|d| d.name == name) {
            // conflict: accepted, nothing to do
            return Ok(());
        }
        let id = s.alloc_id();
        s.domains.push(InventoryDomain {
            id,
            name: name.to_string(),
            description: Some(description.to_string()),
        });
        Ok(())
    }

    async fn list_vlans(&self, domain_id: u64) -> Result<Vec<InventoryVlanEntry>, InventoryError> {
        let mut s = self.state();
        s.calls.push(format!("GET l2domains/{domain_id}/vlans/"));
        if let Some(err) = &s.list_vlans_error {
            return Err(err.clone());
        }
        Ok(s
            .vlans
            .iter()
            .filter(|v| v.domain_id == domain_id)
            .map(|v| v.entry.clone())
            .collect())
    }

    async fn create_vlan(
        &self,
        domain_id: u64,
        number: u32,
        name: &str,
        _description: &str,
    ) -> Result<(), InventoryError> {
        let mut s = self.state();
        s.calls.push(format!("POST vlan/ {number}"));
        if s.failing_numbers.contains(&number) {
            return Err(refused("POST", "vlan/".to_string()));
        }
        let id = s.alloc_id();
        s.vlans.push(StoredVlan {
            domain_id,
            entry: InventoryVlanEntry::new(id, number, name),
        });
        Ok(())
    }

    async fn update_vlan(
        &self,
        vlan_record_id: u64,
        name: &str,
        _description: &str,
    ) -> Result<(), InventoryError> {
        let mut s = self.state();
        s.calls.push(format!("PATCH vlan/{vlan_record_id}/"));
        let failing = s.failing_numbers.clone();
        let path = format!("vlan/{vlan_record_id}/");
        let Some(stored) = s.vlans.iter_mut().find(|v| v.entry.id == vlan_record_id) else {
            return Err(InventoryError::Status {
                method: "PATCH".to_string(),
                url: path,
                status: 404,
            });
        };
        if failing.contains(&stored.entry.number) {
            return Err(refused("PATCH", path));
        }
        stored.entry.name = name.to_string();
        Ok(())
    }

    async fn delete_vlan(&self, vlan_record_id: u64) -> Result<(), InventoryError> {
        let mut s = self.state();
        s.calls.push(format!("DELETE vlan/{vlan_record_id}/"));
        let path = format!("vlan/{vlan_record_id}/");
        let Some(pos) = s.vlans.iter().position(|v| v.entry.id == vlan_record_id) else {
            return Err(InventoryError::Status {
                method: "DELETE".to_string(),
                url: path,
                status: 404,
            });
        };
        if s.failing_numbers.contains(&s.vlans[pos].entry.number) {
            return Err(refused("DELETE", path));
        }
        s.vlans.remove(pos);
        Ok(())
    }
}
