//! vsync-ipam
//!
//! Minimal typed access to a phpIPAM-style inventory: L2 domains (one per
//! device) and the VLAN records inside them.
//!
//! Every call is one HTTP request with a fixed timeout. Statuses 200/201/204/409
//! count as success (409 = already exists). Anything else is logged and returned
//! as an [`InventoryError`]; nothing is retried.

mod client;
mod memory;
mod types;

use async_trait::async_trait;

pub use client::{PhpipamClient, ACCEPTED_STATUSES};
pub use memory::MemoryInventory;
pub use types::{InventoryDomain, InventoryError, InventoryVlanEntry};

/// Inventory operations the reconciler needs.
#[async_trait]
pub trait Inventory: Send + Sync {
    async fn list_domains(&self) -> Result<Vec<InventoryDomain>, InventoryError>;

    async fn create_domain(&self, name: &str, description: &str) -> Result<(), InventoryError>;

    async fn list_vlans(&self, domain_id: u64) -> Result<Vec<InventoryVlanEntry>, InventoryError>;

    async fn create_vlan(
        &self,
        domain_id: u64,
        number: u32,
        name: &str,
        description: &str,
    ) -> Result<(), InventoryError>;

    async fn update_vlan(
        &self,
        vlan_record_id: u64,
        name: &str,
        description: &str,
    ) -> Result<(), InventoryError>;

    async fn delete_vlan(&self, vlan_record_id: u64) -> Result<(), InventoryError>;
}
