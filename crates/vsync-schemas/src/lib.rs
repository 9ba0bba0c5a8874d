use serde::{Deserialize, Serialize};

/// One VLAN as observed on a device during a discovery run.
///
/// Field names are the on-disk snapshot format (`vlan_id`, `name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VlanRecord {
    pub vlan_id: u32,
    pub name: String,
}

impl VlanRecord {
    pub fn new(vlan_id: u32, name: impl Into<String>) -> Self {
        Self {
            vlan_id,
            name: name.into(),
        }
    }

    /// Name used when the vendor pattern does not capture one.
    pub fn default_name(vlan_id: u32) -> String {
        format!("VLAN{vlan_id}")
    }
}

/// Stable ascending sort by VLAN id. Records sharing an id keep encounter order.
pub fn sort_by_vlan_id(records: &mut [VlanRecord]) {
    records.sort_by_key(|r| r.vlan_id);
}
