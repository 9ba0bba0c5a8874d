use std::fmt;

use serde::Serialize;
use vsync_ipam::InventoryError;

/// Outcome counters for one device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileCounts {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
}

impl ReconcileCounts {
    pub fn new(created: usize, updated: usize, removed: usize, unchanged: usize) -> Self {
        Self {
            created,
            updated,
            removed,
            unchanged,
        }
    }

    /// True when nothing had to be written.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.removed == 0
    }
}

impl fmt::Display for ReconcileCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created={} updated={} removed={} unchanged={}",
            self.created, self.updated, self.removed, self.unchanged
        )
    }
}

/// One step of a reconciliation plan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VlanAction {
    Create {
        number: u32,
        name: String,
    },
    Update {
        record_id: u64,
        number: u32,
        old_name: String,
        new_name: String,
    },
    Remove {
        record_id: u64,
        number: u32,
        name: String,
    },
    Unchanged {
        number: u32,
    },
}

/// Ordered actions: discovered VLANs first (discovery order), then removals by ascending id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub actions: Vec<VlanAction>,
}

impl ReconcilePlan {
    /// Counters this plan yields if every write succeeds.
    pub fn expected_counts(&self) -> ReconcileCounts {
        let mut c = ReconcileCounts::default();
        for a in &self.actions {
            match a {
                VlanAction::Create { .. } => c.created += 1,
                VlanAction::Update { .. } => c.updated += 1,
                VlanAction::Remove { .. } => c.removed += 1,
                VlanAction::Unchanged { .. } => c.unchanged += 1,
            }
        }
        c
    }
}

/// Why reconciliation was aborted for a device.
#[derive(Debug)]
pub enum ReconcileError {
    /// No domain with the device's name exists, even after trying to create one.
    DomainUnresolved { device: String },
    /// The current VLAN set could not be read (transport/decode fault).
    Inventory(InventoryError),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::DomainUnresolved { device } => {
                write!(f, "could not resolve or create domain for {device}")
            }
            ReconcileError::Inventory(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ReconcileError {}
