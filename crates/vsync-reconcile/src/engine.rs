use std::collections::{BTreeMap, BTreeSet};

use vsync_ipam::InventoryVlanEntry;
use vsync_schemas::VlanRecord;

use crate::{ReconcilePlan, VlanAction};

/// Pure diff between discovered VLANs and the inventory's current entries.
///
/// Duplicate ids collapse last-write-wins on both sides, so each VLAN id
/// yields exactly one action.
pub fn plan(discovered: &[VlanRecord], current: &[InventoryVlanEntry]) -> ReconcilePlan {
    let existing: BTreeMap<u32, &InventoryVlanEntry> =
        current.iter().map(|e| (e.number, e)).collect();

    let latest: BTreeMap<u32, &VlanRecord> = discovered.iter().map(|r| (r.vlan_id, r)).collect();

    let mut actions = Vec::with_capacity(latest.len() + existing.len());
    let mut seen: BTreeSet<u32> = BTreeSet::new();

    for rec in discovered {
        if !seen.insert(rec.vlan_id) {
            continue;
        }
        let rec = latest[&rec.vlan_id];

        match existing.get(&rec.vlan_id) {
            Some(entry) if entry.name != rec.name => actions.push(VlanAction::Update {
                record_id: entry.id,
                number: rec.vlan_id,
                old_name: entry.name.clone(),
                new_name: rec.name.clone(),
            }),
            Some(_) => actions.push(VlanAction::Unchanged {
                number: rec.vlan_id,
            }),
            None => actions.push(VlanAction::Create {
                number: rec.vlan_id,
                name: rec.name.clone(),
            }),
        }
    }

    for (number, entry) in &existing {
        if !seen.contains(number) {
            actions.push(VlanAction::Remove {
                record_id: entry.id,
                number: *number,
                name: entry.name.clone(),
            });
        }
    }

    ReconcilePlan { actions }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReconcileCounts;

    #[test]
    fn empty_inventory_creates_everything() {
        let p = plan(
            &[VlanRecord::new(10, "DATA"), VlanRecord::new(20, "VOICE")],
            &[],
        );
        assert_eq!(
            p.actions,
            vec![
                VlanAction::Create {
                    number: 10,
                    name: "DATA".to_string()
                },
                VlanAction::Create {
                    number: 20,
                    name: "VOICE".to_string()
                },
            ]
        );
    }

    #[test]
    fn name_change_is_an_update_using_record_id() {
        let p = plan(
            &[VlanRecord::new(10, "DATA")],
            &[InventoryVlanEntry::new(7, 10, "OLD")],
        );
        assert_eq!(
            p.actions,
            vec![VlanAction::Update {
                record_id: 7,
                number: 10,
                old_name: "OLD".to_string(),
                new_name: "DATA".to_string(),
            }]
        );
    }

    #[test]
    fn name_comparison_is_exact() {
        let p = plan(
            &[VlanRecord::new(10, "data")],
            &[InventoryVlanEntry::new(7, 10, "DATA")],
        );
        assert_eq!(p.expected_counts(), ReconcileCounts::new(0, 1, 0, 0));
    }

    #[test]
    fn stale_inventory_entries_are_removed_in_id_order() {
        let p = plan(
            &[VlanRecord::new(10, "DATA")],
            &[
                InventoryVlanEntry::new(3, 99, "OLD"),
                InventoryVlanEntry::new(1, 10, "DATA"),
                InventoryVlanEntry::new(2, 50, "GONE"),
            ],
        );
        assert_eq!(
            p.actions,
            vec![
                VlanAction::Unchanged { number: 10 },
                VlanAction::Remove {
                    record_id: 2,
                    number: 50,
                    name: "GONE".to_string()
                },
                VlanAction::Remove {
                    record_id: 3,
                    number: 99,
                    name: "OLD".to_string()
                },
            ]
        );
    }

    #[test]
    fn duplicate_discovered_ids_last_write_wins() {
        let p = plan(
            &[VlanRecord::new(10, "FIRST"), VlanRecord::new(10, "SECOND")],
            &[],
        );
        assert_eq!(
            p.actions,
            vec![VlanAction::Create {
                number: 10,
                name: "SECOND".to_string()
            }]
        );
    }

    #[test]
    fn duplicate_inventory_numbers_last_entry_wins() {
        let p = plan(
            &[VlanRecord::new(10, "DATA")],
            &[
                InventoryVlanEntry::new(1, 10, "OLD"),
                InventoryVlanEntry::new(2, 10, "DATA"),
            ],
        );
        assert_eq!(p.actions, vec![VlanAction::Unchanged { number: 10 }]);
    }
}
