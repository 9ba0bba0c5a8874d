use vsync_schemas::{sort_by_vlan_id, VlanRecord};

use crate::VendorProfile;

/// Turn raw walk output into VLAN records.
///
/// Non-matching lines and lines whose id does not parse as a positive integer
/// are skipped. Excluded names are dropped. Output is sorted by id (stable).
pub fn parse_walk_output(output: &str, profile: &VendorProfile) -> Vec<VlanRecord> {
    let mut vlans = Vec::new();

    for line in output.lines() {
        let Some(caps) = profile.pattern().captures(line) else {
            continue;
        };

        let Some(vlan_id) = caps
            .get(1)
            .and_then(|m| m.as_str().trim().parse::<u32>().ok())
            .filter(|id| *id > 0)
        else {
            continue;
        };

        let name = if profile.captures_name() {
            match caps.get(2).map(|m| m.as_str()) {
                Some("") => VlanRecord::default_name(vlan_id),
                Some(n) => n.to_string(),
                None => continue,
            }
        } else {
            VlanRecord::default_name(vlan_id)
        };

        if profile.is_skipped(&name) {
            continue;
        }

        vlans.push(VlanRecord::new(vlan_id, name));
    }

    sort_by_vlan_id(&mut vlans);
    vlans
}
