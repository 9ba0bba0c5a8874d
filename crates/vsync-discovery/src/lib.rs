//! vsync-discovery
//!
//! Polls one device for its VLAN table and turns the raw walk output into
//! sorted [`VlanRecord`]s using the device's vendor profile.
//!
//! The SNMP transport is a capability ([`SnmpTransport`]); the default
//! implementation shells out to `snmpwalk`. Nothing here talks to the inventory.

mod parse;
mod transport;
mod vendor;

use std::fmt;

use tracing::{error, info, warn};
pub use vsync_schemas::VlanRecord;

pub use parse::parse_walk_output;
pub use transport::{SnmpTransport, SnmpWalkCommand, TransportError, WalkRequest};
pub use vendor::{VendorProfile, VendorTable};

/// Why a discovery run produced no data.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The device references a vendor id missing from the vendor table.
    UnknownVendor(String),
    /// The walk could not be started, timed out, or exited non-zero.
    Transport(TransportError),
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::UnknownVendor(v) => write!(f, "vendor '{v}' is not configured"),
            DiscoveryError::Transport(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DiscoveryError {}

/// Query one device and parse its VLAN table.
///
/// Lines that do not match the vendor pattern, or whose id does not parse,
/// are skipped. The result is sorted ascending by VLAN id; repeated ids are kept.
pub async fn try_discover(
    transport: &dyn SnmpTransport,
    address: &str,
    vendor_id: &str,
    community: &str,
    vendors: &VendorTable,
) -> Result<Vec<VlanRecord>, DiscoveryError> {
    let profile = vendors
        .get(vendor_id)
        .ok_or_else(|| DiscoveryError::UnknownVendor(vendor_id.to_string()))?;

    let req = WalkRequest {
        address,
        community,
        oid: profile.oid(),
    };
    let raw = transport.walk(&req).await.map_err(DiscoveryError::Transport)?;

    Ok(parse_walk_output(&raw, profile))
}

/// Best-effort wrapper over [`try_discover`]: failures are logged and yield an empty list.
pub async fn discover(
    transport: &dyn SnmpTransport,
    address: &str,
    vendor_id: &str,
    community: &str,
    vendors: &VendorTable,
) -> Vec<VlanRecord> {
    match try_discover(transport, address, vendor_id, community, vendors).await {
        Ok(vlans) => {
            info!(address = %address, count = vlans.len(), "vlans found");
            vlans
        }
        Err(e @ DiscoveryError::UnknownVendor(_)) => {
            error!(address = %address, vendor = %vendor_id, "{e}");
            Vec::new()
        }
        Err(e) => {
            warn!(address = %address, "snmp walk failed: {e}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use vsync_config::VendorConfig;

    struct CannedTransport {
        reply: Result<String, ()>,
        seen_oids: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SnmpTransport for CannedTransport {
        async fn walk(&self, req: &WalkRequest<'_>) -> Result<String, TransportError> {
            self.seen_oids.lock().unwrap().push(req.oid.to_string());
            self.reply.clone().map_err(|_| TransportError::Status {
                code: Some(1),
                stderr: "Timeout: No Response from 10.0.0.1".to_string(),
            })
        }
    }

    fn table() -> VendorTable {
        let mut raw = BTreeMap::new();
        raw.insert(
            "cisco".to_string(),
            VendorConfig {
                oid: "1.3.6.1.4.1.9.9.46.1.3.1.1.4".to_string(),
                pattern: r#"\.(\d+) = STRING: "(.*)""#.to_string(),
                skip: vec!["default".to_string()],
            },
        );
        VendorTable::from_config(&raw).unwrap()
    }

    fn transport(reply: Result<&str, ()>) -> CannedTransport {
        CannedTransport {
            reply: reply.map(str::to_string),
            seen_oids: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn walks_the_vendor_oid_and_parses() {
        let t = transport(Ok(concat!(
            "iso.3.6.1.4.1.9.9.46.1.3.1.1.4.1.20 = STRING: \"VOICE\"\n",
            "iso.3.6.1.4.1.9.9.46.1.3.1.1.4.1.1 = STRING: \"default\"\n",
            "iso.3.6.1.4.1.9.9.46.1.3.1.1.4.1.10 = STRING: \"DATA\"\n",
        )));
        let vlans = discover(&t, "10.0.0.1", "cisco", "public", &table()).await;
        assert_eq!(
            vlans,
            vec![VlanRecord::new(10, "DATA"), VlanRecord::new(20, "VOICE")]
        );
        assert_eq!(
            t.seen_oids.lock().unwrap().as_slice(),
            ["1.3.6.1.4.1.9.9.46.1.3.1.1.4".to_string()]
        );
    }

    #[tokio::test]
    async fn unknown_vendor_yields_empty_without_walking() {
        let t = transport(Ok("ignored"));
        let err = try_discover(&t, "10.0.0.1", "juniper", "public", &table())
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::UnknownVendor(ref v) if v == "juniper"));
        assert!(discover(&t, "10.0.0.1", "juniper", "public", &table())
            .await
            .is_empty());
        assert!(t.seen_oids.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_yields_empty() {
        let t = transport(Err(()));
        assert!(discover(&t, "10.0.0.1", "cisco", "public", &table())
            .await
            .is_empty());
    }
}
