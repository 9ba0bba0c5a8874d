use std::fmt;

use serde::{de, Deserialize, Deserializer};

/// One device's VLAN namespace in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryDomain {
    #[serde(deserialize_with = "de_u64")]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A VLAN as currently stored in the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryVlanEntry {
    /// Inventory-assigned record id (`vlanId`).
    pub id: u64,
    /// 802.1Q VLAN number.
    pub number: u32,
    pub name: String,
}

impl InventoryVlanEntry {
    pub fn new(id: u64, number: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            number,
            name: name.into(),
        }
    }
}

/// Wire shape of a VLAN entry. `number` may be missing on malformed rows.
#[derive(Debug, Deserialize)]
pub(crate) struct WireVlan {
    #[serde(rename = "vlanId", deserialize_with = "de_u64")]
    pub vlan_id: u64,
    #[serde(default, deserialize_with = "de_opt_u64")]
    pub number: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

impl WireVlan {
    pub(crate) fn into_entry(self) -> Option<InventoryVlanEntry> {
        let number = u32::try_from(self.number?).ok()?;
        Some(InventoryVlanEntry {
            id: self.vlan_id,
            number,
            name: self.name.unwrap_or_default(),
        })
    }
}

/// phpIPAM returns numeric fields as strings; accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
    Num(u64),
    Str(String),
}

impl NumOrStr {
    fn into_u64<E: de::Error>(self) -> Result<u64, E> {
        match self {
            NumOrStr::Num(n) => Ok(n),
            NumOrStr::Str(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected numeric string, got '{s}'"))),
        }
    }
}

fn de_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    NumOrStr::deserialize(d)?.into_u64()
}

fn de_opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Option::<NumOrStr>::deserialize(d)?
        .map(NumOrStr::into_u64)
        .transpose()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Connection failure, timeout, or body read failure.
    Transport(String),
    /// The inventory answered with a status outside the accepted set.
    Status {
        method: String,
        url: String,
        status: u16,
    },
    /// The response body was not the expected JSON envelope.
    Decode(String),
    /// The client could not be built (bad TLS settings, etc.).
    Config(String),
}

impl InventoryError {
    /// True when the server answered but refused; false for transport/decode faults.
    pub fn is_status(&self) -> bool {
        matches!(self, InventoryError::Status { .. })
    }

    /// True for a 404. phpIPAM answers this for a domain with no VLANs.
    pub fn is_not_found(&self) -> bool {
        matches!(self, InventoryError::Status { status: 404, .. })
    }
}

impl fmt::Display for InventoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryError::Transport(msg) => write!(f, "inventory transport error: {msg}"),
            InventoryError::Status {
                method,
                url,
                status,
            } => write!(f, "{method} {url} -> {status}"),
            InventoryError::Decode(msg) => write!(f, "inventory decode error: {msg}"),
            InventoryError::Config(msg) => write!(f, "inventory config error: {msg}"),
        }
    }
}

impl std::error::Error for InventoryError {}
