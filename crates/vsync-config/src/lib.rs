//! vsync-config
//!
//! Layered YAML configuration for the VLAN sync pipeline.
//!
//! - Several YAML documents may be merged in order (later docs override earlier ones).
//! - The merged document is canonicalized to JSON and hashed (SHA-256) so runs can be
//!   attributed to an exact configuration.
//! - The typed view ([`SyncConfig`]) is what the rest of the workspace consumes.
//!   Secrets are resolved separately via [`secrets::resolve_secrets`].

pub mod consumption;
pub mod secrets;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;

pub use consumption::{report_unused_keys, ConfigMode, UnusedKeyPolicy, UnusedKeyReport};
pub use secrets::{resolve_secrets, ResolvedSecrets};

/// Path used when the operator does not pass `--config`.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub const DEFAULT_SNMP_COMMAND: &str = "snmpwalk";
pub const DEFAULT_SNMP_VERSION: &str = "2c";
pub const DEFAULT_SNMP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_IPAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BACKUP_DIR: &str = "backups";

// ---------------------------------------------------------------------------
// Typed configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub snmp: SnmpConfig,
    #[serde(default)]
    pub phpipam: Option<IpamConfig>,
    pub vendors: BTreeMap<String, VendorConfig>,
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl SyncConfig {
    /// Devices in configured order, skipping those with `enabled: false`.
    pub fn enabled_devices(&self) -> impl Iterator<Item = &DeviceConfig> {
        self.devices.iter().filter(|d| d.enabled)
    }

    pub fn device(&self, name: &str) -> Option<&DeviceConfig> {
        self.devices.iter().find(|d| d.name == name)
    }
}

#[derive(Clone, Deserialize)]
pub struct SnmpConfig {
    /// Literal community string. Prefer `community_env`.
    #[serde(default)]
    pub community: Option<String>,
    /// Name of the env var holding the community string.
    #[serde(default)]
    pub community_env: Option<String>,
    #[serde(default = "default_snmp_command")]
    pub command: String,
    #[serde(default = "default_snmp_version")]
    pub version: String,
    #[serde(default = "default_snmp_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for SnmpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnmpConfig")
            .field("community", &self.community.as_ref().map(|_| "<REDACTED>"))
            .field("community_env", &self.community_env)
            .field("command", &self.command)
            .field("version", &self.version)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct IpamConfig {
    pub url: String,
    pub app_id: String,
    /// Literal API token. Prefer `app_code_env`.
    #[serde(default)]
    pub app_code: Option<String>,
    /// Name of the env var holding the API token.
    #[serde(default)]
    pub app_code_env: Option<String>,
    #[serde(default)]
    pub verify_ssl: bool,
    #[serde(default = "default_ipam_timeout_secs")]
    pub timeout_secs: u64,
}

impl fmt::Debug for IpamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpamConfig")
            .field("url", &self.url)
            .field("app_id", &self.app_id)
            .field("app_code", &self.app_code.as_ref().map(|_| "<REDACTED>"))
            .field("app_code_env", &self.app_code_env)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Raw vendor profile as written in YAML. Compiled by `vsync-discovery`.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorConfig {
    pub oid: String,
    pub pattern: String,
    #[serde(default)]
    pub skip: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub ip: String,
    pub vendor: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackupConfig {
    #[serde(default = "default_backup_dir")]
    pub dir: PathBuf,
}

/// Console logging is always on; `file` additionally appends every line to a file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: default_backup_dir(),
        }
    }
}

fn default_snmp_command() -> String {
    DEFAULT_SNMP_COMMAND.to_string()
}

fn default_snmp_version() -> String {
    DEFAULT_SNMP_VERSION.to_string()
}

fn default_snmp_timeout_secs() -> u64 {
    DEFAULT_SNMP_TIMEOUT_SECS
}

fn default_ipam_timeout_secs() -> u64 {
    DEFAULT_IPAM_TIMEOUT_SECS
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BACKUP_DIR)
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Layered loading + hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Deserialize the merged document into the typed view.
    pub fn typed(&self) -> Result<SyncConfig> {
        serde_json::from_value(self.config_json.clone())
            .context("config does not match the expected schema")
    }
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json::Map is BTreeMap-backed (no preserve_order feature), so keys serialize sorted.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
snmp:
  community: public
vendors:
  cisco:
    oid: 1.3.6.1.4.1.9.9.46.1.3.1.1.4
    pattern: '\.(\d+) = STRING: "(.*)"'
devices:
  - name: sw1
    ip: 10.0.0.1
    vendor: cisco
"#;

    #[test]
    fn typed_view_applies_defaults() {
        let cfg = load_layered_yaml_from_strings(&[MINIMAL])
            .unwrap()
            .typed()
            .unwrap();
        assert_eq!(cfg.snmp.command, "snmpwalk");
        assert_eq!(cfg.snmp.version, "2c");
        assert_eq!(cfg.snmp.timeout_secs, 30);
        assert!(cfg.phpipam.is_none());
        assert!(cfg.devices[0].enabled);
        assert!(cfg.vendors["cisco"].skip.is_empty());
        assert_eq!(cfg.backup.dir, PathBuf::from("backups"));
        assert!(cfg.log.file.is_none());
    }

    #[test]
    fn later_layer_overrides_earlier() {
        let overlay = r#"
snmp:
  timeout_secs: 5
"#;
        let cfg = load_layered_yaml_from_strings(&[MINIMAL, overlay])
            .unwrap()
            .typed()
            .unwrap();
        assert_eq!(cfg.snmp.timeout_secs, 5);
        assert_eq!(cfg.snmp.community.as_deref(), Some("public"));
    }

    #[test]
    fn log_file_is_read_when_set() {
        let overlay = "log:\n  file: /var/log/netmap_vlans/vlan_discovery.log\n";
        let cfg = load_layered_yaml_from_strings(&[MINIMAL, overlay])
            .unwrap()
            .typed()
            .unwrap();
        assert_eq!(
            cfg.log.file,
            Some(PathBuf::from("/var/log/netmap_vlans/vlan_discovery.log"))
        );
    }

    #[test]
    fn enabled_devices_skips_disabled_in_order() {
        let yaml = r#"
snmp: {community: public}
vendors: {}
devices:
  - {name: a, ip: 10.0.0.1, vendor: x}
  - {name: b, ip: 10.0.0.2, vendor: x, enabled: false}
  - {name: c, ip: 10.0.0.3, vendor: x}
"#;
        let cfg = load_layered_yaml_from_strings(&[yaml])
            .unwrap()
            .typed()
            .unwrap();
        let names: Vec<&str> = cfg.enabled_devices().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(cfg.device("b").is_some());
    }

    #[test]
    fn debug_redacts_literal_secrets() {
        let yaml = r#"
snmp: {community: s3cret-community}
vendors: {}
phpipam: {url: "https://ipam", app_id: app, app_code: s3cret-token}
"#;
        let cfg = load_layered_yaml_from_strings(&[yaml])
            .unwrap()
            .typed()
            .unwrap();
        let dbg = format!("{:?}", cfg);
        assert!(!dbg.contains("s3cret"));
        assert!(dbg.contains("<REDACTED>"));
    }
}
