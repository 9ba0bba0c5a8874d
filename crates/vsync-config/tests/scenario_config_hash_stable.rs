//! Config hash stability: key order inside YAML must not change the hash,
//! different values must.

use vsync_config::load_layered_yaml_from_strings;

const BASE_YAML: &str = r#"
snmp:
  community_env: "VSYNC_COMMUNITY"
  timeout_secs: 30
vendors:
  cisco:
    oid: "1.3.6.1.4.1.9.9.46.1.3.1.1.4"
    pattern: '\.(\d+) = STRING: "(.*)"'
"#;

const BASE_YAML_REORDERED: &str = r#"
vendors:
  cisco:
    pattern: '\.(\d+) = STRING: "(.*)"'
    oid: "1.3.6.1.4.1.9.9.46.1.3.1.1.4"
snmp:
  timeout_secs: 30
  community_env: "VSYNC_COMMUNITY"
"#;

#[test]
fn same_input_same_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.config_hash.len(), 64);
}

#[test]
fn key_order_does_not_change_hash() {
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML_REORDERED]).unwrap();
    assert_eq!(a.config_hash, b.config_hash);
    assert_eq!(a.canonical_json, b.canonical_json);
}

#[test]
fn different_values_change_hash() {
    let overlay = "snmp:\n  timeout_secs: 5\n";
    let a = load_layered_yaml_from_strings(&[BASE_YAML]).unwrap();
    let b = load_layered_yaml_from_strings(&[BASE_YAML, overlay]).unwrap();
    assert_ne!(a.config_hash, b.config_hash);
}
