use vsync_config::{load_layered_yaml_from_strings, report_unused_keys, ConfigMode, UnusedKeyPolicy};

const YAML: &str = r#"
snmp:
  community: public
vendors: {}
devices: []
log:
  file: /var/log/netmap_vlans/vlan_discovery.log
phpipam:
  url: "https://ipam.example.net/api"
  app_id: netmap
"#;

#[test]
fn discover_mode_flags_inventory_section_as_unused() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let report =
        report_unused_keys(ConfigMode::Discover, &loaded.config_json, UnusedKeyPolicy::Warn)
            .expect("warn mode must not error");

    assert!(!report.is_clean());
    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/phpipam/app_id".to_string(), "/phpipam/url".to_string()]
    );
}

#[test]
fn sync_mode_consumes_inventory_section() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).unwrap();
    let report = report_unused_keys(ConfigMode::Sync, &loaded.config_json, UnusedKeyPolicy::Fail)
        .expect("everything is consumed in SYNC mode");
    assert!(report.is_clean());
}

#[test]
fn fail_policy_errors_on_typo_section() {
    let yaml = format!("{YAML}\ndevcies:\n  - name: sw1\n");
    let loaded = load_layered_yaml_from_strings(&[yaml.as_str()]).unwrap();
    let err = report_unused_keys(ConfigMode::Sync, &loaded.config_json, UnusedKeyPolicy::Fail)
        .unwrap_err();
    let msg = format!("{:?}", err);
    assert!(msg.contains("CONFIG_UNUSED_KEYS"));
    assert!(msg.contains("/devcies/0/name"));
}
