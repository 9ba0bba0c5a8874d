use std::fs;
use tempfile::tempdir;
use vsync_config::load_layered_yaml;

#[test]
fn missing_file_is_an_error_naming_the_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("config.yaml");
    let missing_s = missing.to_string_lossy().to_string();

    let err = load_layered_yaml(&[missing_s.as_str()]).unwrap_err();
    assert!(format!("{:#}", err).contains("config.yaml"));
}

#[test]
fn files_merge_in_argument_order() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let site = dir.path().join("site.yaml");
    fs::write(
        &base,
        "snmp: {community: public}\nvendors: {}\ndevices:\n  - {name: a, ip: 10.0.0.1, vendor: x}\n",
    )
    .unwrap();
    fs::write(&site, "snmp: {community: private}\n").unwrap();

    let base_s = base.to_string_lossy().to_string();
    let site_s = site.to_string_lossy().to_string();
    let cfg = load_layered_yaml(&[base_s.as_str(), site_s.as_str()])
        .unwrap()
        .typed()
        .unwrap();

    assert_eq!(cfg.snmp.community.as_deref(), Some("private"));
    assert_eq!(cfg.devices.len(), 1);
}

#[test]
fn invalid_yaml_is_rejected() {
    let dir = tempdir().unwrap();
    let bad = dir.path().join("bad.yaml");
    fs::write(&bad, "snmp: [unclosed\n").unwrap();
    let bad_s = bad.to_string_lossy().to_string();
    assert!(load_layered_yaml(&[bad_s.as_str()]).is_err());
}

#[test]
fn schema_mismatch_is_rejected_by_typed_view() {
    // `vendors` is required.
    let loaded = vsync_config::load_layered_yaml_from_strings(&["snmp: {community: public}\n"]).unwrap();
    assert!(loaded.typed().is_err());
}
