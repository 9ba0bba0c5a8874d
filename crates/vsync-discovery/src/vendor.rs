use std::collections::{BTreeMap, BTreeSet};

use anyhow::{bail, Context, Result};
use regex::Regex;
use vsync_config::VendorConfig;

/// Compiled vendor profile: what to walk and how to read each output line.
#[derive(Debug, Clone)]
pub struct VendorProfile {
    oid: String,
    pattern: Regex,
    skip: BTreeSet<String>,
}

impl VendorProfile {
    /// `pattern` must have one or two capture groups: the VLAN id and, optionally, its name.
    pub fn new(
        oid: impl Into<String>,
        pattern: &str,
        skip: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let pattern = Regex::new(pattern).with_context(|| format!("invalid pattern: {pattern}"))?;
        if pattern.captures_len() < 2 {
            bail!("pattern must capture the VLAN id: {}", pattern.as_str());
        }
        Ok(Self {
            oid: oid.into(),
            pattern,
            skip: skip.into_iter().collect(),
        })
    }

    pub fn oid(&self) -> &str {
        &self.oid
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// True when the pattern has exactly two groups, the second being the name.
    pub fn captures_name(&self) -> bool {
        // captures_len counts the implicit whole-match group 0
        self.pattern.captures_len() == 3
    }

    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip.contains(name)
    }
}

/// Vendor id -> profile. Built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct VendorTable {
    profiles: BTreeMap<String, VendorProfile>,
}

impl VendorTable {
    pub fn from_config(raw: &BTreeMap<String, VendorConfig>) -> Result<Self> {
        let mut profiles = BTreeMap::new();
        for (id, v) in raw {
            let profile = VendorProfile::new(v.oid.clone(), &v.pattern, v.skip.iter().cloned())
                .with_context(|| format!("vendor '{id}'"))?;
            profiles.insert(id.clone(), profile);
        }
        Ok(Self { profiles })
    }

    pub fn get(&self, id: &str) -> Option<&VendorProfile> {
        self.profiles.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_pattern_without_groups() {
        assert!(VendorProfile::new("1.2.3", r"\d+", Vec::new()).is_err());
    }

    #[test]
    fn rejects_invalid_regex() {
        assert!(VendorProfile::new("1.2.3", r"(\d+", Vec::new()).is_err());
    }

    #[test]
    fn name_group_detection() {
        let one = VendorProfile::new("1.2.3", r"\.(\d+) = ", Vec::new()).unwrap();
        let two = VendorProfile::new("1.2.3", r#"\.(\d+) = STRING: "(.*)""#, Vec::new()).unwrap();
        assert!(!one.captures_name());
        assert!(two.captures_name());
    }

    #[test]
    fn table_error_names_the_vendor() {
        let mut raw = BTreeMap::new();
        raw.insert(
            "hp".to_string(),
            VendorConfig {
                oid: "1.3.6.1.2.1.17.7.1.4.3.1.1".to_string(),
                pattern: "(".to_string(),
                skip: Vec::new(),
            },
        );
        let err = VendorTable::from_config(&raw).unwrap_err();
        assert!(format!("{:#}", err).contains("vendor 'hp'"));
    }
}
