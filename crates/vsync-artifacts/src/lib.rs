use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use vsync_schemas::VlanRecord;

/// Filename timestamp: `YYYYMMDD-HHMMSS`.
pub const SNAPSHOT_TS_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Writes point-in-time VLAN snapshots as `<dir>/<device>-<YYYYMMDD-HHMMSS>.json`.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshot stamped with the current local time.
    pub fn write(&self, device: &str, records: &[VlanRecord]) -> Result<PathBuf> {
        self.write_at(device, records, Local::now())
    }

    pub fn write_at<Tz: TimeZone>(
        &self,
        device: &str,
        records: &[VlanRecord],
        at: DateTime<Tz>,
    ) -> Result<PathBuf>
    where
        Tz::Offset: std::fmt::Display,
    {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create backup dir failed: {}", self.dir.display()))?;

        let path = self.dir.join(snapshot_file_name(device, &at));
        let json = serde_json::to_string_pretty(records).context("serialize snapshot failed")?;
        fs::write(&path, format!("{json}\n"))
            .with_context(|| format!("write snapshot failed: {}", path.display()))?;

        Ok(path)
    }
}

pub fn snapshot_file_name<Tz: TimeZone>(device: &str, at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}-{}.json", device, at.format(SNAPSHOT_TS_FORMAT))
}

/// Read a snapshot back in file order.
pub fn load_snapshot(path: &Path) -> Result<Vec<VlanRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read snapshot failed: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse snapshot failed: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn file_name_uses_compact_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(snapshot_file_name("sw-core-01", &at), "sw-core-01-20250307-140509.json");
    }
}
