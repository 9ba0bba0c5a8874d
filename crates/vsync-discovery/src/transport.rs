//! SNMP transport capability.
//!
//! Discovery only needs "walk this OID on this device and give me the text".
//! [`SnmpWalkCommand`] does that with the net-snmp `snmpwalk` binary; a native
//! client can slot in behind the same trait.

use std::fmt;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};
use vsync_config::{SnmpConfig, DEFAULT_SNMP_COMMAND, DEFAULT_SNMP_TIMEOUT_SECS, DEFAULT_SNMP_VERSION};

/// One walk against one device.
#[derive(Debug, Clone, Copy)]
pub struct WalkRequest<'a> {
    pub address: &'a str,
    pub community: &'a str,
    pub oid: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The command could not be started (missing binary, permissions).
    Spawn(String),
    /// The command did not finish within the ceiling; it is killed.
    Timeout(Duration),
    /// The command exited unsuccessfully.
    Status { code: Option<i32>, stderr: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Spawn(msg) => write!(f, "failed to start snmp command: {msg}"),
            TransportError::Timeout(d) => write!(f, "snmp command timed out after {}s", d.as_secs_f64()),
            TransportError::Status {
                code: Some(c),
                stderr,
            } => write!(f, "snmp command exited with status {c}: {stderr}"),
            TransportError::Status { code: None, stderr } => {
                write!(f, "snmp command terminated by signal: {stderr}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

#[async_trait]
pub trait SnmpTransport: Send + Sync {
    /// Returns the raw text output, one line per returned value.
    async fn walk(&self, req: &WalkRequest<'_>) -> Result<String, TransportError>;
}

/// `snmpwalk -v<version> -c <community> <address> <oid>` with a hard timeout.
#[derive(Debug, Clone)]
pub struct SnmpWalkCommand {
    program: String,
    version: String,
    timeout: Duration,
}

impl Default for SnmpWalkCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_SNMP_COMMAND.to_string(),
            version: DEFAULT_SNMP_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_SNMP_TIMEOUT_SECS),
        }
    }
}

impl SnmpWalkCommand {
    pub fn new(program: impl Into<String>, version: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            version: version.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &SnmpConfig) -> Self {
        Self::new(
            cfg.command.clone(),
            cfg.version.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn args(&self, req: &WalkRequest<'_>) -> Vec<String> {
        vec![
            format!("-v{}", self.version),
            "-c".to_string(),
            req.community.to_string(),
            req.address.to_string(),
            req.oid.to_string(),
        ]
    }

    /// Command line for logs. The community string is never printed.
    fn display_command(&self, req: &WalkRequest<'_>) -> String {
        format!(
            "{} -v{} -c <REDACTED> {} {}",
            self.program, self.version, req.address, req.oid
        )
    }
}

#[async_trait]
impl SnmpTransport for SnmpWalkCommand {
    async fn walk(&self, req: &WalkRequest<'_>) -> Result<String, TransportError> {
        info!("running: {}", self.display_command(req));

        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(req))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => return Err(TransportError::Timeout(self.timeout)),
            Ok(Err(e)) => return Err(TransportError::Spawn(e.to_string())),
            Ok(Ok(out)) => out,
        };

        if !output.status.success() {
            return Err(TransportError::Status {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(address = %req.address, bytes = stdout.len(), "walk complete");
        Ok(stdout)
    }
}
