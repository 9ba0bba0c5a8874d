//! Runtime secret resolution.
//!
//! - YAML may carry either a literal (`community`, `app_code`) or the NAME of an env var
//!   (`community_env`, `app_code_env`). The env var wins when both are present.
//! - Callers resolve once at startup and pass [`ResolvedSecrets`] into constructors.
//! - `Debug` redacts values; error messages name the env var, never the value.

use anyhow::{bail, Result};

use crate::{ConfigMode, SyncConfig};

#[derive(Clone)]
pub struct ResolvedSecrets {
    /// SNMP v2c community string. Always required.
    pub community: String,
    /// Inventory API token. Required in SYNC mode, `None` otherwise if absent.
    pub ipam_token: Option<String>,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("community", &"<REDACTED>")
            .field("ipam_token", &self.ipam_token.as_ref().map(|_| "<REDACTED>"))
            .finish()
    }
}

/// Resolve secrets from the process environment.
pub fn resolve_secrets(cfg: &SyncConfig, mode: ConfigMode) -> Result<ResolvedSecrets> {
    resolve_secrets_with(cfg, mode, |name| std::env::var(name).ok())
}

/// Same as [`resolve_secrets`] with an injectable env lookup.
pub fn resolve_secrets_with<F>(cfg: &SyncConfig, mode: ConfigMode, lookup: F) -> Result<ResolvedSecrets>
where
    F: Fn(&str) -> Option<String>,
{
    let community = match pick(
        cfg.snmp.community_env.as_deref(),
        cfg.snmp.community.as_deref(),
        &lookup,
    )? {
        Some(c) => c,
        None => bail!("SECRETS_MISSING: snmp.community or snmp.community_env must be set"),
    };

    let ipam_token = match &cfg.phpipam {
        Some(ipam) => pick(ipam.app_code_env.as_deref(), ipam.app_code.as_deref(), &lookup)?,
        None => None,
    };

    if mode == ConfigMode::Sync {
        if cfg.phpipam.is_none() {
            bail!("SECRETS_MISSING mode=SYNC: phpipam section is required");
        }
        if ipam_token.is_none() {
            bail!("SECRETS_MISSING mode=SYNC: phpipam.app_code or phpipam.app_code_env must be set");
        }
    }

    Ok(ResolvedSecrets {
        community,
        ipam_token,
    })
}

/// Env var first, then literal. A named-but-unset env var is an error
/// (the operator asked for it explicitly).
fn pick<F>(env_name: Option<&str>, literal: Option<&str>, lookup: &F) -> Result<Option<String>>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(name) = env_name.map(str::trim).filter(|n| !n.is_empty()) {
        return match lookup(name).filter(|v| !v.trim().is_empty()) {
            Some(v) => Ok(Some(v)),
            None => bail!("SECRETS_MISSING: env var '{}' is not set or empty", name),
        };
    }
    Ok(literal
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string))
}
