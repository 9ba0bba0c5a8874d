use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, warn};
use vsync_config::{IpamConfig, DEFAULT_IPAM_TIMEOUT_SECS};

use crate::types::WireVlan;
use crate::{Inventory, InventoryDomain, InventoryError, InventoryVlanEntry};

/// Statuses treated as "no error". 409 is an idempotent re-create.
pub const ACCEPTED_STATUSES: [u16; 4] = [200, 201, 204, 409];

/// phpIPAM REST client: `{url}/{app_id}/{resource}` with a static `token` header.
///
/// Token is passed in by the caller (resolved secrets); it is never logged.
#[derive(Clone)]
pub struct PhpipamClient {
    base: String,
    token: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for PhpipamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhpipamClient")
            .field("base", &self.base)
            .field("token", &"<REDACTED>")
            .finish()
    }
}

impl PhpipamClient {
    pub fn new(
        url: &str,
        app_id: &str,
        token: impl Into<String>,
        verify_ssl: bool,
        timeout: Duration,
    ) -> Result<Self, InventoryError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()
            .map_err(|e| InventoryError::Config(e.to_string()))?;

        Ok(Self {
            base: format!("{}/{}", url.trim_end_matches('/'), app_id.trim_matches('/')),
            token: token.into(),
            http,
        })
    }

    pub fn from_config(cfg: &IpamConfig, token: impl Into<String>) -> Result<Self, InventoryError> {
        let timeout = if cfg.timeout_secs == 0 {
            DEFAULT_IPAM_TIMEOUT_SECS
        } else {
            cfg.timeout_secs
        };
        Self::new(
            &cfg.url,
            &cfg.app_id,
            token,
            cfg.verify_ssl,
            Duration::from_secs(timeout),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base, endpoint.trim_start_matches('/'))
    }

    /// One request. `Ok(None)` means an accepted status with no `data` payload.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>, InventoryError> {
        let url = self.url_for(endpoint);

        let mut rb = self
            .http
            .request(method.clone(), &url)
            .header("token", &self.token)
            .header(CONTENT_TYPE, "application/json");
        if let Some(b) = body {
            rb = rb.json(b);
        }

        let resp = rb.send().await.map_err(|e| {
            error!("{} {}: {}", method, url, e);
            InventoryError::Transport(e.to_string())
        })?;

        let status = resp.status().as_u16();
        if !ACCEPTED_STATUSES.contains(&status) {
            warn!("{} {} -> {}", method, url, status);
            return Err(InventoryError::Status {
                method: method.to_string(),
                url,
                status,
            });
        }

        let text = resp.text().await.map_err(|e| {
            error!("{} {}: body read failed: {}", method, url, e);
            InventoryError::Transport(e.to_string())
        })?;
        debug!(status, bytes = text.len(), "{} {}", method, url);

        if text.trim().is_empty() {
            return Ok(None);
        }

        let envelope: Value = serde_json::from_str(&text).map_err(|e| {
            error!("{} {}: invalid json: {}", method, url, e);
            InventoryError::Decode(e.to_string())
        })?;

        Ok(envelope.get("data").filter(|d| !d.is_null()).cloned())
    }

    fn data_array(data: Option<Value>) -> Result<Vec<Value>, InventoryError> {
        match data {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(InventoryError::Decode(format!(
                "expected array under 'data', got {}",
                json_kind(&other)
            ))),
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[async_trait]
impl Inventory for PhpipamClient {
    async fn list_domains(&self) -> Result<Vec<InventoryDomain>, InventoryError> {
        let data = self.request(Method::GET, "l2domains/", None).await?;
        let domains = Self::data_array(data)?
            .into_iter()
            .filter_map(|v| serde_json::from_value::<InventoryDomain>(v).ok())
            .collect();
        Ok(domains)
    }

    async fn create_domain(&self, name: &str, description: &str) -> Result<(), InventoryError> {
        let body = json!({ "name": name, "description": description });
        self.request(Method::POST, "l2domains/", Some(&body)).await?;
        Ok(())
    }

    async fn list_vlans(&self, domain_id: u64) -> Result<Vec<InventoryVlanEntry>, InventoryError> {
        let data = self
            .request(Method::GET, &format!("l2domains/{domain_id}/vlans/"), None)
            .await?;
        let vlans = Self::data_array(data)?
            .into_iter()
            .filter_map(|v| serde_json::from_value::<WireVlan>(v).ok())
            .filter_map(WireVlan::into_entry)
            .collect();
        Ok(vlans)
    }

    async fn create_vlan(
        &self,
        domain_id: u64,
        number: u32,
        name: &str,
        description: &str,
    ) -> Result<(), InventoryError> {
        let body = json!({
            "number": number,
            "name": name,
            "description": description,
            "domainId": domain_id,
        });
        self.request(Method::POST, "vlan/", Some(&body)).await?;
        Ok(())
    }

    async fn update_vlan(
        &self,
        vlan_record_id: u64,
        name: &str,
        description: &str,
    ) -> Result<(), InventoryError> {
        let body = json!({ "name": name, "description": description });
        self.request(Method::PATCH, &format!("vlan/{vlan_record_id}/"), Some(&body))
            .await?;
        Ok(())
    }

    async fn delete_vlan(&self, vlan_record_id: u64) -> Result<(), InventoryError> {
        self.request(Method::DELETE, &format!("vlan/{vlan_record_id}/"), None)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_joins_app_id_without_double_slashes() {
        let c = PhpipamClient::new(
            "https://ipam.example.net/api/",
            "netmap",
            "t",
            true,
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(c.base_url(), "https://ipam.example.net/api/netmap");
        assert_eq!(
            c.url_for("/l2domains/"),
            "https://ipam.example.net/api/netmap/l2domains/"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let c = PhpipamClient::new("https://ipam", "app", "t0ken", true, Duration::from_secs(1))
            .unwrap();
        assert!(!format!("{:?}", c).contains("t0ken"));
    }

    #[test]
    fn data_array_rejects_objects() {
        assert!(PhpipamClient::data_array(Some(json!({"id": 1}))).is_err());
        assert!(PhpipamClient::data_array(None).unwrap().is_empty());
    }
}
