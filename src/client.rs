//! Session-authenticated REST client for the management platform.
//!
//! Implements the `vim` contracts over the platform's HTTP API and
//! assembles per-VM snapshots. One client plays the role the SDK
//! "content" object plays for scripts: custom fields, search and
//! container views all hang off it.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::config::VcConfig;
use crate::error::{Error, Result};
use crate::types::{CustomFieldDef, CustomFieldValue, ObjectRef, PowerState, VmSnapshot};
use crate::vim::{ContainerView, CustomFieldsManager, SearchIndex, ViewManager};

const SESSION_HEADER: &str = "vmware-api-session-id";

pub struct VcClient {
    http: Client,
    base_url: String,
    session_id: Option<String>,
    config: VcConfig,
}

impl VcClient {
    /// Build a client from config. Does not open a session yet.
    pub fn new(config: &VcConfig) -> Result<Self> {
        let http = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("https://{}:{}", config.host, config.port),
            session_id: None,
            config: config.clone(),
        })
    }

    pub fn is_connected(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn config(&self) -> &VcConfig {
        &self.config
    }

    /// Open an API session (POST /api/session).
    #[instrument(skip(self))]
    pub async fn login(&mut self) -> Result<()> {
        let url = format!("{}/api/session", self.base_url);
        debug!("Opening session on {}", self.base_url);

        let resp = self
            .http
            .post(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Auth("invalid credentials".into()));
        }
        let resp = Self::check_status(resp).await?;

        // The session id comes back as a bare JSON string.
        self.session_id = Some(Self::parse_json::<String>(resp).await?);
        Ok(())
    }

    /// Drop the session (DELETE /api/session). Safe to call when not
    /// logged in.
    pub async fn logout(&mut self) -> Result<()> {
        if let Some(sid) = self.session_id.take() {
            let url = format!("{}/api/session", self.base_url);
            let _ = self
                .http
                .delete(&url)
                .header(SESSION_HEADER, sid)
                .send()
                .await;
        }
        Ok(())
    }

    /// Fetch everything the [`crate::vm::Vm`] facade needs for one
    /// machine and assemble it into a snapshot.
    #[instrument(skip(self))]
    pub async fn vm_snapshot(&self, vm_id: &str) -> Result<VmSnapshot> {
        debug!("Fetching VM detail for {}", vm_id);
        let detail: VmDetail = self.get(&format!("/api/vcenter/vm/{vm_id}")).await?;
        let identity: Option<GuestIdentity> = self
            .get_optional(&format!("/api/vcenter/vm/{vm_id}/guest/identity"))
            .await?;
        let available_fields: Vec<CustomFieldDef> =
            self.get("/api/vcenter/custom-field-defs").await?;
        let custom_values: Vec<CustomFieldValue> = self
            .get(&format!("/api/vcenter/vm/{vm_id}/custom-fields"))
            .await?;

        let (guest_ip, identity_os) = match identity {
            Some(identity) => (
                identity.ip_address,
                identity.full_name.map(|m| m.default_message),
            ),
            None => (None, None),
        };

        Ok(VmSnapshot {
            moref: vm_id.to_string(),
            name: detail.name,
            power_state: detail.power_state,
            guest_ip,
            guest_os: identity_os.or(detail.guest_os),
            cpu_count: Some(detail.cpu.count),
            memory_mib: Some(detail.memory.size_mib),
            available_fields,
            custom_values,
        })
    }

    // ── HTTP plumbing ───────────────────────────────────────────────

    fn require_session(&self) -> Result<&str> {
        self.session_id
            .as_deref()
            .ok_or_else(|| Error::Auth("not logged in".into()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_params(path, &[]).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let sid = self.require_session()?;
        let url = format!("{}{}", self.base_url, path);
        trace!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .header(SESSION_HEADER, sid)
            .query(params)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Self::parse_json(resp).await
    }

    /// GET where an unreachable resource is a plain `None`: 404 for
    /// objects that are gone, 503 for guest identity while the guest
    /// agent is down.
    async fn get_optional<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let sid = self.require_session()?;
        let url = format!("{}{}", self.base_url, path);
        trace!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .header(SESSION_HEADER, sid)
            .send()
            .await?;
        if matches!(
            resp.status(),
            StatusCode::NOT_FOUND | StatusCode::SERVICE_UNAVAILABLE
        ) {
            return Ok(None);
        }
        let resp = Self::check_status(resp).await?;
        Ok(Some(Self::parse_json(resp).await?))
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        let sid = self.require_session()?;
        let url = format!("{}{}", self.base_url, path);
        trace!("POST {}", url);

        let resp = self
            .http
            .post(&url)
            .header(SESSION_HEADER, sid)
            .json(body)
            .send()
            .await?;
        Self::check_status(resp).await?;
        Ok(())
    }

    async fn parse_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn check_status(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => {
                Err(Error::Auth(format!("session expired or invalid: {body}")))
            }
            _ => Err(Error::Api {
                status: status.as_u16(),
                message: body,
            }),
        }
    }
}

#[async_trait]
impl CustomFieldsManager for VcClient {
    async fn set_field(&self, entity: &str, key: i32, value: &str) -> Result<()> {
        debug!("Setting custom field {} on {}", key, entity);
        self.post_json(
            "/api/vcenter/custom-fields",
            &SetFieldSpec { entity, key, value },
        )
        .await
    }
}

#[async_trait]
impl SearchIndex for VcClient {
    async fn find_by_ip(&self, ip: &str, vm_search: bool) -> Result<Option<ObjectRef>> {
        if vm_search {
            let matches: Vec<VmListItem> = self
                .get_with_params("/api/vcenter/vm", &[("guest_ips", ip)])
                .await?;
            Ok(matches.into_iter().next().map(|m| ObjectRef::vm(m.vm)))
        } else {
            let matches: Vec<HostListItem> = self
                .get_with_params("/api/vcenter/host", &[("ip_addresses", ip)])
                .await?;
            Ok(matches.into_iter().next().map(|m| ObjectRef::host(m.host)))
        }
    }

    async fn find_by_dns_name(
        &self,
        dns_name: &str,
        vm_search: bool,
    ) -> Result<Option<ObjectRef>> {
        // Inventory names track guest DNS names in this deployment.
        if vm_search {
            let matches: Vec<VmListItem> = self
                .get_with_params("/api/vcenter/vm", &[("names", dns_name)])
                .await?;
            Ok(matches.into_iter().next().map(|m| ObjectRef::vm(m.vm)))
        } else {
            let matches: Vec<HostListItem> = self
                .get_with_params("/api/vcenter/host", &[("names", dns_name)])
                .await?;
            Ok(matches.into_iter().next().map(|m| ObjectRef::host(m.host)))
        }
    }
}

/// Snapshot-backed view: the list is materialized at creation, so
/// destroying it releases nothing on the platform side.
struct RestContainerView {
    objects: Vec<ObjectRef>,
}

#[async_trait]
impl ContainerView for RestContainerView {
    fn view(&self) -> &[ObjectRef] {
        &self.objects
    }

    async fn destroy(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl ViewManager for VcClient {
    async fn create_container_view(
        &self,
        root: &str,
        kind: &str,
        recursive: bool,
    ) -> Result<Box<dyn ContainerView>> {
        let (path, id_field) = match kind {
            "VirtualMachine" => ("/api/vcenter/vm", "vm"),
            "HostSystem" => ("/api/vcenter/host", "host"),
            "Datastore" => ("/api/vcenter/datastore", "datastore"),
            "Network" => ("/api/vcenter/network", "network"),
            "Folder" => ("/api/vcenter/folder", "folder"),
            _ => return Err(Error::UnsupportedKind(kind.to_string())),
        };
        if !recursive {
            // Inventory listings are always recursive on this transport.
            trace!("Non-recursive view requested for {}; serving recursive", kind);
        }

        let mut params: Vec<(&str, &str)> = Vec::new();
        if !root.is_empty() {
            params.push(("folders", root));
        }

        let items: Vec<serde_json::Value> = self.get_with_params(path, &params).await?;
        let objects = items
            .iter()
            .filter_map(|item| item.get(id_field).and_then(|v| v.as_str()))
            .map(|id| ObjectRef {
                id: id.to_string(),
                kind: kind.to_string(),
            })
            .collect();

        Ok(Box::new(RestContainerView { objects }))
    }
}

// ── Wire shapes ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct VmListItem {
    vm: String,
}

#[derive(Debug, Deserialize)]
struct HostListItem {
    host: String,
}

#[derive(Debug, Deserialize)]
struct VmDetail {
    name: String,
    power_state: PowerState,
    cpu: CpuInfo,
    memory: MemoryInfo,
    #[serde(rename = "guest_OS", default)]
    guest_os: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CpuInfo {
    count: u32,
}

#[derive(Debug, Deserialize)]
struct MemoryInfo {
    #[serde(rename = "size_MiB")]
    size_mib: u64,
}

#[derive(Debug, Deserialize)]
struct GuestIdentity {
    #[serde(default)]
    ip_address: Option<String>,
    #[serde(default)]
    full_name: Option<LocalizableMessage>,
}

#[derive(Debug, Deserialize)]
struct LocalizableMessage {
    default_message: String,
}

#[derive(Debug, Serialize)]
struct SetFieldSpec<'a> {
    entity: &'a str,
    key: i32,
    value: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VcConfig {
        VcConfig {
            host: "vcenter.lab.local".into(),
            port: 443,
            username: "svc-inventory".into(),
            password: "pw".into(),
            insecure: true,
            timeout_secs: 5,
        }
    }

    #[test]
    fn new_builds_the_base_url() {
        let client = VcClient::new(&config()).unwrap();
        assert_eq!(client.base_url, "https://vcenter.lab.local:443");
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn requests_require_a_session() {
        let client = VcClient::new(&config()).unwrap();
        let err = client.vm_snapshot("vm-42").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn unknown_view_kinds_are_rejected() {
        let client = VcClient::new(&config()).unwrap();
        let err = client
            .create_container_view("", "DistributedVirtualPortgroup", true)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnsupportedKind(_)));
    }
}
