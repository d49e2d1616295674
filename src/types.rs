//! Domain types shared across the crate: power state, the custom-field
//! schema and its per-VM values, managed object references, and the
//! per-query VM snapshot.

use serde::{Deserialize, Serialize};

/// Runtime power status reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    Suspended,
    #[serde(other)]
    Unknown,
}

impl Default for PowerState {
    fn default() -> Self {
        Self::Unknown
    }
}

/// One entry of the deployment's custom-field schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldDef {
    pub key: i32,
    pub name: String,
}

/// One per-VM custom value, keyed into the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    pub key: i32,
    pub value: String,
}

/// Reference to a managed object, e.g. `vm-42`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: String,
    pub kind: String,
}

impl ObjectRef {
    pub fn vm(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "VirtualMachine".into(),
        }
    }

    pub fn host(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: "HostSystem".into(),
        }
    }
}

/// Point-in-time picture of one VM, assembled per query result and
/// discarded after use. Identity is the managed-object reference only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmSnapshot {
    pub moref: String,
    pub name: String,
    pub power_state: PowerState,
    #[serde(default)]
    pub guest_ip: Option<String>,
    #[serde(default)]
    pub guest_os: Option<String>,
    #[serde(default)]
    pub cpu_count: Option<u32>,
    #[serde(default)]
    pub memory_mib: Option<u64>,
    #[serde(default)]
    pub available_fields: Vec<CustomFieldDef>,
    #[serde(default)]
    pub custom_values: Vec<CustomFieldValue>,
}

/// Summary block handed to reporting scripts. Only produced for VMs
/// whose guest agent reports an IP address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmInfo {
    pub ip: String,
    pub name: String,
    pub os: Option<String>,
    pub cpu_num: Option<u32>,
    pub memory_mib: Option<u64>,
    pub status: PowerState,
}
