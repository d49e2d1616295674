//! Per-VM facade: custom-attribute join and mutation, summary
//! extraction, and the "installed within the last 30 days" check.

use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::types::{PowerState, VmInfo, VmSnapshot};
use crate::vim::CustomFieldsManager;

/// How far back an installation still counts as new.
const NEW_VM_WINDOW_DAYS: i64 = 30;

const CREATE_DATE_FORMAT: &str = "%d-%m-%Y";

/// Facade over one VM snapshot.
pub struct Vm {
    snapshot: VmSnapshot,
}

impl Vm {
    pub fn new(snapshot: VmSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn name(&self) -> &str {
        &self.snapshot.name
    }

    pub fn power_state(&self) -> PowerState {
        self.snapshot.power_state
    }

    pub fn guest_ip(&self) -> Option<&str> {
        self.snapshot.guest_ip.as_deref()
    }

    /// Join the deployment's field schema against this VM's values and
    /// return the result as name → value. Empty when no fields are
    /// defined. A name resolving to more than one value is an error.
    pub fn attributes(&self) -> Result<HashMap<String, String>> {
        let mut attrs = HashMap::new();
        for field in &self.snapshot.available_fields {
            for val in &self.snapshot.custom_values {
                if field.key == val.key
                    && attrs
                        .insert(field.name.clone(), val.value.clone())
                        .is_some()
                {
                    return Err(Error::DuplicateField(field.name.clone()));
                }
            }
        }
        Ok(attrs)
    }

    /// Write `new_value` into the custom field named `attribute_name`.
    /// Returns whether a matching field with a current value entry
    /// existed and the write was issued; a miss on either side is a
    /// quiet `false` with no call to the platform.
    pub async fn set_attribute(
        &self,
        fields: &dyn CustomFieldsManager,
        attribute_name: &str,
        new_value: &str,
    ) -> Result<bool> {
        let Some(field) = self
            .snapshot
            .available_fields
            .iter()
            .find(|f| f.name == attribute_name)
        else {
            return Ok(false);
        };
        let Some(current) = self
            .snapshot
            .custom_values
            .iter()
            .find(|v| v.key == field.key)
        else {
            return Ok(false);
        };

        fields
            .set_field(&self.snapshot.moref, current.key, new_value)
            .await?;
        debug!(
            "Set attribute {} = {} on {}",
            attribute_name, new_value, self.snapshot.name
        );
        Ok(true)
    }

    /// Basic report block for this VM. `None` unless the guest agent
    /// reports an IP address.
    pub fn info(&self) -> Option<VmInfo> {
        let ip = self.snapshot.guest_ip.as_deref()?;
        if ip.is_empty() {
            return None;
        }

        Some(VmInfo {
            ip: ip.to_string(),
            name: self.snapshot.name.clone(),
            os: self.snapshot.guest_os.clone(),
            cpu_num: self.snapshot.cpu_count,
            memory_mib: self.snapshot.memory_mib,
            status: self.snapshot.power_state,
        })
    }

    /// Whether `create_time` falls within the last 30 days. The date is
    /// the first whitespace-delimited token, `DD-MM-YYYY`; exactly 30
    /// days ago still counts as new.
    pub fn created_recently(&self, create_time: &str) -> Result<bool> {
        created_since(create_time, Local::now().date_naive())
    }
}

fn created_since(create_time: &str, today: NaiveDate) -> Result<bool> {
    let token = create_time.split_whitespace().next().unwrap_or(create_time);
    let created = NaiveDate::parse_from_str(token, CREATE_DATE_FORMAT)?;
    let threshold = today - Duration::days(NEW_VM_WINDOW_DAYS);
    Ok(created >= threshold)
}
