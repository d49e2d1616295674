//! Narrow contracts over the management platform's services.
//!
//! The facade modules depend on these traits rather than on a concrete
//! client, so callers can substitute their own transport. Tests use
//! recording stubs.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ObjectRef;

/// Platform service that writes custom-field values.
#[async_trait]
pub trait CustomFieldsManager {
    /// Set field `key` on `entity` to `value`.
    async fn set_field(&self, entity: &str, key: i32, value: &str) -> Result<()>;
}

/// Platform search service. At most one match per lookup, per the
/// platform's own contract.
#[async_trait]
pub trait SearchIndex {
    async fn find_by_ip(&self, ip: &str, vm_search: bool) -> Result<Option<ObjectRef>>;

    async fn find_by_dns_name(&self, dns_name: &str, vm_search: bool)
        -> Result<Option<ObjectRef>>;
}

/// A created container view. Holds the enumerated objects until
/// destroyed.
#[async_trait]
pub trait ContainerView: Send {
    fn view(&self) -> &[ObjectRef];

    /// Release the view resource.
    async fn destroy(self: Box<Self>) -> Result<()>;
}

/// Platform service that creates container views.
#[async_trait]
pub trait ViewManager {
    async fn create_container_view(
        &self,
        root: &str,
        kind: &str,
        recursive: bool,
    ) -> Result<Box<dyn ContainerView>>;
}
