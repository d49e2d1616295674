//! Search-index lookups: locate one VM by guest IP or by DNS name.

use tracing::instrument;

use crate::error::Result;
use crate::types::ObjectRef;
use crate::vim::SearchIndex;

/// Locate the VM currently holding `ip`. `None` when the index has no
/// match.
#[instrument(skip(index))]
pub async fn find_by_ip(index: &dyn SearchIndex, ip: &str) -> Result<Option<ObjectRef>> {
    index.find_by_ip(ip, true).await
}

/// Locate the VM registered under `dns_name`. `None` when the index
/// has no match.
#[instrument(skip(index))]
pub async fn find_by_name(index: &dyn SearchIndex, dns_name: &str) -> Result<Option<ObjectRef>> {
    index.find_by_dns_name(dns_name, true).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubIndex {
        by_ip: Option<ObjectRef>,
        by_name: Option<ObjectRef>,
        queries: Mutex<Vec<(String, bool)>>,
    }

    #[async_trait]
    impl SearchIndex for StubIndex {
        async fn find_by_ip(&self, ip: &str, vm_search: bool) -> Result<Option<ObjectRef>> {
            self.queries.lock().unwrap().push((ip.to_string(), vm_search));
            Ok(self.by_ip.clone())
        }

        async fn find_by_dns_name(
            &self,
            dns_name: &str,
            vm_search: bool,
        ) -> Result<Option<ObjectRef>> {
            self.queries
                .lock()
                .unwrap()
                .push((dns_name.to_string(), vm_search));
            Ok(self.by_name.clone())
        }
    }

    #[tokio::test]
    async fn ip_lookup_delegates_with_vm_search() {
        let index = StubIndex {
            by_ip: Some(ObjectRef::vm("vm-7")),
            ..Default::default()
        };

        let found = find_by_ip(&index, "10.20.0.7").await.unwrap();
        assert_eq!(found, Some(ObjectRef::vm("vm-7")));
        assert_eq!(
            index.queries.lock().unwrap().as_slice(),
            &[("10.20.0.7".to_string(), true)]
        );
    }

    #[tokio::test]
    async fn name_lookup_returns_none_on_miss() {
        let index = StubIndex::default();

        let found = find_by_name(&index, "web01.lab.local").await.unwrap();
        assert_eq!(found, None);
        assert_eq!(
            index.queries.lock().unwrap().as_slice(),
            &[("web01.lab.local".to_string(), true)]
        );
    }
}
