//! Container-view wrapper: enumerate managed objects under a scope
//! root without holding the view resource afterwards.

use tracing::{debug, instrument};

use crate::error::Result;
use crate::types::ObjectRef;
use crate::vim::ViewManager;

/// Enumerate all objects of `kind` under `root`, recursively. The view
/// is destroyed before returning; the result is a plain snapshot.
#[instrument(skip(manager))]
pub async fn get_vim_objects(
    manager: &dyn ViewManager,
    root: &str,
    kind: &str,
) -> Result<Vec<ObjectRef>> {
    let container = manager.create_container_view(root, kind, true).await?;
    let objects = container.view().to_vec();
    container.destroy().await?;

    debug!("Container view under {} holds {} {} objects", root, objects.len(), kind);
    Ok(objects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    use crate::vim::ContainerView;

    #[derive(Default)]
    struct ViewLog {
        events: Mutex<Vec<&'static str>>,
    }

    struct StubView {
        objects: Vec<ObjectRef>,
        log: Arc<ViewLog>,
    }

    #[async_trait]
    impl ContainerView for StubView {
        fn view(&self) -> &[ObjectRef] {
            self.log.events.lock().unwrap().push("view");
            &self.objects
        }

        async fn destroy(self: Box<Self>) -> Result<()> {
            self.log.events.lock().unwrap().push("destroy");
            Ok(())
        }
    }

    struct StubViewManager {
        objects: Vec<ObjectRef>,
        log: Arc<ViewLog>,
    }

    #[async_trait]
    impl ViewManager for StubViewManager {
        async fn create_container_view(
            &self,
            _root: &str,
            _kind: &str,
            recursive: bool,
        ) -> Result<Box<dyn ContainerView>> {
            assert!(recursive);
            self.log.events.lock().unwrap().push("create");
            Ok(Box::new(StubView {
                objects: self.objects.clone(),
                log: self.log.clone(),
            }))
        }
    }

    #[tokio::test]
    async fn returns_the_view_list_and_destroys_the_view() {
        let log = Arc::new(ViewLog::default());
        let manager = StubViewManager {
            objects: vec![ObjectRef::vm("vm-1"), ObjectRef::vm("vm-2")],
            log: log.clone(),
        };

        let objects = get_vim_objects(&manager, "group-d1", "VirtualMachine")
            .await
            .unwrap();

        assert_eq!(objects, vec![ObjectRef::vm("vm-1"), ObjectRef::vm("vm-2")]);
        // Destroyed exactly once, after the list was read.
        assert_eq!(
            log.events.lock().unwrap().as_slice(),
            &["create", "view", "destroy"]
        );
    }

    #[tokio::test]
    async fn empty_scopes_yield_empty_lists() {
        let log = Arc::new(ViewLog::default());
        let manager = StubViewManager {
            objects: Vec::new(),
            log: log.clone(),
        };

        let objects = get_vim_objects(&manager, "group-d1", "Datastore")
            .await
            .unwrap();
        assert!(objects.is_empty());
        let events = log.events.lock().unwrap();
        assert_eq!(events.iter().filter(|e| *e == &"destroy").count(), 1);
    }
}
