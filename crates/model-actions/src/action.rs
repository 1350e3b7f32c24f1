use std::sync::Arc;

use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::error::Result;
use crate::optimistic::apply_optimistic;
use crate::pending::PendingAction;
use crate::store::Store;
use crate::types::NewAttributes;

/// A named action bound to a model, with optional optimistic attributes.
///
/// ```rust,ignore
/// let like = ModelAction::new("like").with_attributes(json!({"liked": true}));
///
/// // Sets `liked` now; puts it back if the request fails.
/// let response = like.invoke(&store, post.clone(), None)?.await?;
/// ```
#[derive(Debug, Clone)]
pub struct ModelAction {
    name: String,
    attributes: Option<NewAttributes>,
}

impl ModelAction {
    pub fn new(name: impl Into<String>) -> Self {
        ModelAction {
            name: name.into(),
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, attributes: impl Into<NewAttributes>) -> Self {
        self.attributes = Some(attributes.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Perform the action on `entity`, then apply the optimistic attributes.
    ///
    /// The request is validated (name, adapter, serializer, URL) before any
    /// attribute is touched, so an `Err` here never leaves the entity
    /// modified.
    pub fn invoke(
        &self,
        store: &Store,
        entity: Arc<dyn Entity>,
        data: Option<&Map<String, Value>>,
    ) -> Result<PendingAction> {
        let mut pending = store.perform(entity.as_ref(), &self.name, data)?;
        apply_optimistic(entity, self.attributes.as_ref(), &mut pending, &self.name)?;
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use crate::entity::Record;
    use crate::naming::KeyCase;
    use crate::resolver::ActionRegistry;
    use crate::transport::{ActionResponse, RequestOptions, Transport, TransportError};
    use crate::types::MutationState;
    use crate::ActionError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        ok: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for Fixed {
        async fn request(
            &self,
            _url: &str,
            _method: &str,
            _options: RequestOptions,
        ) -> std::result::Result<ActionResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.ok {
                Ok(ActionResponse {
                    status: 200,
                    body: json!({"ok": true}),
                })
            } else {
                Err(TransportError::status(500, None))
            }
        }
    }

    fn store(ok: bool) -> (Store, Arc<Fixed>) {
        let transport = Arc::new(Fixed {
            ok,
            calls: AtomicUsize::new(0),
        });
        let adapter = Adapter::new(transport.clone())
            .with_url_prefix("/api")
            .with_registry(ActionRegistry::new().with("like", "likes/create"));
        let store = Store::new()
            .with_default_adapter(Arc::new(adapter))
            .with_default_serializer(Arc::new(KeyCase::Preserve));
        (store, transport)
    }

    #[tokio::test]
    async fn without_attributes_returns_plain_pending() {
        let (store, _) = store(true);
        let post = Arc::new(Record::from_json("post", json!({"liked": false})));
        let pending = ModelAction::new("like").invoke(&store, post.clone(), None).unwrap();
        assert_eq!(pending.state(), MutationState::Clean);
        let response = pending.await.unwrap();
        assert_eq!(response.body, json!({"ok": true}));
        assert_eq!(post.get("liked"), json!(false));
    }

    #[tokio::test]
    async fn failed_action_reverts_attributes() {
        let (store, transport) = store(false);
        let post = Arc::new(Record::from_json("post", json!({"liked": false})));
        let like = ModelAction::new("like").with_attributes(json!({"liked": true}));

        let pending = like.invoke(&store, post.clone(), None).unwrap();
        assert_eq!(post.get("liked"), json!(true));
        assert!(!post.is_dirty());

        let err = pending.await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert_eq!(post.get("liked"), json!(false));
        assert!(!post.is_dirty());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_action_leaves_entity_untouched() {
        let (store, transport) = store(true);
        let post = Arc::new(Record::from_json("post", json!({"liked": false})));
        let flag = ModelAction::new("flag").with_attributes(json!({"liked": true}));

        let err = flag.invoke(&store, post.clone(), None).unwrap_err();
        assert!(matches!(err, ActionError::MissingUrl { .. }));
        assert_eq!(post.get("liked"), json!(false));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}
