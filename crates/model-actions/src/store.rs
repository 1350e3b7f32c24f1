use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::adapter::Adapter;
use crate::entity::Entity;
use crate::error::{ActionError, Result};
use crate::naming::NamingStrategy;
use crate::pending::PendingAction;

/// Finds the adapter and serializer (naming strategy) for an entity by its
/// model name, falling back to application-wide defaults.
#[derive(Default)]
pub struct Store {
    adapters: HashMap<String, Arc<Adapter>>,
    serializers: HashMap<String, Arc<dyn NamingStrategy>>,
    default_adapter: Option<Arc<Adapter>>,
    default_serializer: Option<Arc<dyn NamingStrategy>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_adapter(mut self, adapter: Arc<Adapter>) -> Self {
        self.default_adapter = Some(adapter);
        self
    }

    pub fn with_default_serializer(mut self, serializer: Arc<dyn NamingStrategy>) -> Self {
        self.default_serializer = Some(serializer);
        self
    }

    pub fn register_adapter(&mut self, model_name: impl Into<String>, adapter: Arc<Adapter>) {
        self.adapters.insert(model_name.into(), adapter);
    }

    pub fn register_serializer(
        &mut self,
        model_name: impl Into<String>,
        serializer: Arc<dyn NamingStrategy>,
    ) {
        self.serializers.insert(model_name.into(), serializer);
    }

    pub fn adapter_for(&self, model_name: &str) -> Result<Arc<Adapter>> {
        self.adapters
            .get(model_name)
            .or(self.default_adapter.as_ref())
            .cloned()
            .ok_or_else(|| ActionError::MissingAdapter(model_name.to_string()))
    }

    pub fn serializer_for(&self, model_name: &str) -> Result<Arc<dyn NamingStrategy>> {
        self.serializers
            .get(model_name)
            .or(self.default_serializer.as_ref())
            .cloned()
            .ok_or_else(|| ActionError::MissingSerializer(model_name.to_string()))
    }

    /// Perform `action_name` on `entity` through the entity's own adapter and
    /// serializer.
    pub fn perform(
        &self,
        entity: &dyn Entity,
        action_name: &str,
        extra_data: Option<&Map<String, Value>>,
    ) -> Result<PendingAction> {
        if action_name.is_empty() {
            return Err(ActionError::MissingActionName);
        }
        let model_name = entity.model_name();
        let adapter = self.adapter_for(model_name)?;
        let serializer = self.serializer_for(model_name)?;
        adapter.perform(entity, action_name, serializer.as_ref(), extra_data)
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut adapters: Vec<_> = self.adapters.keys().collect();
        adapters.sort();
        let mut serializers: Vec<_> = self.serializers.keys().collect();
        serializers.sort();
        f.debug_struct("Store")
            .field("adapters", &adapters)
            .field("serializers", &serializers)
            .field("default_adapter", &self.default_adapter.is_some())
            .field("default_serializer", &self.default_serializer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Record;
    use crate::naming::KeyCase;
    use crate::resolver::ActionRegistry;
    use crate::transport::{ActionResponse, RequestOptions, Transport, TransportError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        urls: Mutex<Vec<(String, RequestOptions)>>,
    }

    #[async_trait]
    impl Transport for Capture {
        async fn request(
            &self,
            url: &str,
            _method: &str,
            options: RequestOptions,
        ) -> std::result::Result<ActionResponse, TransportError> {
            self.urls.lock().unwrap().push((url.to_string(), options));
            Ok(ActionResponse {
                status: 200,
                body: Value::Null,
            })
        }
    }

    fn adapter(prefix: &str, transport: Arc<Capture>) -> Arc<Adapter> {
        Arc::new(
            Adapter::new(transport)
                .with_url_prefix(prefix)
                .with_registry(ActionRegistry::new().with("like", "likes")),
        )
    }

    #[tokio::test]
    async fn per_model_adapter_wins_over_default() {
        let transport = Arc::new(Capture::default());
        let mut store = Store::new()
            .with_default_adapter(adapter("/api", transport.clone()))
            .with_default_serializer(Arc::new(KeyCase::Preserve));
        store.register_adapter("comment", adapter("/comments-api", transport.clone()));

        let post = Record::from_json("post", json!({}));
        let comment = Record::from_json("comment", json!({}));
        store.perform(&post, "like", None).unwrap().await.unwrap();
        store.perform(&comment, "like", None).unwrap().await.unwrap();

        let urls = transport.urls.lock().unwrap();
        assert_eq!(urls[0].0, "/api/likes");
        assert_eq!(urls[1].0, "/comments-api/likes");
    }

    #[tokio::test]
    async fn per_model_serializer_translates_keys() {
        let transport = Arc::new(Capture::default());
        let mut store = Store::new()
            .with_default_adapter(adapter("/api", transport.clone()))
            .with_default_serializer(Arc::new(KeyCase::Preserve));
        store.register_serializer("post", Arc::new(KeyCase::Dasherize));

        let post = Record::from_json("post", json!({}));
        let extra = json!({"likeSource": "feed"});
        store
            .perform(&post, "like", extra.as_object())
            .unwrap()
            .await
            .unwrap();
        let urls = transport.urls.lock().unwrap();
        assert_eq!(urls[0].1.data["like-source"], json!("feed"));
    }

    #[test]
    fn missing_adapter_is_reported() {
        let store = Store::new().with_default_serializer(Arc::new(KeyCase::Preserve));
        let post = Record::from_json("post", json!({}));
        let err = store.perform(&post, "like", None).unwrap_err();
        assert!(matches!(err, ActionError::MissingAdapter(ref m) if m == "post"));
    }

    #[test]
    fn missing_serializer_is_reported() {
        let transport = Arc::new(Capture::default());
        let store = Store::new().with_default_adapter(adapter("/api", transport));
        let post = Record::from_json("post", json!({}));
        let err = store.perform(&post, "like", None).unwrap_err();
        assert!(matches!(err, ActionError::MissingSerializer(ref m) if m == "post"));
    }

    #[test]
    fn empty_action_name_checked_first() {
        let store = Store::new();
        let post = Record::from_json("post", json!({}));
        let err = store.perform(&post, "", None).unwrap_err();
        assert!(matches!(err, ActionError::MissingActionName));
    }
}
