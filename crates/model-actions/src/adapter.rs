use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::AdapterConfig;
use crate::entity::Entity;
use crate::error::{ActionError, Result};
use crate::naming::NamingStrategy;
use crate::payload;
use crate::pending::PendingAction;
use crate::resolver::{self, ActionRegistry};
use crate::transport::{RequestOptions, Transport};

// ─── Adapter ──────────────────────────────────────────────────────────────

/// Owns an action registry and a transport, and turns action names into
/// requests.
pub struct Adapter {
    url_prefix: String,
    default_action_method: String,
    registry: ActionRegistry,
    transport: Arc<dyn Transport>,
}

impl Adapter {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Adapter {
            url_prefix: String::new(),
            default_action_method: "POST".to_string(),
            registry: ActionRegistry::new(),
            transport,
        }
    }

    /// Build from config. Resolver entries can be added afterwards with
    /// [`Adapter::registry_mut`].
    pub fn from_config(config: &AdapterConfig, transport: Arc<dyn Transport>) -> Self {
        Adapter {
            url_prefix: config.url_prefix(),
            default_action_method: config.default_action_method.clone(),
            registry: config.registry(),
            transport,
        }
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn with_default_action_method(mut self, method: impl Into<String>) -> Self {
        self.default_action_method = method.into();
        self
    }

    pub fn with_registry(mut self, registry: ActionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    pub fn default_action_method(&self) -> &str {
        &self.default_action_method
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ActionRegistry {
        &mut self.registry
    }

    /// Resolve `action_name` for `entity`, build the payload, and return the
    /// pending request.
    ///
    /// Payload precedence, lowest to highest: the definition's static data,
    /// `extra_data`, then the entity's values for the definition's model keys.
    /// Every key passes through `serializer` once.
    ///
    /// Fails before any request is created when the name is empty or the
    /// definition has no URL. Awaiting the returned [`PendingAction`] yields
    /// the transport's result unchanged.
    pub fn perform(
        &self,
        entity: &dyn Entity,
        action_name: &str,
        serializer: &dyn NamingStrategy,
        extra_data: Option<&Map<String, Value>>,
    ) -> Result<PendingAction> {
        if action_name.is_empty() {
            return Err(ActionError::MissingActionName);
        }

        let definition = resolver::resolve(&self.registry, action_name, entity);
        let merged = payload::merge(&definition, extra_data, entity);
        let data = payload::translate(merged, serializer);

        let url = definition
            .resolved_url()
            .ok_or_else(|| ActionError::MissingUrl {
                action: action_name.to_string(),
            })?;

        let endpoint = join_url(&self.url_prefix, url);
        let method = definition
            .method
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| self.default_action_method.clone());

        tracing::debug!(
            action = %action_name,
            model = %entity.model_name(),
            %endpoint,
            %method,
            keys = data.len(),
            "performing action"
        );

        let transport = Arc::clone(&self.transport);
        let request = Box::pin(async move {
            transport
                .request(&endpoint, &method, RequestOptions { data })
                .await
        });

        Ok(PendingAction::new(action_name, request))
    }
}

impl std::fmt::Debug for Adapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Adapter")
            .field("url_prefix", &self.url_prefix)
            .field("default_action_method", &self.default_action_method)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// `prefix + "/" + url` with exactly one `/` at the boundary.
pub fn join_url(prefix: &str, url: &str) -> String {
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        url.trim_start_matches('/')
    )
}

// ─── Tests ────────────────────────────────────────────────────────────────
