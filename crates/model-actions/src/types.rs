use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::Entity;

// ─── ActionDefinition ─────────────────────────────────────────────────────

/// How to perform one action: where to send it, with which method, and what
/// goes in the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionDefinition {
    /// Path relative to the adapter's URL prefix.
    #[serde(default)]
    pub url: Option<String>,
    /// HTTP method; `None` means the adapter's default action method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Literal payload fields.
    #[serde(
        default,
        rename = "data",
        alias = "static_data",
        skip_serializing_if = "Map::is_empty"
    )]
    pub static_data: Map<String, Value>,
    /// Entity attributes whose live values are merged into the payload.
    #[serde(
        default,
        alias = "modelKeys",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub model_keys: Vec<String>,
}

impl ActionDefinition {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.static_data.insert(key.into(), value);
        self
    }

    pub fn with_model_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.model_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// The URL, if present and non-empty.
    pub fn resolved_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

// ─── ActionEntry ──────────────────────────────────────────────────────────

/// Computes an action entry from the entity at resolution time.
pub type ResolverFn = Arc<dyn Fn(&dyn Entity, &str) -> ActionEntry + Send + Sync>;

/// One value in an [`ActionRegistry`](crate::ActionRegistry).
#[derive(Clone)]
pub enum ActionEntry {
    /// Shorthand for a definition with only a URL.
    Url(String),
    Definition(ActionDefinition),
    /// Called once per resolution with `(entity, action_name)`.
    Resolver(ResolverFn),
}

impl ActionEntry {
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&dyn Entity, &str) -> ActionEntry + Send + Sync + 'static,
    {
        ActionEntry::Resolver(Arc::new(f))
    }
}

impl fmt::Debug for ActionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionEntry::Url(url) => f.debug_tuple("Url").field(url).finish(),
            ActionEntry::Definition(def) => f.debug_tuple("Definition").field(def).finish(),
            ActionEntry::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<&str> for ActionEntry {
    fn from(url: &str) -> Self {
        ActionEntry::Url(url.to_string())
    }
}

impl From<String> for ActionEntry {
    fn from(url: String) -> Self {
        ActionEntry::Url(url)
    }
}

impl From<ActionDefinition> for ActionEntry {
    fn from(def: ActionDefinition) -> Self {
        ActionEntry::Definition(def)
    }
}

// ─── NewAttributes ────────────────────────────────────────────────────────

/// Computes optimistic attributes from the action name.
pub type AttributesFn = Arc<dyn Fn(&str) -> Value + Send + Sync>;

/// Attributes to set on an entity while an action is in flight.
#[derive(Clone)]
pub enum NewAttributes {
    /// Must be `Null` (no-op) or an object.
    Value(Value),
    Computed(AttributesFn),
}

impl NewAttributes {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        NewAttributes::Computed(Arc::new(f))
    }

    pub(crate) fn evaluate(&self, action_name: &str) -> Value {
        match self {
            NewAttributes::Value(v) => v.clone(),
            NewAttributes::Computed(f) => f(action_name),
        }
    }
}

impl fmt::Debug for NewAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewAttributes::Value(v) => f.debug_tuple("Value").field(v).finish(),
            NewAttributes::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<Value> for NewAttributes {
    fn from(value: Value) -> Self {
        NewAttributes::Value(value)
    }
}

impl From<Map<String, Value>> for NewAttributes {
    fn from(map: Map<String, Value>) -> Self {
        NewAttributes::Value(Value::Object(map))
    }
}

// ─── ChangeSet ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeChange {
    pub key: String,
    pub old_value: Value,
    pub new_value: Value,
}

/// Attribute changes made by one optimistic application, in the order applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: Vec<AttributeChange>,
}

impl ChangeSet {
    pub fn record(&mut self, key: impl Into<String>, old_value: Value, new_value: Value) {
        self.changes.push(AttributeChange {
            key: key.into(),
            old_value,
            new_value,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeChange> {
        self.changes.iter()
    }

    /// Write every old value back, in recorded order.
    pub fn revert(&self, entity: &dyn Entity) {
        for change in &self.changes {
            entity.set(&change.key, change.old_value.clone());
        }
    }
}

// ─── MutationState ────────────────────────────────────────────────────────

/// Lifecycle of the optimistic attribute set attached to one pending action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    /// Nothing changed on the entity.
    Clean,
    /// Values applied, waiting for the transport to settle.
    Mutated,
    Committed,
    Reverted,
}

impl MutationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationState::Clean => "clean",
            MutationState::Mutated => "mutated",
            MutationState::Committed => "committed",
            MutationState::Reverted => "reverted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MutationState::Committed | MutationState::Reverted)
    }
}

impl fmt::Display for MutationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
