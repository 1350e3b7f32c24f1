use std::collections::HashMap;

use crate::entity::Entity;
use crate::types::{ActionDefinition, ActionEntry};

// ─── ActionRegistry ───────────────────────────────────────────────────────

/// Action name → entry, owned by an [`Adapter`](crate::Adapter).
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    entries: HashMap<String, ActionEntry>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: impl Into<ActionEntry>) {
        self.entries.insert(name.into(), entry.into());
    }

    pub fn with(mut self, name: impl Into<String>, entry: impl Into<ActionEntry>) -> Self {
        self.insert(name, entry);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ActionEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

// ─── Resolution ───────────────────────────────────────────────────────────

/// Resolve `action_name` to a concrete definition.
///
/// Unknown names resolve to an empty definition; the missing URL is reported
/// later by [`Adapter::perform`](crate::Adapter::perform). A resolver
/// function is called exactly once. If it returns another resolver, that one
/// is not called and the result is the empty definition.
pub fn resolve(registry: &ActionRegistry, action_name: &str, entity: &dyn Entity) -> ActionDefinition {
    let Some(entry) = registry.get(action_name) else {
        return ActionDefinition::default();
    };

    let entry = match entry {
        ActionEntry::Resolver(f) => f(entity, action_name),
        other => other.clone(),
    };

    match entry {
        ActionEntry::Url(url) => ActionDefinition::new(url),
        ActionEntry::Definition(def) => def,
        ActionEntry::Resolver(_) => {
            tracing::debug!(action = %action_name, "resolver returned a resolver; not following");
            ActionDefinition::default()
        }
    }
}
