use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::naming::NamingStrategy;
use crate::types::ActionDefinition;

/// Merge static data, caller data and model values, in that order of
/// increasing precedence. Keys are still logical attribute names.
pub fn merge(
    definition: &ActionDefinition,
    extra_data: Option<&Map<String, Value>>,
    entity: &dyn Entity,
) -> Map<String, Value> {
    let mut payload = definition.static_data.clone();

    if let Some(extra) = extra_data {
        for (key, value) in extra {
            payload.insert(key.clone(), value.clone());
        }
    }

    for key in &definition.model_keys {
        payload.insert(key.clone(), entity.get(key));
    }

    payload
}

/// Pass every key through the naming strategy exactly once.
///
/// When two logical keys translate to the same wire key, the later one in
/// iteration order wins.
pub fn translate(payload: Map<String, Value>, naming: &dyn NamingStrategy) -> Map<String, Value> {
    payload
        .into_iter()
        .map(|(key, value)| (naming.key_for_attribute(&key), value))
        .collect()
}
