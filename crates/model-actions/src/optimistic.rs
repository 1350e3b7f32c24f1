use std::sync::Arc;

use serde_json::Value;

use crate::entity::Entity;
use crate::error::{ActionError, Result};
use crate::pending::{PendingAction, Rollback};
use crate::types::{ChangeSet, NewAttributes};

/// Set `new_attributes` on `entity` now, and revert them if `pending` fails.
///
/// `None`, or attributes that evaluate to `null`, do nothing. Anything other
/// than an object is rejected before the entity is touched. Only keys whose
/// value actually changes are recorded; the entity's dirty flag is the same
/// after this call as before it.
///
/// At most one change set can be attached to a pending action.
pub fn apply_optimistic(
    entity: Arc<dyn Entity>,
    new_attributes: Option<&NewAttributes>,
    pending: &mut PendingAction,
    action_name: &str,
) -> Result<()> {
    let Some(new_attributes) = new_attributes else {
        return Ok(());
    };

    let attributes = match new_attributes.evaluate(action_name) {
        Value::Null => return Ok(()),
        Value::Object(map) => map,
        other => {
            return Err(ActionError::InvalidAttributes {
                action: action_name.to_string(),
                found: json_kind(&other),
            })
        }
    };

    if pending.has_rollback() {
        return Err(ActionError::ContinuationAttached {
            action: action_name.to_string(),
        });
    }

    let was_dirty = entity.is_dirty();
    let mut changes = ChangeSet::default();

    for (key, new_value) in attributes {
        let old_value = entity.get(&key);
        if old_value != new_value {
            entity.set(&key, new_value.clone());
            changes.record(key, old_value, new_value);
        }
    }

    entity.set_dirty(was_dirty);

    tracing::debug!(
        action = %action_name,
        model = %entity.model_name(),
        changes = changes.len(),
        "applied optimistic attributes"
    );

    if !changes.is_empty() {
        pending.attach_rollback(Rollback::new(entity, changes));
    }
    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
