use std::sync::{Mutex, MutexGuard};

use serde_json::{Map, Value};

// ─── Entity ───────────────────────────────────────────────────────────────

/// A persisted entity whose attributes an action reads and mutates.
///
/// Methods take `&self`: entities are shared as `Arc<dyn Entity>` between the
/// caller and any pending rollback, so implementations use interior
/// mutability.
///
/// The dirty flag means "has unsaved local changes". Action code snapshots it
/// before an optimistic mutation and restores it afterwards, so `set` is free
/// to mark the entity dirty.
pub trait Entity: Send + Sync {
    /// Name used to look up the entity's adapter and serializer.
    fn model_name(&self) -> &str;

    /// Current value of `key`, `Value::Null` when absent.
    fn get(&self, key: &str) -> Value;

    fn set(&self, key: &str, value: Value);

    fn is_dirty(&self) -> bool;

    fn set_dirty(&self, dirty: bool);
}

// ─── Record ───────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct RecordState {
    attributes: Map<String, Value>,
    dirty: bool,
}

/// In-memory [`Entity`] with change tracking: any `set` that changes a value
/// marks the record dirty until [`Record::mark_clean`].
#[derive(Debug)]
pub struct Record {
    model_name: String,
    state: Mutex<RecordState>,
}

impl Record {
    /// A clean record with the given attributes.
    pub fn new(model_name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Record {
            model_name: model_name.into(),
            state: Mutex::new(RecordState {
                attributes,
                dirty: false,
            }),
        }
    }

    /// Build a clean record from a JSON object. Non-object values yield an
    /// empty record.
    pub fn from_json(model_name: impl Into<String>, attributes: Value) -> Self {
        let attributes = match attributes {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(model_name, attributes)
    }

    /// Snapshot of all attributes.
    pub fn attributes(&self) -> Map<String, Value> {
        self.lock().attributes.clone()
    }

    /// Clear the dirty flag, as a successful save would.
    pub fn mark_clean(&self) {
        self.lock().dirty = false;
    }

    fn lock(&self) -> MutexGuard<'_, RecordState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Entity for Record {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn get(&self, key: &str) -> Value {
        self.lock().attributes.get(key).cloned().unwrap_or(Value::Null)
    }

    fn set(&self, key: &str, value: Value) {
        let mut state = self.lock();
        let changed = state.attributes.get(key) != Some(&value);
        state.attributes.insert(key.to_string(), value);
        if changed {
            state.dirty = true;
        }
    }

    fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    fn set_dirty(&self, dirty: bool) {
        self.lock().dirty = dirty;
    }
}
