//! `model-actions` — named server-side actions on entities, with optimistic
//! attribute updates that roll back when the request fails.
//!
//! # Architecture
//!
//! ```text
//! ModelAction::invoke(store, entity, data)
//!     │
//!     ▼
//! Store            ← adapter + serializer for entity.model_name()
//!     │
//!     ▼
//! Adapter::perform ← resolve → merge payload → translate keys → URL check
//!     │              returns PendingAction (transport request, not yet sent)
//!     ▼
//! apply_optimistic ← set attributes now, keep dirty flag, attach rollback
//!     │
//!     ▼
//! PendingAction.await → transport result; reverts on Err, commits on Ok
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use model_actions::{Adapter, AdapterConfig, HttpTransport, ModelAction, Record, Store};
//! use serde_json::json;
//!
//! let config = AdapterConfig::from_yaml_str(
//!     "host: https://api.example.com\nnamespace: api\nactions:\n  like: likes/create\n",
//! )?;
//! let adapter = Adapter::from_config(&config, Arc::new(HttpTransport::new()));
//! let store = Store::new()
//!     .with_default_adapter(Arc::new(adapter))
//!     .with_default_serializer(Arc::new(config.key_case));
//!
//! let post = Arc::new(Record::from_json("post", json!({"id": 1, "liked": false})));
//! let like = ModelAction::new("like").with_attributes(json!({"liked": true}));
//! like.invoke(&store, post.clone(), None)?.await?;
//! ```

pub mod action;
pub mod adapter;
pub mod config;
pub mod entity;
pub mod error;
pub mod http;
pub mod naming;
pub mod optimistic;
pub mod payload;
pub mod pending;
pub mod resolver;
pub mod store;
pub mod transport;
pub mod types;

pub use action::ModelAction;
pub use adapter::Adapter;
pub use config::{ActionConfig, AdapterConfig, ConfigWarning, WarnLevel};
pub use entity::{Entity, Record};
pub use error::{ActionError, Result};
pub use http::HttpTransport;
pub use naming::{KeyCase, NamingStrategy};
pub use optimistic::apply_optimistic;
pub use pending::{ActionOutcome, PendingAction};
pub use resolver::{resolve, ActionRegistry};
pub use store::Store;
pub use transport::{ActionResponse, RequestOptions, Transport, TransportError};
pub use types::{
    ActionDefinition, ActionEntry, AttributeChange, ChangeSet, MutationState, NewAttributes,
};
