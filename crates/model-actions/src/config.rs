use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::naming::KeyCase;
use crate::resolver::ActionRegistry;
use crate::types::{ActionDefinition, ActionEntry};

const KNOWN_METHODS: &[&str] = &["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"];

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ActionConfig
// ---------------------------------------------------------------------------

/// The serializable shapes of an action entry. Resolver functions can only be
/// registered in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionConfig {
    Url(String),
    Definition(ActionDefinition),
}

impl From<ActionConfig> for ActionEntry {
    fn from(cfg: ActionConfig) -> Self {
        match cfg {
            ActionConfig::Url(url) => ActionEntry::Url(url),
            ActionConfig::Definition(def) => ActionEntry::Definition(def),
        }
    }
}

// ---------------------------------------------------------------------------
// AdapterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    /// Scheme and authority, e.g. `https://api.example.com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Path segment(s) placed between the host and every action URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default = "default_action_method")]
    pub default_action_method: String,
    #[serde(default)]
    pub key_case: KeyCase,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, ActionConfig>,
}

fn default_action_method() -> String {
    "POST".to_string()
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: None,
            namespace: None,
            default_action_method: default_action_method(),
            key_case: KeyCase::default(),
            actions: BTreeMap::new(),
        }
    }
}

impl AdapterConfig {
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }

    /// Write atomically through a tempfile in the same directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let dir = path.parent().unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(data.as_bytes())?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Base path every action URL is appended to.
    ///
    /// `host/namespace`, `/namespace` without a host, `host` alone, or `""`.
    pub fn url_prefix(&self) -> String {
        let host = self
            .host
            .as_deref()
            .map(|h| h.trim_end_matches('/'))
            .filter(|h| !h.is_empty());
        let namespace = self
            .namespace
            .as_deref()
            .map(|n| n.trim_matches('/'))
            .filter(|n| !n.is_empty());

        match (host, namespace) {
            (Some(h), Some(n)) => format!("{h}/{n}"),
            (Some(h), None) => h.to_string(),
            (None, Some(n)) => format!("/{n}"),
            (None, None) => String::new(),
        }
    }

    pub fn registry(&self) -> ActionRegistry {
        let mut registry = ActionRegistry::new();
        for (name, cfg) in &self.actions {
            registry.insert(name.clone(), ActionEntry::from(cfg.clone()));
        }
        registry
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if !is_known_method(&self.default_action_method) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "default_action_method '{}' is not an HTTP method",
                    self.default_action_method
                ),
            });
        }

        for (name, cfg) in &self.actions {
            match cfg {
                ActionConfig::Url(url) => {
                    if url.trim().is_empty() {
                        warnings.push(empty_url(name));
                    }
                }
                ActionConfig::Definition(def) => {
                    if def.resolved_url().is_none() {
                        warnings.push(empty_url(name));
                    }
                    if let Some(method) = &def.method {
                        if !method.is_empty() && !is_known_method(method) {
                            warnings.push(ConfigWarning {
                                level: WarnLevel::Warning,
                                message: format!(
                                    "action '{name}' uses unknown method '{method}'"
                                ),
                            });
                        }
                    }
                    if def.model_keys.iter().any(|k| k.trim().is_empty()) {
                        warnings.push(ConfigWarning {
                            level: WarnLevel::Warning,
                            message: format!("action '{name}' has an empty model key"),
                        });
                    }
                }
            }
        }

        warnings
    }
}

fn is_known_method(method: &str) -> bool {
    KNOWN_METHODS.contains(&method.to_ascii_uppercase().as_str())
}

fn empty_url(name: &str) -> ConfigWarning {
    ConfigWarning {
        level: WarnLevel::Error,
        message: format!("action '{name}' has no url"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
