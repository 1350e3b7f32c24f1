use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase};
use serde::{Deserialize, Serialize};

/// Maps logical attribute names to the keys used on the wire.
pub trait NamingStrategy: Send + Sync {
    fn key_for_attribute(&self, key: &str) -> String;
}

/// Built-in key naming strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCase {
    /// Keys are sent as written.
    #[default]
    Preserve,
    /// `authorName`
    Camel,
    /// `author_name`
    Snake,
    /// `author-name`
    Dasherize,
}

impl KeyCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyCase::Preserve => "preserve",
            KeyCase::Camel => "camel",
            KeyCase::Snake => "snake",
            KeyCase::Dasherize => "dasherize",
        }
    }
}

impl NamingStrategy for KeyCase {
    fn key_for_attribute(&self, key: &str) -> String {
        match self {
            KeyCase::Preserve => key.to_string(),
            KeyCase::Camel => key.to_lower_camel_case(),
            KeyCase::Snake => key.to_snake_case(),
            KeyCase::Dasherize => key.to_kebab_case(),
        }
    }
}

impl<F> NamingStrategy for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn key_for_attribute(&self, key: &str) -> String {
        self(key)
    }
}
