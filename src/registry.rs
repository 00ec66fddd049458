use crate::error::ConfigError;
use crate::types::{Destination, KeyMapping, WebhookDefinition};
use std::collections::HashMap;
use subtle::ConstantTimeEq;

/// Result of looking up a name/key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    Found(&'a Destination),
    NotFound,
}

/// Read-only map of webhook name to its authorised key mappings.
///
/// Built once at startup and shared behind an `Arc`; never mutated afterwards.
#[derive(Debug, Default)]
pub struct Registry {
    webhooks: HashMap<String, Vec<KeyMapping>>,
}

impl Registry {
    pub fn from_definitions(definitions: Vec<WebhookDefinition>) -> Result<Self, ConfigError> {
        let mut webhooks = HashMap::with_capacity(definitions.len());
        for def in definitions {
            if def.name.is_empty() {
                return Err(ConfigError::Invalid("webhook name must not be empty".into()));
            }
            if webhooks.contains_key(&def.name) {
                return Err(ConfigError::DuplicateWebhook(def.name));
            }
            webhooks.insert(def.name, def.mappings);
        }
        Ok(Self { webhooks })
    }

    /// Find the destination for `name`/`key`.
    ///
    /// An unknown name and a wrong key both yield `NotFound`. Within a
    /// webhook, the first mapping whose key matches wins.
    pub fn resolve(&self, name: &str, key: &str) -> Resolution<'_> {
        let Some(mappings) = self.webhooks.get(name) else {
            return Resolution::NotFound;
        };

        mappings
            .iter()
            .find(|m| bool::from(m.key.as_bytes().ct_eq(key.as_bytes())))
            .map_or(Resolution::NotFound, |m| Resolution::Found(&m.telegram))
    }

    pub fn len(&self) -> usize {
        self.webhooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.webhooks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.webhooks.keys().map(String::as_str)
    }
}
