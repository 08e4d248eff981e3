//! Session-scoped configuration values pushed by the device.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
/// Typed key/value store for device-provided settings (the envelope's `js` section).
///
/// Values only change through [`SessionConfig::set`]. The store lives as long as the view
/// runtime that owns it; clones share the same map.
pub struct SessionConfig {
    inner: Rc<RefCell<BTreeMap<String, Value>>>,
}

impl SessionConfig {
    /// Installs or replaces a value.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.inner.borrow_mut().insert(key.into(), value);
    }

    /// Reads a raw JSON value.
    pub fn get_json(&self, key: &str) -> Option<Value> {
        self.inner.borrow().get(key).cloned()
    }

    /// Reads and deserializes a typed value. Shape mismatches read as `None`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_json(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Installed keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().keys().cloned().collect()
    }

    /// Number of installed values.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns `true` when nothing has been installed.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn set_then_read_typed_and_raw() {
        let config = SessionConfig::default();
        config.set("gpio", json!([{"port": 4, "name": "D2"}]));
        config.set("maxValves", json!(8));

        assert_eq!(config.get::<u32>("maxValves"), Some(8));
        assert_eq!(config.get::<String>("maxValves"), None);
        assert_eq!(config.get_json("gpio"), Some(json!([{"port": 4, "name": "D2"}])));
        assert_eq!(config.keys(), vec!["gpio".to_string(), "maxValves".to_string()]);
    }

    #[test]
    fn clones_share_values() {
        let config = SessionConfig::default();
        let view = config.clone();
        config.set("a", json!(true));
        assert_eq!(view.get::<bool>("a"), Some(true));
        assert_eq!(view.len(), 1);
    }
}
