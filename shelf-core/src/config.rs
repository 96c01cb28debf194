//! # Configuration
//!
//! A minimal string key/value store mirroring Feathers' `app.set()` / `app.get()`.
//! Services read typed values from an immutable [`ShelfConfigSnapshot`] taken at
//! startup.
//!
//! ```rust
//! use shelf_core::ShelfConfig;
//! let mut config = ShelfConfig::new();
//! config.set("assets.document_namespace", "epub_files");
//! assert_eq!(config.get("assets.document_namespace"), Some("epub_files"));
//! ```
//!
//! Environment overrides use a prefix and `__` as the path separator:
//! `SHELF__ASSETS__SERIALIZE_PER_ID=false` becomes `assets.serialize_per_id`.

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct ShelfConfig {
    values: HashMap<String, String>,
}

impl ShelfConfig {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Set a key only when it has no value yet.
    pub fn set_default<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Copy `PREFIX__A__B=value` style variables in as `a.b`.
    pub fn load_env_prefixed(&mut self, prefix: &str) {
        self.load_pairs_prefixed(prefix, std::env::vars());
    }

    pub(crate) fn load_pairs_prefixed<I>(&mut self, prefix: &str, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let prefix = format!("{prefix}__");
        for (key, value) in pairs {
            if let Some(stripped) = key.strip_prefix(&prefix) {
                let normalized = stripped.to_lowercase().replace("__", ".");
                self.set(normalized, value);
            }
        }
    }

    pub fn snapshot(&self) -> ShelfConfigSnapshot {
        ShelfConfigSnapshot::new(self.values.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShelfConfigSnapshot {
    map: HashMap<String, String>,
}

impl ShelfConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.trim().parse::<usize>().ok())
    }

    pub fn get_u16(&self, key: &str) -> Option<u16> {
        self.get(key).and_then(|v| v.trim().parse::<u16>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_pairs_become_dotted_keys() {
        let mut config = ShelfConfig::new();
        config.load_pairs_prefixed(
            "SHELF",
            vec![
                ("SHELF__ASSETS__SERIALIZE_PER_ID".to_string(), "off".to_string()),
                ("OTHER__KEY".to_string(), "x".to_string()),
            ],
        );
        assert!(config.has("assets.serialize_per_id"));
        assert!(!config.has("other.key"));
        assert_eq!(config.snapshot().get_bool("assets.serialize_per_id"), Some(false));
    }

    #[test]
    fn set_default_does_not_override() {
        let mut config = ShelfConfig::new();
        config.set("http.port", "8080");
        config.set_default("http.port", "5003");
        config.set_default("http.host", "0.0.0.0");

        let snap = config.snapshot();
        assert_eq!(snap.get_u16("http.port"), Some(8080));
        assert_eq!(snap.get_string("http.host").as_deref(), Some("0.0.0.0"));
        assert_eq!(snap.get_usize("missing"), None);
    }
}
