//! Key-value preference store backing [`ConfigAccessor`].

use crate::providers::ConfigAccessor;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single stored preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Bool(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        PreferenceValue::Int(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::Text(value.to_string())
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        PreferenceValue::Text(value)
    }
}

impl From<Vec<String>> for PreferenceValue {
    fn from(value: Vec<String>) -> Self {
        PreferenceValue::List(value)
    }
}

/// User preferences keyed by the strings in [`crate::keys`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    values: BTreeMap<String, PreferenceValue>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PreferenceValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PreferenceValue>) -> Self {
        self.set(key, value);
        self
    }
}

impl ConfigAccessor for Preferences {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(PreferenceValue::Bool(b)) => *b,
            Some(PreferenceValue::Text(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(PreferenceValue::Text(s)) => s.clone(),
            Some(PreferenceValue::Int(i)) => i.to_string(),
            Some(PreferenceValue::Bool(b)) => b.to_string(),
            _ => default.to_string(),
        }
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(PreferenceValue::Int(i)) => *i,
            Some(PreferenceValue::Text(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    fn get_string_set(&self, key: &str, default: &[&str]) -> BTreeSet<String> {
        match self.values.get(key) {
            Some(PreferenceValue::List(items)) => items.iter().cloned().collect(),
            Some(PreferenceValue::Text(s)) => s.split(',').map(str::to_string).collect(),
            _ => default.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_use_defaults() {
        let prefs = Preferences::new();
        assert!(prefs.get_bool("cache_downloads", true));
        assert_eq!(prefs.get_string("thumbnail_format", "jpg"), "jpg");
        assert_eq!(prefs.get_int("concurrent_fragments", 1), 1);
        assert_eq!(prefs.get_string_set("filters", &["sponsor"]).len(), 1);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let prefs = Preferences::new()
            .with("concurrent_fragments", "lots")
            .with("aria2", 3i64)
            .with("retries", vec!["a".to_string()]);

        assert_eq!(prefs.get_int("concurrent_fragments", 1), 1);
        assert!(!prefs.get_bool("aria2", false));
        assert_eq!(prefs.get_string("retries", ""), "");
    }

    #[test]
    fn test_lenient_scalar_conversions() {
        let prefs = Preferences::new()
            .with("concurrent_fragments", "8")
            .with("retries", 10i64)
            .with("mtime", "true")
            .with("filters", "sponsor,intro");

        assert_eq!(prefs.get_int("concurrent_fragments", 1), 8);
        assert_eq!(prefs.get_string("retries", ""), "10");
        assert!(prefs.get_bool("mtime", false));
        assert_eq!(
            prefs.get_string_set("filters", &[]),
            ["intro", "sponsor"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn test_deserializes_from_toml_table() {
        let prefs: Preferences = toml::from_str(
            r#"
            cache_downloads = false
            concurrent_fragments = 4
            proxy = "socks5://127.0.0.1:9050"
            sponsorblock_filters = ["sponsor", "intro"]
            "#,
        )
        .unwrap();

        let expected = Preferences::new()
            .with("cache_downloads", false)
            .with("concurrent_fragments", 4i64)
            .with("proxy", "socks5://127.0.0.1:9050")
            .with("sponsorblock_filters", vec!["sponsor".to_string(), "intro".to_string()]);
        assert_eq!(prefs, expected);
        assert!(!prefs.get_bool("cache_downloads", true));
        assert_eq!(prefs.get_int("concurrent_fragments", 1), 4);
        assert_eq!(prefs.get_string("proxy", ""), "socks5://127.0.0.1:9050");
        assert!(prefs.get_string_set("sponsorblock_filters", &[]).contains("intro"));
    }
}
