use std::collections::{BTreeMap, HashMap};

/// Message table loaded from the `[strings]` section.
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: HashMap<String, String>,
}

impl StringTable {
    pub fn new(strings: HashMap<String, String>) -> Self {
        Self { strings }
    }

    pub fn get(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| format!("String not found: {}", key))
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string())
    }

    /// Look up `key` and substitute each `{PLACEHOLDER}` in `replacements`.
    pub fn render(&self, key: &str, replacements: &BTreeMap<&str, String>) -> String {
        let mut out = self.get(key);
        for (placeholder, value) in replacements {
            out = out.replace(placeholder, value);
        }
        out
    }
}
