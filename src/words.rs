//! Word lists, grouped by category
//!
//! The simulation only ever asks for a category by name. A category that is
//! missing or empty is not an error: callers fall back to
//! [`PLACEHOLDER_WORD`](crate::consts::PLACEHOLDER_WORD).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::tuning::ConfigError;

/// Anything that can hand out candidate words per category
pub trait WordSource {
    /// Ordered candidates for `category`; empty when unknown
    fn words(&self, category: &str) -> &[String];
}

const SHORT: &[&str] = &[
    "cat", "car", "dog", "sun", "map", "key", "run", "box", "fox", "jet", "ice", "arc", "bit",
    "red", "sky", "zip", "hat", "net", "orb", "ray",
];

const MEDIUM: &[&str] = &[
    "rocket", "planet", "signal", "orbit", "laser", "shield", "vector", "comet", "radar",
    "cannon", "target", "launch", "sensor", "meteor", "beacon", "engine", "photon", "plasma",
];

const LONG: &[&str] = &[
    "satellite", "trajectory", "interceptor", "atmosphere", "countdown", "telemetry",
    "navigation", "propulsion", "battlefield", "deployment", "observatory", "stratosphere",
];

const CODE: &[&str] = &[
    "struct", "impl", "match", "borrow", "trait", "async", "await", "mut", "enum", "crate",
    "lifetime", "iterator", "closure", "vec", "option", "result",
];

/// Category name to word list
#[derive(Debug, Clone, Default)]
pub struct WordBank {
    categories: BTreeMap<String, Vec<String>>,
}

impl WordBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled word lists (`short`, `medium`, `long`, `code`)
    pub fn builtin() -> Self {
        let mut bank = Self::new();
        bank.insert("short", SHORT.iter().map(|w| w.to_string()).collect());
        bank.insert("medium", MEDIUM.iter().map(|w| w.to_string()).collect());
        bank.insert("long", LONG.iter().map(|w| w.to_string()).collect());
        bank.insert("code", CODE.iter().map(|w| w.to_string()).collect());
        bank
    }

    /// Replace a category. Blank entries are dropped.
    pub fn insert(&mut self, category: &str, words: Vec<String>) {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            log::warn!("Word category '{}' is empty", category);
        }
        self.categories.insert(category.to_string(), words);
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Parse a `{"category": ["word", ...]}` document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut bank = Self::new();
        for (category, words) in raw {
            bank.insert(&category, words);
        }
        Ok(bank)
    }

    /// Overlay lists from disk onto the built-in ones. Categories present in
    /// the file replace the built-in lists; on any failure the built-in lists
    /// are used unchanged.
    pub fn load_or_default(path: &Path) -> Self {
        let mut bank = Self::builtin();
        let loaded = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|json| Self::from_json(&json));
        match loaded {
            Ok(extra) => {
                log::info!(
                    "Loaded {} word categories from {}",
                    extra.categories.len(),
                    path.display()
                );
                bank.categories.extend(extra.categories);
            }
            Err(e) => log::warn!("Using built-in word lists: {}", e),
        }
        bank
    }
}

impl WordSource for WordBank {
    fn words(&self, category: &str) -> &[String] {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_categories() {
        let bank = WordBank::builtin();
        for category in ["short", "medium", "long", "code"] {
            assert!(!bank.words(category).is_empty(), "{category} empty");
        }
    }

    #[test]
    fn test_unknown_category_is_empty() {
        assert!(WordBank::builtin().words("klingon").is_empty());
    }

    #[test]
    fn test_from_json_drops_blank_words() {
        let bank = WordBank::from_json(r#"{"animals":["ant"," ","bee  "]}"#).unwrap();
        assert_eq!(bank.words("animals"), ["ant".to_string(), "bee".to_string()]);
    }

    #[test]
    fn test_load_or_default_overlays_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        fs::write(&path, r#"{"short":["yak"],"extra":["zebra"]}"#).unwrap();
        let bank = WordBank::load_or_default(&path);
        assert_eq!(bank.words("short"), ["yak".to_string()]);
        assert_eq!(bank.words("extra"), ["zebra".to_string()]);
        assert!(!bank.words("medium").is_empty());
    }

    #[test]
    fn test_load_or_default_bad_file_keeps_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.json");
        fs::write(&path, "[1, 2").unwrap();
        let bank = WordBank::load_or_default(&path);
        assert_eq!(bank.words("short").len(), SHORT.len());
    }
}
