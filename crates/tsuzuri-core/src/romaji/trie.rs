use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::warn;

use super::config::{parse_romaji_toml, read_romaji_file, RomajiConfigError};
use super::table::DEFAULT_TOML;
use crate::settings::Settings;

#[derive(Debug, PartialEq)]
pub enum TrieLookupResult {
    None,
    Prefix,
    Exact(String),
    ExactAndPrefix(String),
}

#[derive(Debug, Default)]
struct Node {
    children: HashMap<u8, Node>,
    kana: Option<String>,
}

#[derive(Debug)]
pub struct RomajiTrie {
    root: Node,
    custom: bool,
}

impl RomajiTrie {
    pub fn from_mappings(map: &BTreeMap<String, String>, custom: bool) -> Self {
        let mut trie = RomajiTrie {
            root: Node::default(),
            custom,
        };
        for (romaji, kana) in map {
            trie.insert(romaji, kana);
        }
        trie
    }

    /// Build a trie from a custom table in TOML form.
    pub fn from_toml(toml_str: &str) -> Result<Self, RomajiConfigError> {
        Ok(Self::from_mappings(&parse_romaji_toml(toml_str)?, true))
    }

    pub fn load(path: &Path) -> Result<Self, RomajiConfigError> {
        Ok(Self::from_mappings(&read_romaji_file(path)?, true))
    }

    /// The shared trie for the embedded default table.
    pub fn default_table() -> Arc<RomajiTrie> {
        static INSTANCE: OnceLock<Arc<RomajiTrie>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                let map = parse_romaji_toml(DEFAULT_TOML).expect("romaji TOML must be valid");
                Arc::new(RomajiTrie::from_mappings(&map, false))
            })
            .clone()
    }

    /// Pick the table the settings ask for. A custom table that cannot be
    /// loaded falls back to the default one.
    pub fn for_settings(settings: &Settings) -> Arc<RomajiTrie> {
        let path = match &settings.paths.custom_romaji_table {
            Some(path) if settings.preserve_ascii_symbol_keys() => path,
            _ => return Self::default_table(),
        };
        match Self::load(path) {
            Ok(trie) => Arc::new(trie),
            Err(e) => {
                warn!(%e, "custom romaji table unavailable, using default");
                Self::default_table()
            }
        }
    }

    /// True when built from a user-supplied table rather than the default.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub fn lookup(&self, romaji: &str) -> TrieLookupResult {
        let mut node = &self.root;
        for &b in romaji.as_bytes() {
            match node.children.get(&b) {
                Some(child) => node = child,
                None => return TrieLookupResult::None,
            }
        }
        let has_children = !node.children.is_empty();
        match (&node.kana, has_children) {
            (Some(kana), true) => TrieLookupResult::ExactAndPrefix(kana.clone()),
            (Some(kana), false) => TrieLookupResult::Exact(kana.clone()),
            (None, true) => TrieLookupResult::Prefix,
            (None, false) => TrieLookupResult::None,
        }
    }

    /// Whether `c` can start or continue a romaji sequence in this table.
    pub fn accepts(&self, c: char) -> bool {
        c.is_ascii() && self.root.children.contains_key(&(c as u8))
    }

    fn insert(&mut self, romaji: &str, kana: &str) {
        let mut node = &mut self.root;
        for &b in romaji.as_bytes() {
            node = node.children.entry(b).or_default();
        }
        node.kana = Some(kana.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vowel_exact() {
        let trie = RomajiTrie::default_table();
        assert_eq!(trie.lookup("a"), TrieLookupResult::Exact("あ".into()));
        assert!(!trie.is_custom());
    }

    #[test]
    fn consonant_prefix() {
        let trie = RomajiTrie::default_table();
        assert_eq!(trie.lookup("k"), TrieLookupResult::Prefix);
        assert_eq!(trie.lookup("sh"), TrieLookupResult::Prefix);
        assert_eq!(trie.lookup("q"), TrieLookupResult::Prefix);
    }

    #[test]
    fn youon() {
        let trie = RomajiTrie::default_table();
        assert_eq!(trie.lookup("sha"), TrieLookupResult::Exact("しゃ".into()));
        assert_eq!(trie.lookup("kyo"), TrieLookupResult::Exact("きょ".into()));
    }

    #[test]
    fn symbols_and_z_sequences() {
        let trie = RomajiTrie::default_table();
        assert_eq!(trie.lookup("-"), TrieLookupResult::Exact("ー".into()));
        assert_eq!(trie.lookup("."), TrieLookupResult::Exact("。".into()));
        assert_eq!(trie.lookup("zh"), TrieLookupResult::Exact("←".into()));
        assert_eq!(trie.lookup("z."), TrieLookupResult::Exact("…".into()));
    }

    #[test]
    fn nn_exact() {
        let trie = RomajiTrie::default_table();
        assert_eq!(trie.lookup("nn"), TrieLookupResult::Exact("ん".into()));
        assert!(matches!(
            trie.lookup("n"),
            TrieLookupResult::Prefix | TrieLookupResult::ExactAndPrefix(_)
        ));
    }

    #[test]
    fn unknown_is_none() {
        let trie = RomajiTrie::default_table();
        assert_eq!(trie.lookup("xyz"), TrieLookupResult::None);
        assert!(!trie.accepts('@'));
        assert!(trie.accepts('k'));
    }

    #[test]
    fn every_default_mapping_is_reachable() {
        let trie = RomajiTrie::default_table();
        let map = parse_romaji_toml(DEFAULT_TOML).unwrap();
        for (romaji, kana) in &map {
            match trie.lookup(romaji) {
                TrieLookupResult::Exact(ref k) | TrieLookupResult::ExactAndPrefix(ref k) => {
                    assert_eq!(k, kana, "mapping mismatch for romaji={romaji}");
                }
                other => panic!("expected Exact/ExactAndPrefix for {romaji}, got {other:?}"),
            }
        }
    }

    #[test]
    fn custom_table_from_toml() {
        let trie = RomajiTrie::from_toml("[mappings]\n\";\" = \"っ\"\nka = \"カ\"\n").unwrap();
        assert!(trie.is_custom());
        assert_eq!(trie.lookup(";"), TrieLookupResult::Exact("っ".into()));
        assert_eq!(trie.lookup("a"), TrieLookupResult::None);
    }

    #[test]
    fn settings_fall_back_when_table_missing() {
        let settings = crate::settings::parse_settings_toml(
            "[input]\ninput_style = \"custom\"\n[paths]\ncustom_romaji_table = \"/nonexistent/table.toml\"\n",
        )
        .unwrap();
        let trie = RomajiTrie::for_settings(&settings);
        assert!(!trie.is_custom());
    }

    #[test]
    fn settings_load_custom_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.toml");
        std::fs::write(&path, "[mappings]\nka = \"か\"\n").unwrap();
        let settings = crate::settings::parse_settings_toml(&format!(
            "[input]\ninput_style = \"custom\"\n[paths]\ncustom_romaji_table = {:?}\n",
            path.display().to_string()
        ))
        .unwrap();
        let trie = RomajiTrie::for_settings(&settings);
        assert!(trie.is_custom());
        assert_eq!(trie.lookup("ka"), TrieLookupResult::Exact("か".into()));
    }
}
