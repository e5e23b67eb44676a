//! Static synonym table mapping colloquial species labels to canonical names.

use std::collections::HashMap;

/// Built-in synonym entries: lower-cased variant, canonical species name.
///
/// A target that does not exist in the taxonomy makes its entry inert.
const BUILTIN_SYNONYMS: &[(&str, &str)] = &[
    ("dark elf", "Elf"),
    ("drow", "Elf"),
    ("high elf", "Elf"),
    ("wood elf", "Elf"),
    ("elven", "Elf"),
    ("catgirl", "Nekomimi"),
    ("cat girl", "Nekomimi"),
    ("catboy", "Nekomimi"),
    ("cat boy", "Nekomimi"),
    ("neko", "Nekomimi"),
    ("foxgirl", "Kitsune"),
    ("fox girl", "Kitsune"),
    ("fox spirit", "Kitsune"),
    ("wolf girl", "Werewolf"),
    ("wolfgirl", "Werewolf"),
    ("lycanthrope", "Werewolf"),
    ("vampiress", "Vampire"),
    ("dhampir", "Vampire"),
    ("demoness", "Demon"),
    ("devil", "Demon"),
    ("seraph", "Angel"),
    ("celestial", "Angel"),
    ("mermaid", "Merfolk"),
    ("merman", "Merfolk"),
    ("dwarven", "Dwarf"),
    ("orcish", "Orc"),
    ("half-orc", "Orc"),
    ("robot", "Android"),
    ("cyborg", "Android"),
    ("dragon girl", "Dragonkin"),
    ("dragonborn", "Dragonkin"),
    ("mortal", "Human"),
    ("earthling", "Human"),
];

/// Lookup table from normalized free-text variants to canonical names.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    entries: HashMap<String, String>,
}

impl SynonymTable {
    /// The built-in table.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_SYNONYMS
                .iter()
                .map(|(variant, canonical)| ((*variant).to_string(), (*canonical).to_string()))
                .collect(),
        }
    }

    /// An empty table.
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Merge extra entries over the current ones. Keys are normalized the
    /// same way labels are.
    pub fn with_overrides(mut self, extra: &HashMap<String, String>) -> Self {
        for (variant, canonical) in extra {
            let key = normalize(variant);
            if key.is_empty() || canonical.trim().is_empty() {
                continue;
            }
            self.entries.insert(key, canonical.trim().to_string());
        }
        self
    }

    /// Canonical name for an already-normalized label.
    pub fn lookup(&self, normalized_label: &str) -> Option<&str> {
        self.entries.get(normalized_label).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Trim and lowercase a free-text label.
pub fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}
