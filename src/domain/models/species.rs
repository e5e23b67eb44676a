//! Species taxonomy models.

use serde::{Deserialize, Serialize};

/// A canonical species entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: i64,
    pub name: String,
}

impl Species {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// A read-only snapshot of the species table used for label resolution.
///
/// The sentinel entry is held apart from the matchable entries so that no
/// strategy can ever match it by name.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    unknown_id: i64,
    entries: Vec<TaxonomyEntry>,
}

/// A matchable taxonomy entry with its pre-lowercased name.
#[derive(Debug, Clone)]
pub struct TaxonomyEntry {
    pub id: i64,
    pub name: String,
    pub normalized: String,
}

impl Taxonomy {
    /// Build a snapshot from a species listing.
    ///
    /// Entries are kept in ascending id order, which is the tie-break order
    /// for every strategy that scans the taxonomy.
    pub fn new(species: Vec<Species>, unknown_id: i64) -> Self {
        let mut entries: Vec<TaxonomyEntry> = species
            .into_iter()
            .filter(|s| s.id != unknown_id)
            .filter(|s| !s.name.trim().is_empty())
            .map(|s| TaxonomyEntry {
                id: s.id,
                normalized: s.name.trim().to_lowercase(),
                name: s.name,
            })
            .collect();
        entries.sort_by_key(|e| e.id);
        Self { unknown_id, entries }
    }

    pub fn unknown_id(&self) -> i64 {
        self.unknown_id
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive exact lookup by name.
    pub fn find_exact(&self, name: &str) -> Option<&TaxonomyEntry> {
        let normalized = name.trim().to_lowercase();
        self.entries.iter().find(|e| e.normalized == normalized)
    }

    /// Look up a matchable entry by id. The sentinel is not among them.
    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.name.as_str())
    }
}
