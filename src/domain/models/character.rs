//! Character domain model.
//!
//! A character is an auto-generated catalog entry owned by a single
//! generating principal. Remediation may rewrite its attribute fields but
//! never its identity or ownership.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A character record as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Stable identifier, never changed by remediation.
    pub id: Uuid,
    /// Principal that created the record.
    pub owner_id: Uuid,
    /// Display name; holds the placeholder sentinel until resolved.
    pub primary_name: String,
    pub secondary_name: Option<String>,
    /// Foreign key into the species taxonomy.
    pub species_id: Option<i64>,
    pub appearance: Option<String>,
    pub personality: Option<String>,
    pub backstory: Option<String>,
    pub attire: Option<String>,
    /// Denormalized tag strings.
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Character {
    /// Create a new character owned by `owner_id` with only a primary name.
    pub fn new(owner_id: Uuid, primary_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            primary_name: primary_name.into(),
            secondary_name: None,
            species_id: None,
            appearance: None,
            personality: None,
            backstory: None,
            attire: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_species(mut self, species_id: i64) -> Self {
        self.species_id = Some(species_id);
        self
    }

    pub fn with_appearance(mut self, appearance: impl Into<String>) -> Self {
        self.appearance = Some(appearance.into());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = created_at;
        self
    }

    /// True when the primary name still equals the placeholder sentinel.
    pub fn has_placeholder_name(&self, placeholder: &str) -> bool {
        let name = self.primary_name.trim();
        name.is_empty() || name.eq_ignore_ascii_case(placeholder)
    }

    /// True when the record matches the attribute defect predicate.
    pub fn is_attribute_defective(&self, placeholder: &str) -> bool {
        self.species_id.is_none() || self.has_placeholder_name(placeholder)
    }

    /// Attributes already known about the character, in the shape sent to
    /// the generation collaborator.
    pub fn known_attributes(&self, placeholder: &str) -> PartialCharacter {
        PartialCharacter {
            name: (!self.has_placeholder_name(placeholder)).then(|| self.primary_name.clone()),
            secondary_name: self.secondary_name.clone(),
            appearance: self.appearance.clone(),
            personality: self.personality.clone(),
            backstory: self.backstory.clone(),
            attire: self.attire.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// The subset of character attributes that generation can fill in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCharacter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attire: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl PartialCharacter {
    /// Render the known attributes as a free-text seed description.
    ///
    /// Returns `None` when nothing is known.
    pub fn seed_description(&self, species_name: Option<&str>) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(name) = &self.name {
            parts.push(format!("Name: {name}"));
        }
        if let Some(secondary) = &self.secondary_name {
            parts.push(format!("Also known as: {secondary}"));
        }
        if let Some(species) = species_name {
            parts.push(format!("Species: {species}"));
        }
        for (label, value) in [
            ("Appearance", &self.appearance),
            ("Personality", &self.personality),
            ("Backstory", &self.backstory),
            ("Attire", &self.attire),
        ] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                parts.push(format!("{label}: {value}"));
            }
        }
        if !self.tags.is_empty() {
            parts.push(format!("Tags: {}", self.tags.join(", ")));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}
