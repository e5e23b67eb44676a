//! Species resolution: map a free-text label onto exactly one taxonomy id.
//!
//! Strategies run in a fixed order and the first hit wins:
//!
//! 1. synonym table, then exact lookup of the mapped canonical name
//! 2. case-insensitive exact name match
//! 3. approximate (normalized Levenshtein) match, accepted only above a
//!    threshold stricter than the one used to admit search candidates
//! 4. substring match in either direction
//! 5. per-token exact or substring match for tokens of three or more chars
//! 6. a generic humanoid word ("girl", "person", ...) maps to the human
//!    species; words are matched whole, so "catgirl" does not count
//! 7. the sentinel "unknown" id
//!
//! Scans walk the taxonomy in ascending id order. Substring matches prefer
//! the longest name contained in the label, then the shortest name that
//! contains the label; equal candidates resolve to the lowest id.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::synonyms::{normalize, SynonymTable};
use crate::domain::errors::DomainResult;
use crate::domain::models::{RemediationConfig, Taxonomy, TaxonomyEntry};
use crate::domain::ports::SpeciesRepository;

/// Generic terms that indicate a human-like character.
const HUMANOID_TERMS: &[&str] = &["girl", "boy", "woman", "man", "person", "human", "humanoid"];

/// Tokens shorter than this are ignored by the token strategy, and labels
/// shorter than this never match as a fragment of a longer name.
const MIN_TOKEN_CHARS: usize = 3;

/// Which strategy produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    Synonym,
    Exact,
    Approximate,
    Substring,
    Token,
    HumanoidHeuristic,
    Fallback,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synonym => "synonym",
            Self::Exact => "exact",
            Self::Approximate => "approximate",
            Self::Substring => "substring",
            Self::Token => "token",
            Self::HumanoidHeuristic => "humanoid_heuristic",
            Self::Fallback => "fallback",
        }
    }
}

/// The outcome of resolving one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub species_id: i64,
    pub strategy: MatchStrategy,
    /// Canonical name that matched; `None` for the sentinel.
    pub matched_name: Option<String>,
}

/// Tunables for resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub unknown_species_id: i64,
    pub human_species_name: String,
    /// Similarity needed to enter the approximate-match candidate list.
    pub search_threshold: f64,
    /// Similarity the best candidate needs to be accepted.
    pub accept_threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::from(&RemediationConfig::default())
    }
}

impl From<&RemediationConfig> for ResolverConfig {
    fn from(config: &RemediationConfig) -> Self {
        Self {
            unknown_species_id: config.unknown_species_id,
            human_species_name: config.human_species_name.clone(),
            search_threshold: config.search_threshold,
            accept_threshold: config.accept_threshold,
        }
    }
}

struct MatchContext<'a> {
    taxonomy: &'a Taxonomy,
    synonyms: &'a SynonymTable,
    config: &'a ResolverConfig,
    label: &'a str,
}

type StrategyFn = for<'a> fn(&MatchContext<'a>) -> Option<&'a TaxonomyEntry>;

const STRATEGIES: [(MatchStrategy, StrategyFn); 6] = [
    (MatchStrategy::Synonym, synonym_match),
    (MatchStrategy::Exact, exact_match),
    (MatchStrategy::Approximate, approximate_match),
    (MatchStrategy::Substring, substring_match),
    (MatchStrategy::Token, token_match),
    (MatchStrategy::HumanoidHeuristic, humanoid_match),
];

fn synonym_match<'a>(ctx: &MatchContext<'a>) -> Option<&'a TaxonomyEntry> {
    let canonical = ctx.synonyms.lookup(ctx.label)?;
    let entry = ctx.taxonomy.find_exact(canonical);
    if entry.is_none() {
        tracing::debug!(label = ctx.label, canonical, "synonym target missing from taxonomy");
    }
    entry
}

fn exact_match<'a>(ctx: &MatchContext<'a>) -> Option<&'a TaxonomyEntry> {
    ctx.taxonomy.entries().iter().find(|e| e.normalized == ctx.label)
}

fn approximate_match<'a>(ctx: &MatchContext<'a>) -> Option<&'a TaxonomyEntry> {
    let mut best: Option<(&TaxonomyEntry, f64)> = None;
    for entry in ctx.taxonomy.entries() {
        let similarity = strsim::normalized_levenshtein(ctx.label, &entry.normalized);
        if similarity < ctx.config.search_threshold {
            continue;
        }
        if best.is_none_or(|(_, s)| similarity > s) {
            best = Some((entry, similarity));
        }
    }

    let (entry, similarity) = best?;
    if similarity >= ctx.config.accept_threshold {
        Some(entry)
    } else {
        tracing::debug!(
            label = ctx.label,
            candidate = %entry.name,
            similarity,
            accept_threshold = ctx.config.accept_threshold,
            "approximate candidate below acceptance threshold"
        );
        None
    }
}

/// Substring match of `needle` against every entry, in either direction.
fn substring_candidate<'a>(taxonomy: &'a Taxonomy, needle: &str) -> Option<&'a TaxonomyEntry> {
    let mut contained: Option<&TaxonomyEntry> = None;
    let mut containing: Option<&TaxonomyEntry> = None;
    let fragment_ok = needle.chars().count() >= MIN_TOKEN_CHARS;

    for entry in taxonomy.entries() {
        if needle.contains(entry.normalized.as_str()) {
            if contained.is_none_or(|c| entry.normalized.len() > c.normalized.len()) {
                contained = Some(entry);
            }
        } else if fragment_ok
            && entry.normalized.contains(needle)
            && containing.is_none_or(|c| entry.normalized.len() < c.normalized.len())
        {
            containing = Some(entry);
        }
    }

    contained.or(containing)
}

fn substring_match<'a>(ctx: &MatchContext<'a>) -> Option<&'a TaxonomyEntry> {
    substring_candidate(ctx.taxonomy, ctx.label)
}

fn token_match<'a>(ctx: &MatchContext<'a>) -> Option<&'a TaxonomyEntry> {
    ctx.label
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .find_map(|token| {
            ctx.taxonomy
                .entries()
                .iter()
                .find(|e| e.normalized == token)
                .or_else(|| substring_candidate(ctx.taxonomy, token))
        })
}

fn humanoid_match<'a>(ctx: &MatchContext<'a>) -> Option<&'a TaxonomyEntry> {
    let mut words = ctx.label.split(|c: char| !c.is_alphanumeric());
    if words.any(|word| HUMANOID_TERMS.contains(&word)) {
        ctx.taxonomy.find_exact(&ctx.config.human_species_name)
    } else {
        None
    }
}

/// Resolves free-text species labels against the taxonomy.
///
/// Holds a taxonomy snapshot that is refreshed once per batch and loaded
/// lazily otherwise.
pub struct SpeciesResolver {
    species_repo: Arc<dyn SpeciesRepository>,
    synonyms: SynonymTable,
    config: ResolverConfig,
    snapshot: RwLock<Option<Arc<Taxonomy>>>,
}

impl SpeciesResolver {
    pub fn new(species_repo: Arc<dyn SpeciesRepository>, synonyms: SynonymTable, config: ResolverConfig) -> Self {
        Self {
            species_repo,
            synonyms,
            config,
            snapshot: RwLock::new(None),
        }
    }

    pub fn unknown_species_id(&self) -> i64 {
        self.config.unknown_species_id
    }

    /// Reload the taxonomy snapshot from the store.
    pub async fn refresh(&self) -> DomainResult<Arc<Taxonomy>> {
        let species = self.species_repo.list().await?;
        let taxonomy = Arc::new(Taxonomy::new(species, self.config.unknown_species_id));
        tracing::debug!(entries = taxonomy.len(), "taxonomy snapshot refreshed");
        *self.snapshot.write().await = Some(Arc::clone(&taxonomy));
        Ok(taxonomy)
    }

    /// The current snapshot, loading it if none exists yet.
    pub async fn taxonomy(&self) -> DomainResult<Arc<Taxonomy>> {
        if let Some(taxonomy) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(taxonomy));
        }
        self.refresh().await
    }

    /// Canonical name for a species id, if it is a real (non-sentinel) entry.
    pub async fn species_name(&self, species_id: i64) -> Option<String> {
        let taxonomy = self.taxonomy().await.ok()?;
        taxonomy.name_of(species_id).map(str::to_string)
    }

    /// Resolve a label to a species id. Never fails: store errors and
    /// unmatched labels both yield the sentinel id.
    pub async fn resolve(&self, raw_label: &str, record_id: Option<Uuid>) -> i64 {
        match self.taxonomy().await {
            Ok(taxonomy) => self.resolve_logged(&taxonomy, raw_label, record_id).species_id,
            Err(e) => {
                tracing::error!(
                    record_id = ?record_id,
                    label = raw_label,
                    error = %e,
                    "failed to load taxonomy, using unknown species"
                );
                self.config.unknown_species_id
            }
        }
    }

    /// Resolve and emit an audit log line for the outcome.
    pub fn resolve_logged(&self, taxonomy: &Taxonomy, raw_label: &str, record_id: Option<Uuid>) -> Resolution {
        let resolution = self.resolve_in(taxonomy, raw_label);
        if resolution.strategy == MatchStrategy::Fallback {
            tracing::warn!(
                record_id = ?record_id,
                label = raw_label,
                species_id = resolution.species_id,
                strategy = resolution.strategy.as_str(),
                "no species match, using unknown species"
            );
        } else {
            tracing::info!(
                record_id = ?record_id,
                label = raw_label,
                species_id = resolution.species_id,
                matched = resolution.matched_name.as_deref().unwrap_or_default(),
                strategy = resolution.strategy.as_str(),
                "resolved species"
            );
        }
        resolution
    }

    /// Run the strategy cascade against a taxonomy snapshot.
    pub fn resolve_in(&self, taxonomy: &Taxonomy, raw_label: &str) -> Resolution {
        let label = normalize(raw_label);
        if !label.is_empty() {
            let ctx = MatchContext {
                taxonomy,
                synonyms: &self.synonyms,
                config: &self.config,
                label: &label,
            };
            for (strategy, matcher) in STRATEGIES {
                if let Some(entry) = matcher(&ctx) {
                    return Resolution {
                        species_id: entry.id,
                        strategy,
                        matched_name: Some(entry.name.clone()),
                    };
                }
            }
        }

        Resolution {
            species_id: taxonomy.unknown_id(),
            strategy: MatchStrategy::Fallback,
            matched_name: None,
        }
    }
}
