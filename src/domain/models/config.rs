use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Main configuration structure for mender
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Remediation behaviour
    #[serde(default)]
    pub remediation: RemediationConfig,

    /// Character generation collaborator
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Image generation collaborator
    #[serde(default)]
    pub image: ImageConfig,

    /// Object storage collaborator
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".mender/mender.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Rotation for file output: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Well-known identity that owns auto-generated characters.
pub const DEFAULT_GENERATOR_USER_ID: Uuid = Uuid::from_u128(0x6d65_6e64_6572_4000_8000_0000_0000_0001);

/// Remediation behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RemediationConfig {
    /// Principal whose records are eligible for remediation
    #[serde(default = "default_generator_user_id")]
    pub generator_user_id: Uuid,

    /// Name given to characters before a real one was generated
    #[serde(default = "default_placeholder_name")]
    pub placeholder_name: String,

    /// Id of the sentinel "Unknown" species
    #[serde(default = "default_unknown_species_id")]
    pub unknown_species_id: i64,

    /// Species returned by the humanoid heuristic
    #[serde(default = "default_human_species_name")]
    pub human_species_name: String,

    /// Candidates per batch when no limit is given
    #[serde(default = "default_batch_size")]
    pub default_batch_size: u32,

    /// Pause between candidates, in milliseconds
    #[serde(default = "default_inter_item_delay_ms")]
    pub inter_item_delay_ms: u64,

    /// Language hint passed to the generation collaborator
    #[serde(default = "default_language_hint")]
    pub language_hint: String,

    /// Minimum similarity for a name to enter the approximate-match search
    #[serde(default = "default_search_threshold")]
    pub search_threshold: f64,

    /// Minimum similarity for the best approximate candidate to be accepted
    #[serde(default = "default_accept_threshold")]
    pub accept_threshold: f64,

    /// Extra synonym entries, merged over the built-in table
    #[serde(default)]
    pub synonyms: HashMap<String, String>,
}

const fn default_generator_user_id() -> Uuid {
    DEFAULT_GENERATOR_USER_ID
}

fn default_placeholder_name() -> String {
    "Unnamed".to_string()
}

const fn default_unknown_species_id() -> i64 {
    1
}

fn default_human_species_name() -> String {
    "Human".to_string()
}

const fn default_batch_size() -> u32 {
    50
}

const fn default_inter_item_delay_ms() -> u64 {
    1000
}

fn default_language_hint() -> String {
    "en".to_string()
}

const fn default_search_threshold() -> f64 {
    0.6
}

const fn default_accept_threshold() -> f64 {
    0.85
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            generator_user_id: default_generator_user_id(),
            placeholder_name: default_placeholder_name(),
            unknown_species_id: default_unknown_species_id(),
            human_species_name: default_human_species_name(),
            default_batch_size: default_batch_size(),
            inter_item_delay_ms: default_inter_item_delay_ms(),
            language_hint: default_language_hint(),
            search_threshold: default_search_threshold(),
            accept_threshold: default_accept_threshold(),
            synonyms: HashMap::new(),
        }
    }
}

/// Character generation collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GenerationConfig {
    #[serde(default = "default_generation_url")]
    pub base_url: String,

    /// Bearer token; falls back to `MENDER_GENERATION_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

fn default_generation_url() -> String {
    "http://localhost:8080".to_string()
}

const fn default_generation_timeout() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_url(),
            api_key: None,
            timeout_secs: default_generation_timeout(),
        }
    }
}

/// Image generation collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ImageConfig {
    #[serde(default = "default_image_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_image_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_style_tag")]
    pub style_tag: String,

    #[serde(default = "default_negative_prompt")]
    pub negative_prompt: String,

    #[serde(default)]
    pub lora_references: Vec<String>,
}

fn default_image_url() -> String {
    "http://localhost:8188".to_string()
}

const fn default_image_timeout() -> u64 {
    300
}

fn default_style_tag() -> String {
    "anime".to_string()
}

fn default_negative_prompt() -> String {
    "lowres, bad anatomy, bad hands, text, error, watermark, blurry".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: default_image_url(),
            api_key: None,
            timeout_secs: default_image_timeout(),
            style_tag: default_style_tag(),
            negative_prompt: default_negative_prompt(),
            lora_references: Vec::new(),
        }
    }
}

/// Object storage collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Upload endpoint; objects are written with `PUT {base_url}/{key}`
    #[serde(default = "default_storage_url")]
    pub base_url: String,

    /// Public CDN prefix used to build returned URLs
    #[serde(default = "default_public_url")]
    pub public_base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_storage_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_cache_control")]
    pub cache_control: String,
}

fn default_storage_url() -> String {
    "http://localhost:9000/characters".to_string()
}

fn default_public_url() -> String {
    "http://localhost:9000/characters".to_string()
}

const fn default_storage_timeout() -> u64 {
    60
}

fn default_cache_control() -> String {
    "public, max-age=31536000, immutable".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_storage_url(),
            public_base_url: default_public_url(),
            api_key: None,
            timeout_secs: default_storage_timeout(),
            cache_control: default_cache_control(),
        }
    }
}
