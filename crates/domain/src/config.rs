use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Travel provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Tour-search API root.
    #[serde(default = "d_api_url")]
    pub api_url: String,
    /// Static reference-catalog root (JSON dumps of cities/hotels).
    #[serde(default = "d_static_url")]
    pub static_url: String,
    /// Env var holding the partner credential sent with each search.
    #[serde(default = "d_partner_env")]
    pub partner_id_env: String,
    /// Per-call HTTP timeout.
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
    /// Retry budget for transport-level failures (connect/timeout).
    #[serde(default = "d_3")]
    pub transport_retries: u32,
    /// Party size sent with every search request.
    #[serde(default = "d_1")]
    pub adult_count: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: d_api_url(),
            static_url: d_static_url(),
            partner_id_env: d_partner_env(),
            timeout_ms: 10_000,
            transport_retries: 3,
            adult_count: 1,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search orchestration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Total provider calls the date-shift fallback may make.
    #[serde(default = "d_3")]
    pub date_shift_attempts: u32,
    /// Offers kept after shaping; the rest are truncated away.
    #[serde(default = "d_1us")]
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            date_shift_attempts: 3,
            max_results: 1,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "d_state_path")]
    pub state_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("./data/state"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Telegram transport
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Env var holding the bot token.
    #[serde(default = "d_token_env")]
    pub token_env: String,
    /// Long-poll timeout passed to getUpdates, in seconds.
    #[serde(default = "d_50")]
    pub poll_timeout_s: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token_env: d_token_env(),
            poll_timeout_s: 50,
        }
    }
}

// ── serde default helpers ─────────────────────────────────────────────

fn d_api_url() -> String {
    "https://api.ozon.travel/tours/v1".into()
}
fn d_static_url() -> String {
    "https://www.ozon.travel/download/fortour".into()
}
fn d_partner_env() -> String {
    "TOURBOT_PARTNER_ID".into()
}
fn d_token_env() -> String {
    "TOURBOT_TOKEN".into()
}
fn d_state_path() -> PathBuf {
    PathBuf::from("./data/state")
}
fn d_10000() -> u64 {
    10_000
}
fn d_50() -> u64 {
    50
}
fn d_3() -> u32 {
    3
}
fn d_1() -> u32 {
    1
}
fn d_1us() -> usize {
    1
}
