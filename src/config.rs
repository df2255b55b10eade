//! Configuration loading
//!
//! `config.toml` is layered under `SCANNER__SECTION__KEY` environment variables.
//! Every section and key has a default, so a missing file yields a usable config.

use crate::error::Result;
use crate::scanner::{PricePolicy, ScanFilters};
use crate::types::Category;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gamma: GammaConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub state: StateConfig,
}

impl Config {
    /// Load from a TOML file (optional) plus environment overrides
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("SCANNER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// Gamma market data API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GammaConfig {
    #[serde(default = "default_gamma_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_markets")]
    pub max_markets: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            base_url: default_gamma_url(),
            page_size: default_page_size(),
            max_markets: default_max_markets(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_gamma_url() -> String {
    "https://gamma-api.polymarket.com".to_string()
}

fn default_page_size() -> usize {
    100
}

fn default_max_markets() -> usize {
    500
}

fn default_timeout_secs() -> u64 {
    15
}

/// Default scan filters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_min_volume")]
    pub min_volume: Decimal,
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: Decimal,
    #[serde(default = "default_min_odds")]
    pub min_odds: Decimal,
    #[serde(default = "default_max_odds")]
    pub max_odds: Decimal,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub price_policy: PricePolicy,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub exclude_categories: Vec<Category>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            min_volume: default_min_volume(),
            min_liquidity: default_min_liquidity(),
            min_odds: default_min_odds(),
            max_odds: default_max_odds(),
            limit: default_limit(),
            price_policy: PricePolicy::default(),
            categories: Vec::new(),
            exclude_categories: Vec::new(),
        }
    }
}

impl ScannerConfig {
    pub fn to_filters(&self) -> ScanFilters {
        ScanFilters {
            min_volume: self.min_volume,
            min_liquidity: self.min_liquidity,
            odds_range: (self.min_odds, self.max_odds),
            allowed_categories: self.categories.iter().copied().collect(),
            excluded_categories: self.exclude_categories.iter().copied().collect(),
            query: None,
            expiry_window: None,
        }
    }
}

fn default_min_volume() -> Decimal {
    dec!(10000)
}

fn default_min_liquidity() -> Decimal {
    dec!(1000)
}

fn default_min_odds() -> Decimal {
    dec!(0.10)
}

fn default_max_odds() -> Decimal {
    dec!(0.90)
}

fn default_limit() -> usize {
    20
}

/// Limits enforced by the safety gate.
///
/// Missing keys fall back to conservative values here, so the gate itself
/// always sees a fully populated config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default = "default_max_trades_per_day")]
    pub max_trades_per_day: u32,
    #[serde(default = "default_cooldown_minutes")]
    pub cooldown_minutes_between_trades: f64,
    #[serde(default = "default_approval_threshold")]
    pub require_human_approval_above_usd: Decimal,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            max_trades_per_day: default_max_trades_per_day(),
            cooldown_minutes_between_trades: default_cooldown_minutes(),
            require_human_approval_above_usd: default_approval_threshold(),
        }
    }
}

fn default_max_trades_per_day() -> u32 {
    5
}

fn default_cooldown_minutes() -> f64 {
    30.0
}

fn default_approval_threshold() -> Decimal {
    dec!(10)
}

/// Where the safety state lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

impl StateConfig {
    /// State path with `~` and environment variables expanded
    pub fn resolved_path(&self) -> PathBuf {
        match shellexpand::full(&self.path) {
            Ok(expanded) => PathBuf::from(expanded.as_ref()),
            Err(_) => PathBuf::from(&self.path),
        }
    }
}

fn default_state_path() -> String {
    "state.json".to_string()
}
