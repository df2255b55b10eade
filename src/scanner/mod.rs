//! Opportunity scanner
//!
//! Turns raw Gamma market payloads into a ranked list of opportunities:
//!
//! ```text
//! raw JSON -> RecordNormalizer -> filters -> Categorizer -> Scorer -> stable sort -> top N
//! ```
//!
//! Nothing here performs I/O; records arrive already fetched.

mod categorizer;
mod normalizer;
mod pipeline;
mod scorer;


pub use categorizer::{categorize, Categorizer, DEFAULT_KEYWORDS};
pub use normalizer::{expand_events, RecordNormalizer};
pub use pipeline::{OpportunityPipeline, ScanStats};
pub use scorer::{breakdown, days_left, score, ScoreBreakdown, Scorer};

use crate::types::Category;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What to do with a record whose price cannot be recovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricePolicy {
    /// Drop the record
    #[default]
    Strict,
    /// Keep it at an assumed 50/50 price (legacy behavior)
    AssumeEven,
}

/// Only keep markets resolving within `[now + min_hours, now + max_days]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryWindow {
    pub min_hours: i64,
    pub max_days: i64,
}

impl Default for ExpiryWindow {
    fn default() -> Self {
        Self {
            min_hours: 6,
            max_days: 7,
        }
    }
}

/// Filters applied before scoring
#[derive(Debug, Clone)]
pub struct ScanFilters {
    /// Minimum total volume (USD)
    pub min_volume: Decimal,
    /// Minimum liquidity (USD)
    pub min_liquidity: Decimal,
    /// Inclusive bounds on the YES price
    pub odds_range: (Decimal, Decimal),
    /// Empty means every category is allowed
    pub allowed_categories: BTreeSet<Category>,
    pub excluded_categories: BTreeSet<Category>,
    /// Every whitespace-separated term must appear in the question or event title
    pub query: Option<String>,
    pub expiry_window: Option<ExpiryWindow>,
}

impl Default for ScanFilters {
    fn default() -> Self {
        Self {
            min_volume: dec!(10000),
            min_liquidity: dec!(1000),
            odds_range: (dec!(0.10), dec!(0.90)),
            allowed_categories: BTreeSet::new(),
            excluded_categories: BTreeSet::new(),
            query: None,
            expiry_window: None,
        }
    }
}

impl ScanFilters {
    /// No thresholds at all; useful for listing or tests
    pub fn permissive() -> Self {
        Self {
            min_volume: Decimal::ZERO,
            min_liquidity: Decimal::ZERO,
            odds_range: (Decimal::ZERO, Decimal::ONE),
            ..Self::default()
        }
    }

    pub fn category_allowed(&self, category: Category) -> bool {
        if !self.allowed_categories.is_empty() && !self.allowed_categories.contains(&category) {
            return false;
        }
        !self.excluded_categories.contains(&category)
    }

    pub fn matches_query(&self, question: &str, event_title: Option<&str>) -> bool {
        let Some(query) = &self.query else {
            return true;
        };
        let text = match event_title {
            Some(title) => format!("{} {}", question, title).to_lowercase(),
            None => question.to_lowercase(),
        };
        query
            .to_lowercase()
            .split_whitespace()
            .all(|term| text.contains(term))
    }
}
