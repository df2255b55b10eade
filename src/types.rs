//! Core types shared by the scanner and the safety gate

use crate::error::{Result, ScannerError};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Binary market outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Yes,
    No,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Yes => write!(f, "YES"),
            Outcome::No => write!(f, "NO"),
        }
    }
}

/// Topic category assigned from the question text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    Crypto,
    Politics,
    Economics,
    Geopolitics,
    Tech,
    Entertainment,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sports => "sports",
            Category::Crypto => "crypto",
            Category::Politics => "politics",
            Category::Economics => "economics",
            Category::Geopolitics => "geopolitics",
            Category::Tech => "tech",
            Category::Entertainment => "entertainment",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sports" => Ok(Category::Sports),
            "crypto" => Ok(Category::Crypto),
            "politics" => Ok(Category::Politics),
            "economics" => Ok(Category::Economics),
            "geopolitics" => Ok(Category::Geopolitics),
            "tech" => Ok(Category::Tech),
            "entertainment" => Ok(Category::Entertainment),
            "other" => Ok(Category::Other),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

/// Where an opportunity's prices came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Per-outcome `tokens` list
    TokenList,
    /// Positional `outcomePrices` array
    OutcomePrices,
    /// No usable price; 0.5 substituted (legacy mode only)
    Assumed,
}

/// A normalized, scoreable market record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub question: String,
    /// Market id, or condition id when the id is absent
    pub identifier: String,
    pub slug: String,
    pub yes_price: Decimal,
    pub no_price: Decimal,
    pub price_source: PriceSource,
    pub volume_total: Decimal,
    pub volume_24h: Decimal,
    pub liquidity: Decimal,
    pub end_time: Option<DateTime<Utc>>,
    /// Lowercased outcome name -> CLOB token id
    pub token_ids: BTreeMap<String, String>,
    /// Title of the parent event, when the record came from `/events`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
    pub category: Category,
    pub score: Option<f64>,
}

impl Opportunity {
    /// Public market page
    pub fn url(&self) -> String {
        format!("https://polymarket.com/event/{}", self.slug)
    }

    pub fn token_id(&self, outcome: Outcome) -> Option<&str> {
        let key = match outcome {
            Outcome::Yes => "yes",
            Outcome::No => "no",
        };
        self.token_ids.get(key).map(String::as_str)
    }

    /// Score, or negative infinity when not yet scored
    pub fn score_or_min(&self) -> f64 {
        self.score.unwrap_or(f64::NEG_INFINITY)
    }
}

/// An executed trade, as recorded in the safety state log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub market_id: String,
    pub token_id: String,
    pub side: Side,
    pub outcome: Outcome,
    pub price: Decimal,
    pub size_usd: Decimal,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// A trade the caller would like to place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub token_id: String,
    pub side: Side,
    pub outcome: Outcome,
    /// Limit price; `None` for a market order
    pub price: Option<Decimal>,
    pub size_usd: Decimal,
}

pub const MIN_LIMIT_PRICE: Decimal = dec!(0.01);
pub const MAX_LIMIT_PRICE: Decimal = dec!(0.99);

/// Token ids are decimal integers or 0x-prefixed hex
pub fn is_valid_token_id(token_id: &str) -> bool {
    if token_id.is_empty() {
        return false;
    }
    if token_id.bytes().all(|b| b.is_ascii_digit()) {
        return true;
    }
    match token_id.strip_prefix("0x") {
        Some(hex) => !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

impl OrderIntent {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_token_id(&self.token_id) {
            return Err(ScannerError::InvalidOrder(format!(
                "invalid token id format: {}",
                self.token_id
            )));
        }

        if let Some(price) = self.price {
            if price < MIN_LIMIT_PRICE || price > MAX_LIMIT_PRICE {
                return Err(ScannerError::InvalidOrder(format!(
                    "price {} outside [{}, {}]",
                    price, MIN_LIMIT_PRICE, MAX_LIMIT_PRICE
                )));
            }
        }

        if self.size_usd <= Decimal::ZERO {
            return Err(ScannerError::InvalidOrder(format!(
                "size must be positive, got {}",
                self.size_usd
            )));
        }

        Ok(())
    }

    /// Limit price, or the most aggressive price for a market order
    pub fn effective_price(&self) -> Decimal {
        match (self.price, self.side) {
            (Some(price), _) => price,
            (None, Side::Buy) => MAX_LIMIT_PRICE,
            (None, Side::Sell) => MIN_LIMIT_PRICE,
        }
    }

    /// Build the record committed to the safety state once the order went through
    pub fn into_record(self, market_id: &str, order_id: Option<String>, now: DateTime<Utc>) -> TradeRecord {
        let price = self.effective_price();
        TradeRecord {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            market_id: market_id.to_string(),
            token_id: self.token_id,
            side: self.side,
            outcome: self.outcome,
            price,
            size_usd: self.size_usd,
            order_id,
        }
    }
}
