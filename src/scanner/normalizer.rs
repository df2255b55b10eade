//! Raw market payload -> `Opportunity`
//!
//! Gamma returns several overlapping shapes for the same market (a `tokens` list
//! from the CLOB-flavoured endpoints, JSON-encoded `outcomePrices`/`clobTokenIds`
//! strings from `/markets`, numbers that are sometimes strings). Each field below
//! has one ordered list of strategies and one documented fallback.
//!
//! | field       | strategies                                   | on failure      |
//! |-------------|----------------------------------------------|-----------------|
//! | question    | `question`, `title`                          | drop record     |
//! | identifier  | `id`, `condition_id`, `conditionId`          | empty           |
//! | prices      | `tokens[].price`, `outcomePrices`            | drop / 0.5      |
//! | volume      | `volumeNum`, `volume`                        | 0               |
//! | volume_24h  | `volume24hr`                                 | 0               |
//! | liquidity   | `liquidityNum`, `liquidity`                  | 0               |
//! | end_time    | `endDate`, `end_date_iso`                    | none            |
//! | token_ids   | `tokens[]`, `clobTokenIds` x `outcomes`      | empty           |

use super::PricePolicy;
use crate::types::{Category, Opportunity, PriceSource};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::debug;

/// Converts one raw record into an `Opportunity`
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer {
    policy: PricePolicy,
}

impl RecordNormalizer {
    pub fn new(policy: PricePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> PricePolicy {
        self.policy
    }

    /// Returns `None` when the record has no question, or (under
    /// `PricePolicy::Strict`) no recoverable YES price.
    pub fn normalize(&self, raw: &Value) -> Option<Opportunity> {
        let question = first_string(raw, &["question", "title"])?;

        let (yes_price, no_price, price_source) = match extract_prices(raw) {
            Some(prices) => prices,
            None => match self.policy {
                PricePolicy::Strict => {
                    debug!("Dropping market without usable price: {}", question);
                    return None;
                }
                PricePolicy::AssumeEven => {
                    let half = Decimal::new(5, 1);
                    (half, half, PriceSource::Assumed)
                }
            },
        };

        Some(Opportunity {
            identifier: first_string(raw, &["id", "condition_id", "conditionId"]).unwrap_or_default(),
            slug: first_string(raw, &["slug"]).unwrap_or_default(),
            question,
            yes_price,
            no_price,
            price_source,
            volume_total: first_amount(raw, &["volumeNum", "volume"]),
            volume_24h: first_amount(raw, &["volume24hr"]),
            liquidity: first_amount(raw, &["liquidityNum", "liquidity"]),
            end_time: ["endDate", "end_date_iso"]
                .iter()
                .filter_map(|key| raw.get(*key).and_then(Value::as_str))
                .find_map(parse_end_time),
            token_ids: extract_token_ids(raw),
            event_title: first_string(raw, &["event_title"]),
            category: Category::Other,
            score: None,
        })
    }
}

/// Flatten `/events` payloads into market records.
///
/// Nested markets inherit the event's title, slug and end date; an event with
/// no markets is passed through as a record of its own.
pub fn expand_events(events: &[Value]) -> Vec<Value> {
    let mut records = Vec::new();

    for event in events {
        let markets = event.get("markets").and_then(Value::as_array).filter(|m| !m.is_empty());
        let Some(markets) = markets else {
            records.push(event.clone());
            continue;
        };

        for market in markets {
            let mut market = market.clone();
            if let Some(obj) = market.as_object_mut() {
                if let Some(title) = event.get("title") {
                    obj.insert("event_title".to_string(), title.clone());
                    if !obj.contains_key("question") {
                        obj.insert("question".to_string(), title.clone());
                    }
                }
                if let Some(slug) = event.get("slug") {
                    obj.insert("event_slug".to_string(), slug.clone());
                }
                if !obj.contains_key("endDate") {
                    if let Some(end) = event.get("endDate") {
                        obj.insert("endDate".to_string(), end.clone());
                    }
                }
            }
            records.push(market);
        }
    }

    records
}

/// (yes, no, source) from the first strategy that yields a YES price
fn extract_prices(raw: &Value) -> Option<(Decimal, Decimal, PriceSource)> {
    if let Some((yes, no)) = prices_from_tokens(raw) {
        return Some((yes, no.unwrap_or(Decimal::ONE - yes), PriceSource::TokenList));
    }
    if let Some((yes, no)) = prices_from_outcome_prices(raw) {
        return Some((yes, no.unwrap_or(Decimal::ONE - yes), PriceSource::OutcomePrices));
    }
    None
}

fn prices_from_tokens(raw: &Value) -> Option<(Decimal, Option<Decimal>)> {
    let tokens = raw.get("tokens").and_then(Value::as_array)?;

    let mut yes = None;
    let mut no = None;
    for token in tokens {
        let outcome = token.get("outcome").and_then(Value::as_str).unwrap_or_default();
        // Zero means "no quote" on the token list
        let price = token
            .get("price")
            .and_then(parse_price)
            .filter(|p| !p.is_zero());
        if outcome.eq_ignore_ascii_case("yes") {
            yes = yes.or(price);
        } else if outcome.eq_ignore_ascii_case("no") {
            no = no.or(price);
        }
    }

    yes.map(|yes| (yes, no))
}

fn prices_from_outcome_prices(raw: &Value) -> Option<(Decimal, Option<Decimal>)> {
    let prices = raw.get("outcomePrices").and_then(json_list)?;
    let yes = prices.first().and_then(parse_price)?;
    let no = prices.get(1).and_then(parse_price);
    Some((yes, no))
}

fn extract_token_ids(raw: &Value) -> BTreeMap<String, String> {
    let mut token_ids = BTreeMap::new();

    if let Some(tokens) = raw.get("tokens").and_then(Value::as_array).filter(|t| !t.is_empty()) {
        for token in tokens {
            let outcome = token.get("outcome").and_then(Value::as_str).unwrap_or_default();
            if let Some(id) = token.get("token_id").and_then(value_to_string) {
                token_ids.insert(outcome.to_lowercase(), id);
            }
        }
        return token_ids;
    }

    let Some(clob_ids) = raw.get("clobTokenIds").and_then(json_list) else {
        return token_ids;
    };

    let outcomes: Vec<String> = raw
        .get("outcomes")
        .and_then(json_list)
        .map(|list| list.iter().filter_map(value_to_string).collect())
        .unwrap_or_else(|| vec!["Yes".to_string(), "No".to_string()]);

    for (i, id) in clob_ids.iter().enumerate() {
        let Some(id) = value_to_string(id) else {
            continue;
        };
        let name = outcomes
            .get(i)
            .map(|o| o.to_lowercase())
            .unwrap_or_else(|| format!("outcome {}", i));
        token_ids.insert(name, id);
    }

    token_ids
}

/// A JSON array, or a string containing one
fn json_list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::String(s) => serde_json::from_str::<Vec<Value>>(s).ok(),
        _ => None,
    }
}

fn first_string(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| raw.get(*key).and_then(value_to_string))
        .find(|s| !s.trim().is_empty())
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// A price must lie in [0, 1]
fn parse_price(value: &Value) -> Option<Decimal> {
    parse_decimal(value).filter(|p| *p >= Decimal::ZERO && *p <= Decimal::ONE)
}

/// First key that parses to a non-negative amount, else zero
fn first_amount(raw: &Value, keys: &[&str]) -> Decimal {
    keys.iter()
        .filter_map(|key| raw.get(*key).and_then(parse_decimal))
        .find(|amount| *amount >= Decimal::ZERO)
        .unwrap_or(Decimal::ZERO)
}

/// RFC 3339 (`Z` or offset); offset-less timestamps and bare dates are read as UTC
fn parse_end_time(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
