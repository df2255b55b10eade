//! Opportunity scoring
//!
//! A ranking heuristic, not a prediction: higher means "more interesting to look
//! at". Typical scores fall between -50 and 100.

use crate::types::Opportunity;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: i64 = 86_400;

/// Per-term contributions to a score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub odds: f64,
    pub volume: f64,
    pub activity: f64,
    pub liquidity: f64,
    pub time: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.odds + self.volume + self.activity + self.liquidity + self.time
    }
}

/// Stateless scorer; a struct so the pipeline can hold it alongside the other stages
#[derive(Debug, Clone, Copy, Default)]
pub struct Scorer;

impl Scorer {
    pub fn score(&self, opportunity: &Opportunity, now: DateTime<Utc>) -> f64 {
        score(opportunity, now)
    }

    pub fn breakdown(&self, opportunity: &Opportunity, now: DateTime<Utc>) -> ScoreBreakdown {
        breakdown(opportunity, now)
    }
}

pub fn score(opportunity: &Opportunity, now: DateTime<Utc>) -> f64 {
    breakdown(opportunity, now).total()
}

pub fn breakdown(opportunity: &Opportunity, now: DateTime<Utc>) -> ScoreBreakdown {
    ScoreBreakdown {
        odds: odds_term(opportunity.yes_price.to_f64().unwrap_or(0.0)),
        volume: volume_term(opportunity.volume_total.to_f64().unwrap_or(0.0)),
        activity: activity_term(opportunity.volume_24h.to_f64().unwrap_or(0.0)),
        liquidity: liquidity_term(opportunity.liquidity.to_f64().unwrap_or(0.0)),
        time: opportunity
            .end_time
            .map(|end| time_term(days_left(end, now)))
            .unwrap_or(0.0),
    }
}

/// Whole days until `end`, floored (a market ending in 12 hours has 0 days left,
/// one that ended an hour ago has -1)
pub fn days_left(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (end - now).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Parabola peaking at 30 for a coin-flip, zero at 0.2/0.8
fn odds_term(yes_price: f64) -> f64 {
    if (0.20..=0.80).contains(&yes_price) {
        30.0 * (1.0 - 4.0 * (yes_price - 0.5).powi(2))
    } else if (0.10..=0.90).contains(&yes_price) {
        10.0
    } else {
        0.0
    }
}

/// Log scale, saturating around $1M
fn volume_term(volume: f64) -> f64 {
    if volume > 0.0 {
        25.0 * ((volume + 1.0).log10() / 6.0).min(1.0)
    } else {
        0.0
    }
}

fn activity_term(volume_24h: f64) -> f64 {
    if volume_24h > 10_000.0 {
        10.0
    } else if volume_24h > 1_000.0 {
        5.0
    } else {
        0.0
    }
}

fn liquidity_term(liquidity: f64) -> f64 {
    if liquidity > 50_000.0 {
        15.0
    } else if liquidity > 10_000.0 {
        10.0
    } else if liquidity > 1_000.0 {
        5.0
    } else {
        0.0
    }
}

fn time_term(days_left: i64) -> f64 {
    match days_left {
        d if d <= 0 => -50.0,
        1..=30 => 20.0,
        31..=90 => 10.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_odds_term_shape() {
        assert!((odds_term(0.5) - 30.0).abs() < 1e-9);
        assert!(odds_term(0.2).abs() < 1e-9);
        assert!(odds_term(0.8).abs() < 1e-9);
        assert_eq!(odds_term(0.15), 10.0);
        assert_eq!(odds_term(0.90), 10.0);
        assert_eq!(odds_term(0.95), 0.0);
        assert_eq!(odds_term(0.05), 0.0);
    }

    #[test]
    fn test_volume_term_saturates() {
        assert_eq!(volume_term(0.0), 0.0);
        assert!((volume_term(999_999.0) - 25.0).abs() < 1e-9);
        assert_eq!(volume_term(50_000_000.0), 25.0);
        assert!(volume_term(1_000.0) < volume_term(10_000.0));
    }

    #[test]
    fn test_activity_and_liquidity_thresholds() {
        assert_eq!(activity_term(10_000.0), 5.0);
        assert_eq!(activity_term(10_001.0), 10.0);
        assert_eq!(activity_term(1_000.0), 0.0);
        assert_eq!(liquidity_term(50_000.0), 10.0);
        assert_eq!(liquidity_term(50_001.0), 15.0);
        assert_eq!(liquidity_term(1_001.0), 5.0);
        assert_eq!(liquidity_term(1_000.0), 0.0);
    }

    #[test]
    fn test_time_term_bands() {
        assert_eq!(time_term(-5), -50.0);
        assert_eq!(time_term(0), -50.0);
        assert_eq!(time_term(1), 20.0);
        assert_eq!(time_term(30), 20.0);
        assert_eq!(time_term(31), 10.0);
        assert_eq!(time_term(90), 10.0);
        assert_eq!(time_term(91), 0.0);
    }

    #[test]
    fn test_days_left_floors() {
        let now = Utc::now();
        assert_eq!(days_left(now + Duration::hours(12), now), 0);
        assert_eq!(days_left(now + Duration::hours(36), now), 1);
        assert_eq!(days_left(now - Duration::hours(1), now), -1);
        assert_eq!(days_left(now + Duration::days(15) + Duration::minutes(1), now), 15);
    }
}
