//! Filter and rank a batch of raw market records

use super::{Categorizer, PricePolicy, RecordNormalizer, ScanFilters, Scorer};
use crate::types::Opportunity;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Counters for one `rank` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Raw records seen
    pub total: usize,
    /// Dropped by the normalizer (no question / no price)
    pub malformed: usize,
    /// Dropped by volume, liquidity, odds, query or expiry filters
    pub filtered: usize,
    /// Dropped by category allow/exclude lists
    pub category_filtered: usize,
    /// Passed every filter (before the limit)
    pub matched: usize,
    pub returned: usize,
}

/// Normalizer + categorizer + scorer
#[derive(Debug, Clone, Default)]
pub struct OpportunityPipeline {
    normalizer: RecordNormalizer,
    categorizer: Categorizer,
    scorer: Scorer,
}

impl OpportunityPipeline {
    pub fn new(policy: PricePolicy) -> Self {
        Self {
            normalizer: RecordNormalizer::new(policy),
            ..Self::default()
        }
    }

    pub fn with_categorizer(mut self, categorizer: Categorizer) -> Self {
        self.categorizer = categorizer;
        self
    }

    /// Top `limit` opportunities by descending score. Equal scores keep input order.
    pub fn rank(
        &self,
        raw_records: &[Value],
        filters: &ScanFilters,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<Opportunity> {
        self.rank_with_stats(raw_records, filters, limit, now).0
    }

    pub fn rank_with_stats(
        &self,
        raw_records: &[Value],
        filters: &ScanFilters,
        limit: usize,
        now: DateTime<Utc>,
    ) -> (Vec<Opportunity>, ScanStats) {
        let mut stats = ScanStats {
            total: raw_records.len(),
            ..ScanStats::default()
        };
        let mut ranked = Vec::new();

        for raw in raw_records {
            let Some(mut opp) = self.normalizer.normalize(raw) else {
                stats.malformed += 1;
                continue;
            };

            if !passes_filters(&opp, filters, now) {
                stats.filtered += 1;
                continue;
            }

            opp.category = self.categorizer.categorize(&opp.question);
            if !filters.category_allowed(opp.category) {
                debug!("Skipping {} market: {}", opp.category, opp.question);
                stats.category_filtered += 1;
                continue;
            }

            opp.score = Some(self.scorer.score(&opp, now));
            ranked.push(opp);
        }

        stats.matched = ranked.len();

        // sort_by is stable, so ties keep their input order
        ranked.sort_by(|a, b| b.score_or_min().total_cmp(&a.score_or_min()));
        ranked.truncate(limit);
        stats.returned = ranked.len();

        info!(
            "Scan: {} records, {} malformed, {} filtered, {} by category, {} returned",
            stats.total, stats.malformed, stats.filtered, stats.category_filtered, stats.returned
        );

        (ranked, stats)
    }
}

fn passes_filters(opp: &Opportunity, filters: &ScanFilters, now: DateTime<Utc>) -> bool {
    if opp.volume_total < filters.min_volume || opp.liquidity < filters.min_liquidity {
        return false;
    }

    let (low, high) = filters.odds_range;
    if opp.yes_price < low || opp.yes_price > high {
        return false;
    }

    if !filters.matches_query(&opp.question, opp.event_title.as_deref()) {
        return false;
    }

    if let Some(window) = filters.expiry_window {
        let Some(end) = opp.end_time else {
            return false;
        };
        // Bounds past the representable range are open
        let earliest = Duration::try_hours(window.min_hours).and_then(|d| now.checked_add_signed(d));
        let latest = Duration::try_days(window.max_days).and_then(|d| now.checked_add_signed(d));
        if earliest.is_some_and(|earliest| end < earliest) || latest.is_some_and(|latest| end > latest) {
            return false;
        }
    }

    true
}
