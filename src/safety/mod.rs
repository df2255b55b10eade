//! Trade safety gate
//!
//! Decides whether a proposed trade may go ahead right now (daily cap, cooldown,
//! human-approval threshold) and records accepted trades.
//!
//! The gate is advisory. `evaluate` never mutates anything and `commit` only
//! refuses a decision that was itself a denial; a caller that skips `evaluate`
//! altogether bypasses every limit. Always go through [`TradeGuard`] or call
//! `evaluate` then `commit` with the resulting decision.
//!
//! State is a plain value passed in and returned. Persisting it is the job of a
//! [`StateStore`], which must have exactly one writer at a time.

mod guard;
mod store;


pub use guard::TradeGuard;
pub use store::{JsonFileStateStore, MemoryStateStore, StateStore};

#[cfg(test)]
pub use store::MockStateStore;

use crate::config::SafetyConfig;
use crate::error::{Result, ScannerError};
use crate::types::TradeRecord;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

/// Persistent trading state for one trading identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyState {
    /// Append-only trade log
    #[serde(default)]
    pub trades: Vec<TradeRecord>,
    /// Trades since `last_reset_date` began
    #[serde(default)]
    pub trades_today: u32,
    #[serde(default)]
    pub last_trade_time: Option<DateTime<Utc>>,
    /// UTC date on which `trades_today` was last zeroed
    #[serde(
        alias = "last_reset",
        deserialize_with = "deserialize_reset_date",
        default = "today"
    )]
    pub last_reset_date: NaiveDate,
    #[serde(default)]
    pub daily_pnl: Decimal,
    #[serde(default)]
    pub total_invested: Decimal,
}

impl SafetyState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            trades: Vec::new(),
            trades_today: 0,
            last_trade_time: None,
            last_reset_date: today,
            daily_pnl: Decimal::ZERO,
            total_invested: Decimal::ZERO,
        }
    }

    /// Zero the daily counters if `now` falls on a later UTC date.
    /// Returns whether a reset happened.
    pub fn roll_forward(&mut self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        if today <= self.last_reset_date {
            return false;
        }
        self.trades_today = 0;
        self.daily_pnl = Decimal::ZERO;
        self.last_reset_date = today;
        true
    }

    /// Copy of the state as it would look at `now`
    pub fn rolled_forward(&self, now: DateTime<Utc>) -> Self {
        let mut state = self.clone();
        state.roll_forward(now);
        state
    }

    /// Trades in the log dated on or after `last_reset_date`
    pub fn logged_trades_today(&self) -> usize {
        self.trades
            .iter()
            .filter(|t| t.timestamp.date_naive() >= self.last_reset_date)
            .count()
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (older state files)
fn deserialize_reset_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(serde::de::Error::custom)
}

/// Why a trade was denied
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Denial {
    DailyLimit { limit: u32 },
    Cooldown { remaining_minutes: f64 },
    NeedsApproval { proposed_usd: Decimal, threshold_usd: Decimal },
}

/// Outcome of `SafetyGate::evaluate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: String,
    pub denial: Option<Denial>,
}

impl Decision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: "All safety checks passed".to_string(),
            denial: None,
        }
    }

    fn deny(denial: Denial) -> Self {
        let reason = match &denial {
            Denial::DailyLimit { limit } => {
                format!("Daily trade limit reached ({} trades per day)", limit)
            }
            Denial::Cooldown { remaining_minutes } => format!(
                "Cooldown active: {} minutes remaining",
                remaining_minutes.round() as i64
            ),
            Denial::NeedsApproval {
                proposed_usd,
                threshold_usd,
            } => format!(
                "Trade size ${} exceeds human approval threshold ${}",
                proposed_usd, threshold_usd
            ),
        };
        Self {
            allowed: false,
            reason,
            denial: Some(denial),
        }
    }
}

/// Stateless policy over `SafetyState`
#[derive(Debug, Clone)]
pub struct SafetyGate {
    config: SafetyConfig,
}

impl SafetyGate {
    pub fn new(config: SafetyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SafetyConfig {
        &self.config
    }

    /// Check a proposed trade. The first failing check wins:
    /// day rollover, daily cap, cooldown, approval threshold.
    pub fn evaluate(&self, state: &SafetyState, proposed_usd: Decimal, now: DateTime<Utc>) -> Decision {
        let state = state.rolled_forward(now);

        let decision = if state.trades_today >= self.config.max_trades_per_day {
            Decision::deny(Denial::DailyLimit {
                limit: self.config.max_trades_per_day,
            })
        } else if let Some(remaining) = self.cooldown_remaining(&state, now) {
            Decision::deny(Denial::Cooldown {
                remaining_minutes: remaining,
            })
        } else if proposed_usd > self.config.require_human_approval_above_usd {
            Decision::deny(Denial::NeedsApproval {
                proposed_usd,
                threshold_usd: self.config.require_human_approval_above_usd,
            })
        } else {
            Decision::allow()
        };

        if decision.allowed {
            info!(
                "Trade of ${} allowed ({}/{} today)",
                proposed_usd, state.trades_today, self.config.max_trades_per_day
            );
        } else {
            warn!("Trade of ${} denied: {}", proposed_usd, decision.reason);
        }

        decision
    }

    /// Record an executed trade. `decision` must be the allowing result of
    /// `evaluate` for this trade; a denial is rejected with `GateMisuse`.
    pub fn commit(
        &self,
        mut state: SafetyState,
        decision: &Decision,
        record: TradeRecord,
        now: DateTime<Utc>,
    ) -> Result<SafetyState> {
        if !decision.allowed {
            return Err(ScannerError::GateMisuse(format!(
                "commit after denied decision: {}",
                decision.reason
            )));
        }

        state.roll_forward(now);
        state.trades_today += 1;
        state.last_trade_time = Some(now);
        state.total_invested += record.size_usd;
        state.trades.push(record);

        Ok(state)
    }

    /// Minutes left before another trade is allowed, if any
    fn cooldown_remaining(&self, state: &SafetyState, now: DateTime<Utc>) -> Option<f64> {
        let last = state.last_trade_time?;
        let elapsed = (now - last).num_milliseconds() as f64 / 60_000.0;
        let cooldown = self.config.cooldown_minutes_between_trades;
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }
}
