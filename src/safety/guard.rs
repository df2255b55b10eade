//! Load -> evaluate -> commit -> save, in one place

use super::{Decision, SafetyGate, SafetyState, StateStore};
use crate::error::Result;
use crate::types::TradeRecord;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::info;

/// A `SafetyGate` bound to the store holding its state
pub struct TradeGuard<S: StateStore> {
    store: S,
    gate: SafetyGate,
}

impl<S: StateStore> TradeGuard<S> {
    pub fn new(store: S, gate: SafetyGate) -> Self {
        Self { store, gate }
    }

    pub fn gate(&self) -> &SafetyGate {
        &self.gate
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current state, rolled forward to `now`. Nothing is saved.
    pub async fn state(&self, now: DateTime<Utc>) -> Result<SafetyState> {
        let state = self
            .store
            .load()
            .await?
            .unwrap_or_else(|| SafetyState::new(now.date_naive()));
        Ok(state.rolled_forward(now))
    }

    /// Would a trade of `proposed_usd` be allowed right now?
    pub async fn check(&self, proposed_usd: Decimal, now: DateTime<Utc>) -> Result<Decision> {
        let state = self.state(now).await?;
        Ok(self.gate.evaluate(&state, proposed_usd, now))
    }

    /// Evaluate `record` and, only if allowed, commit it and persist the new state.
    /// A denial leaves the store untouched.
    pub async fn record(&self, record: TradeRecord, now: DateTime<Utc>) -> Result<Decision> {
        let state = self.state(now).await?;
        let decision = self.gate.evaluate(&state, record.size_usd, now);
        if !decision.allowed {
            return Ok(decision);
        }

        let trade_id = record.id.clone();
        let state = self.gate.commit(state, &decision, record, now)?;
        self.store.save(&state).await?;

        info!(
            "Recorded trade {} ({} today, ${} invested)",
            trade_id, state.trades_today, state.total_invested
        );
        Ok(decision)
    }
}
