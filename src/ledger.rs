//! Seller-side aggregates over campaign outcomes.
//!
//! The ledger only ever moves forward: it is mutated by creation,
//! settlement, and failure events, and reset only by process restart. The
//! group status machine guarantees at most one settlement (or one failure)
//! per campaign, so nothing here can double-count.

use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::groupbuy::SettlementReport;

/// Process-wide revenue and outcome statistics.
#[derive(Debug, Default)]
pub struct Ledger {
    total_revenue: Decimal,
    total_savings: Decimal,
    groups_created: u64,
    groups_settled: u64,
    groups_failed: u64,
    units_sold: FxHashMap<String, u64>,
}

/// Render-ready dashboard snapshot with derived rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerView {
    pub total_revenue: Decimal,
    pub total_savings: Decimal,
    pub groups_created: u64,
    pub groups_settled: u64,
    pub groups_failed: u64,
    pub groups_open: u64,
    /// Percentage of created groups that settled.
    pub success_rate: Decimal,
    pub average_revenue_per_settled_group: Decimal,
    /// Units sold per product name, sorted by name for stable rendering.
    pub units_sold: Vec<(String, u64)>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_created(&mut self) {
        self.groups_created += 1;
    }

    /// Fold one settlement into the aggregates.
    pub(crate) fn record_settlement(&mut self, report: &SettlementReport) {
        self.total_revenue += report.total_revenue;
        self.total_savings += report.total_savings;
        self.groups_settled += 1;
        *self
            .units_sold
            .entry(report.product_name.clone())
            .or_insert(0) += u64::from(report.member_count);
    }

    pub(crate) fn record_failure(&mut self) {
        self.groups_failed += 1;
    }

    #[inline]
    pub fn total_revenue(&self) -> Decimal {
        self.total_revenue
    }

    #[inline]
    pub fn groups_created(&self) -> u64 {
        self.groups_created
    }

    #[inline]
    pub fn groups_settled(&self) -> u64 {
        self.groups_settled
    }

    #[inline]
    pub fn groups_failed(&self) -> u64 {
        self.groups_failed
    }

    pub fn units_sold(&self, product_name: &str) -> u64 {
        self.units_sold.get(product_name).copied().unwrap_or(0)
    }

    /// Read-only aggregate for dashboard rendering.
    pub fn snapshot(&self) -> LedgerView {
        let success_rate = (Decimal::from(self.groups_settled) * Decimal::ONE_HUNDRED
            / Decimal::from(self.groups_created.max(1)))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        let average_revenue_per_settled_group = (self.total_revenue
            / Decimal::from(self.groups_settled.max(1)))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

        let mut units_sold: Vec<(String, u64)> = self
            .units_sold
            .iter()
            .map(|(name, units)| (name.clone(), *units))
            .collect();
        units_sold.sort();

        LedgerView {
            total_revenue: self.total_revenue,
            total_savings: self.total_savings,
            groups_created: self.groups_created,
            groups_settled: self.groups_settled,
            groups_failed: self.groups_failed,
            groups_open: self.groups_created - self.groups_settled - self.groups_failed,
            success_rate,
            average_revenue_per_settled_group,
            units_sold,
        }
    }
}
