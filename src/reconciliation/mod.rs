//! End-of-day cash reconciliation
//!
//! Two closing policies exist and they cannot be merged into one formula:
//!
//! - [`ReconciliationStrategy::EffectBased`] derives today's cash from sales
//!   minus everything that did not arrive as cash, then adds yesterday's cash.
//! - [`ReconciliationStrategy::VarianceBased`] takes the cash actually counted
//!   in the till and reports how far it is from what was expected.
//!
//! The engine is configured with exactly one of them. Its result is an enum
//! with one variant per strategy, so fields of the two policies never mix.

pub mod sales;
pub mod totals;

pub use sales::*;
pub use totals::*;

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::*;
use crate::utils::coerce;

/// Closing policy used to reconcile the till
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStrategy {
    /// Cash amount is derived from sales and deductions
    EffectBased,
    /// Cash amount is a counted figure compared against the expectation
    VarianceBased,
}

/// How serious a cash variance is, judged on its absolute size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarianceSeverity {
    /// No variance at all
    Perfect,
    Minor,
    Alert,
    Critical,
}

/// Absolute variance bounds between severities
///
/// A variance below `minor_below` is minor, below `alert_below` is an alert
/// and anything larger is critical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarianceThresholds {
    #[serde(with = "coerce::lenient::zero_if_missing")]
    pub minor_below: BigDecimal,
    #[serde(with = "coerce::lenient::zero_if_missing")]
    pub alert_below: BigDecimal,
}

impl Default for VarianceThresholds {
    fn default() -> Self {
        Self {
            minor_below: BigDecimal::from(100),
            alert_below: BigDecimal::from(500),
        }
    }
}

impl VarianceThresholds {
    /// Severity of a signed variance
    pub fn classify(&self, variance: &BigDecimal) -> VarianceSeverity {
        let size = variance.abs();
        if size == BigDecimal::from(0) {
            VarianceSeverity::Perfect
        } else if size < self.minor_below {
            VarianceSeverity::Minor
        } else if size < self.alert_below {
            VarianceSeverity::Alert
        } else {
            VarianceSeverity::Critical
        }
    }

    fn validate(&self) -> ClosingResult<()> {
        if self.minor_below <= BigDecimal::from(0) {
            return Err(ClosingError::Config(format!(
                "minor variance bound must be positive, got {}",
                self.minor_below
            )));
        }
        if self.alert_below < self.minor_below {
            return Err(ClosingError::Config(format!(
                "alert variance bound {} is below the minor bound {}",
                self.alert_below, self.minor_below
            )));
        }
        Ok(())
    }
}

/// Engine configuration
///
/// There is no default strategy; the integrator has to choose one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    pub strategy: ReconciliationStrategy,
    /// Decimal places reported figures are rounded to, if any
    #[serde(default)]
    pub currency_scale: Option<i64>,
    /// Severity bands for variance-based closings
    #[serde(default)]
    pub variance_thresholds: VarianceThresholds,
}

impl ReconciliationConfig {
    /// Create a configuration without rounding and with the default
    /// variance bands
    pub fn new(strategy: ReconciliationStrategy) -> Self {
        Self {
            strategy,
            currency_scale: None,
            variance_thresholds: VarianceThresholds::default(),
        }
    }

    /// Round reported figures to `scale` decimal places
    pub fn with_currency_scale(mut self, scale: i64) -> Self {
        self.currency_scale = Some(scale);
        self
    }

    /// Replace the variance severity bands
    pub fn with_variance_thresholds(mut self, thresholds: VarianceThresholds) -> Self {
        self.variance_thresholds = thresholds;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> ClosingResult<()> {
        if let Some(scale) = self.currency_scale {
            if scale < 0 {
                return Err(ClosingError::Config(format!(
                    "currency_scale must not be negative, got {scale}"
                )));
            }
        }
        self.variance_thresholds.validate()
    }
}

/// Strategy A output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectBasedReconciliation {
    pub totals: DayTotals,
    pub total_sales: BigDecimal,
    pub previous_cash: BigDecimal,
    /// Net cash received today from all operations
    pub cash_amount: BigDecimal,
    /// Closing cash position at the pump
    pub cash_in_hand: BigDecimal,
}

/// Direction of a cash variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashVarianceKind {
    /// Less cash than expected
    Shortage,
    Balanced,
    /// More cash than expected
    Overage,
}

/// Strategy B output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarianceReconciliation {
    pub totals: DayTotals,
    pub total_sales: BigDecimal,
    pub previous_cash: BigDecimal,
    /// Cash counted in the till
    pub cash_amount: BigDecimal,
    pub total_payments_received: BigDecimal,
    pub expected_to_collect: BigDecimal,
    pub expected_collection: BigDecimal,
    pub net_cash_after_expenses: BigDecimal,
    /// Received minus expected; negative is a shortage
    pub cash_variance: BigDecimal,
    /// Variance as a percentage of the expected collection, zero when
    /// nothing was expected
    pub variance_pct: BigDecimal,
    pub severity: VarianceSeverity,
}

impl VarianceReconciliation {
    /// Classify the variance
    pub fn variance_kind(&self) -> CashVarianceKind {
        match self.cash_variance.cmp(&BigDecimal::from(0)) {
            Ordering::Less => CashVarianceKind::Shortage,
            Ordering::Equal => CashVarianceKind::Balanced,
            Ordering::Greater => CashVarianceKind::Overage,
        }
    }
}

/// Outcome of a reconciliation, tagged by the strategy that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum ReconciliationResult {
    EffectBased(EffectBasedReconciliation),
    VarianceBased(VarianceReconciliation),
}

impl ReconciliationResult {
    /// Strategy that produced this result
    pub fn strategy(&self) -> ReconciliationStrategy {
        match self {
            ReconciliationResult::EffectBased(_) => ReconciliationStrategy::EffectBased,
            ReconciliationResult::VarianceBased(_) => ReconciliationStrategy::VarianceBased,
        }
    }

    /// Child table totals, common to both strategies
    pub fn totals(&self) -> &DayTotals {
        match self {
            ReconciliationResult::EffectBased(r) => &r.totals,
            ReconciliationResult::VarianceBased(r) => &r.totals,
        }
    }

    pub fn as_effect_based(&self) -> Option<&EffectBasedReconciliation> {
        match self {
            ReconciliationResult::EffectBased(r) => Some(r),
            ReconciliationResult::VarianceBased(_) => None,
        }
    }

    pub fn as_variance_based(&self) -> Option<&VarianceReconciliation> {
        match self {
            ReconciliationResult::VarianceBased(r) => Some(r),
            ReconciliationResult::EffectBased(_) => None,
        }
    }
}

/// Effect-based closing over precomputed totals
///
/// The snapshot's counted `cash_amount` is not read.
pub fn effect_based(snapshot: &DayClosingSnapshot, totals: DayTotals) -> EffectBasedReconciliation {
    let cash_amount = &snapshot.total_sales
        - &totals.credit_amount
        - &totals.card_amount
        - &totals.total_expenses
        - &totals.total_supplier_payments
        + &totals.total_credit_collections
        + &totals.total_fund_transfer_effect;
    let cash_in_hand = &snapshot.previous_cash + &cash_amount;

    EffectBasedReconciliation {
        totals,
        total_sales: snapshot.total_sales.clone(),
        previous_cash: snapshot.previous_cash.clone(),
        cash_amount,
        cash_in_hand,
    }
}

/// Variance relative to the expected collection, in percent
pub fn variance_percentage(variance: &BigDecimal, expected_collection: &BigDecimal) -> BigDecimal {
    if *expected_collection == BigDecimal::from(0) {
        return BigDecimal::from(0);
    }
    variance * BigDecimal::from(100) / expected_collection
}

/// Variance-based closing over precomputed totals
pub fn variance_based(
    snapshot: &DayClosingSnapshot,
    totals: DayTotals,
    thresholds: &VarianceThresholds,
) -> VarianceReconciliation {
    if snapshot.cash_amount.is_none() {
        tracing::warn!(
            petrol_pump = %snapshot.petrol_pump,
            "Variance reconciliation without a counted cash amount, treating it as zero"
        );
    }
    let cash_amount = coerce::or_zero(snapshot.cash_amount.as_ref());

    let total_payments_received = &snapshot.previous_cash + &cash_amount + &totals.card_amount;
    let expected_to_collect = &snapshot.total_sales - &totals.credit_amount;
    let expected_collection =
        &snapshot.previous_cash + &expected_to_collect - &totals.total_expenses;
    let net_cash_after_expenses = total_payments_received.clone();
    let cash_variance = &total_payments_received - &expected_collection;
    let variance_pct = variance_percentage(&cash_variance, &expected_collection);
    let severity = thresholds.classify(&cash_variance);

    VarianceReconciliation {
        totals,
        total_sales: snapshot.total_sales.clone(),
        previous_cash: snapshot.previous_cash.clone(),
        cash_amount,
        total_payments_received,
        expected_to_collect,
        expected_collection,
        net_cash_after_expenses,
        cash_variance,
        variance_pct,
        severity,
    }
}

/// Reconciliation engine bound to one strategy
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
}

impl ReconciliationEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: ReconciliationConfig) -> ClosingResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create an engine for a strategy with no rounding
    pub fn with_strategy(strategy: ReconciliationStrategy) -> Self {
        Self {
            config: ReconciliationConfig::new(strategy),
        }
    }

    /// Active strategy
    pub fn strategy(&self) -> ReconciliationStrategy {
        self.config.strategy
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Reconcile a day's snapshot
    ///
    /// Pure: calling it again on an unchanged snapshot gives the same result.
    pub fn compute_cash_reconciliation(&self, snapshot: &DayClosingSnapshot) -> ReconciliationResult {
        let totals = DayTotals::from_snapshot(snapshot);

        let result = match self.config.strategy {
            ReconciliationStrategy::EffectBased => {
                ReconciliationResult::EffectBased(effect_based(snapshot, totals))
            }
            ReconciliationStrategy::VarianceBased => {
                ReconciliationResult::VarianceBased(variance_based(
                    snapshot,
                    totals,
                    &self.config.variance_thresholds,
                ))
            }
        };

        let result = match self.config.currency_scale {
            Some(scale) => round_result(result, scale, &self.config.variance_thresholds),
            None => result,
        };

        tracing::debug!(
            petrol_pump = %snapshot.petrol_pump,
            closing_date = ?snapshot.closing_date,
            strategy = ?self.config.strategy,
            total_sales = %snapshot.total_sales,
            credit_rows = snapshot.credit_details.len(),
            expense_rows = snapshot.expenses.len(),
            card_rows = snapshot.card_sales.len(),
            transfer_rows = snapshot.fund_transfers.len(),
            "Computed cash reconciliation"
        );

        result
    }
}

fn round_result(
    result: ReconciliationResult,
    scale: i64,
    thresholds: &VarianceThresholds,
) -> ReconciliationResult {
    match result {
        ReconciliationResult::EffectBased(r) => {
            ReconciliationResult::EffectBased(EffectBasedReconciliation {
                totals: r.totals.rounded(scale),
                total_sales: r.total_sales.round(scale),
                previous_cash: r.previous_cash.round(scale),
                cash_amount: r.cash_amount.round(scale),
                cash_in_hand: r.cash_in_hand.round(scale),
            })
        }
        ReconciliationResult::VarianceBased(r) => {
            // severity follows the figure that is reported
            let cash_variance = r.cash_variance.round(scale);
            ReconciliationResult::VarianceBased(VarianceReconciliation {
                totals: r.totals.rounded(scale),
                total_sales: r.total_sales.round(scale),
                previous_cash: r.previous_cash.round(scale),
                cash_amount: r.cash_amount.round(scale),
                total_payments_received: r.total_payments_received.round(scale),
                expected_to_collect: r.expected_to_collect.round(scale),
                expected_collection: r.expected_collection.round(scale),
                net_cash_after_expenses: r.net_cash_after_expenses.round(scale),
                severity: thresholds.classify(&cash_variance),
                cash_variance,
                variance_pct: r.variance_pct.round(scale),
            })
        }
    }
}
