//! Row-level amounts and per-table totals

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::traits::AmountRow;
use crate::types::*;
use crate::utils::coerce;

/// Line amount for a quantity at a rate
///
/// Returns `liters * rate` only when both are greater than zero; a partial
/// row (rate not fetched yet, liters not entered, negative input) is worth
/// zero. Missing operands count as zero.
pub fn compute_amount<'a>(
    liters: impl Into<Option<&'a BigDecimal>>,
    rate: impl Into<Option<&'a BigDecimal>>,
) -> BigDecimal {
    let zero = BigDecimal::from(0);
    match (liters.into(), rate.into()) {
        (Some(liters), Some(rate)) if *liters > zero && *rate > zero => liters * rate,
        _ => zero,
    }
}

/// Sum of the `amount` field over a child table, missing amounts as zero
pub fn sum_amounts<I>(rows: I) -> BigDecimal
where
    I: IntoIterator,
    I::Item: AmountRow,
{
    rows.into_iter()
        .map(|row| coerce::or_zero(row.amount()))
        .sum()
}

/// Net cash effect of fund transfers on the till
///
/// Withdrawals from the bank add cash, deposits to the bank remove it.
/// Rows with an unrecognized transfer type are skipped.
pub fn compute_fund_transfer_effect(rows: &[FundTransferDetail]) -> BigDecimal {
    let mut effect = BigDecimal::from(0);
    for (idx, row) in rows.iter().enumerate() {
        let amount = coerce::or_zero(row.amount.as_ref());
        match row.transfer_type {
            TransferType::Withdraw => effect += amount,
            TransferType::Deposit => effect -= amount,
            TransferType::Unrecognized => {
                tracing::warn!(
                    row = idx,
                    amount = %amount,
                    bank_account = %row.bank_account,
                    "Ignoring fund transfer with unrecognized transfer type"
                );
            }
        }
    }
    effect
}

/// Aggregated credit sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditTotals {
    pub total_liters: BigDecimal,
    pub total_amount: BigDecimal,
}

/// Sum liters and amount over credit rows
///
/// Each row's amount is recomputed from its liters and rate first, so a
/// stale stored amount never reaches the total.
pub fn compute_credit_totals(rows: &[CreditDetail]) -> CreditTotals {
    let total_liters = rows.iter().map(CreditDetail::liters_or_zero).sum();
    let total_amount = rows.iter().map(CreditDetail::computed_amount).sum();
    CreditTotals {
        total_liters,
        total_amount,
    }
}

/// Totals of every child table in a snapshot, shared by both strategies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTotals {
    pub total_expenses: BigDecimal,
    pub card_amount: BigDecimal,
    pub credit_liters: BigDecimal,
    pub credit_amount: BigDecimal,
    pub total_supplier_payments: BigDecimal,
    pub total_credit_collections: BigDecimal,
    pub total_fund_transfer_effect: BigDecimal,
}

impl DayTotals {
    /// Compute all table totals for a snapshot
    pub fn from_snapshot(snapshot: &DayClosingSnapshot) -> Self {
        let credit = compute_credit_totals(&snapshot.credit_details);
        Self {
            total_expenses: sum_amounts(&snapshot.expenses),
            card_amount: sum_amounts(&snapshot.card_sales),
            credit_liters: credit.total_liters,
            credit_amount: credit.total_amount,
            total_supplier_payments: sum_amounts(&snapshot.supplier_payments),
            total_credit_collections: sum_amounts(&snapshot.credit_collections),
            total_fund_transfer_effect: compute_fund_transfer_effect(&snapshot.fund_transfers),
        }
    }

    pub(crate) fn rounded(&self, scale: i64) -> Self {
        Self {
            total_expenses: self.total_expenses.round(scale),
            card_amount: self.card_amount.round(scale),
            credit_liters: self.credit_liters.round(scale),
            credit_amount: self.credit_amount.round(scale),
            total_supplier_payments: self.total_supplier_payments.round(scale),
            total_credit_collections: self.total_credit_collections.round(scale),
            total_fund_transfer_effect: self.total_fund_transfer_effect.round(scale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    #[test]
    fn test_compute_amount_guards() {
        assert_eq!(compute_amount(&dec("10"), &dec("5")), dec("50"));
        assert_eq!(compute_amount(&dec("2.5"), &dec("101.4")), dec("253.5"));
        assert_eq!(compute_amount(&dec("0"), &dec("5")), dec("0"));
        assert_eq!(compute_amount(&dec("10"), &dec("0")), dec("0"));
        assert_eq!(compute_amount(&dec("-3"), &dec("5")), dec("0"));
        assert_eq!(compute_amount(&dec("3"), &dec("-5")), dec("0"));
        assert_eq!(compute_amount(None::<&BigDecimal>, &dec("5")), dec("0"));
    }

    #[test]
    fn test_sum_amounts_missing_counts_as_zero() {
        let rows = vec![
            ExpenseDetail::new("Tea".to_string(), dec("20")),
            ExpenseDetail {
                account: "Electricity".to_string(),
                description: None,
                amount: None,
            },
            ExpenseDetail::new("Cleaning".to_string(), dec("30.25")),
        ];
        assert_eq!(sum_amounts(&rows), dec("50.25"));

        let empty: Vec<CardSaleDetail> = Vec::new();
        assert_eq!(sum_amounts(&empty), dec("0"));
    }

    #[test]
    fn test_fund_transfer_effect() {
        let rows = vec![
            FundTransferDetail::withdraw(dec("100")),
            FundTransferDetail::deposit(dec("40")),
        ];
        assert_eq!(compute_fund_transfer_effect(&rows), dec("60"));

        let rows = vec![
            FundTransferDetail::withdraw(dec("100")),
            FundTransferDetail::new(TransferType::Unrecognized, dec("999")),
        ];
        assert_eq!(compute_fund_transfer_effect(&rows), dec("100"));
    }

    #[test]
    fn test_credit_totals_recompute_stale_amount() {
        let rows = vec![
            CreditDetail::new("Petrol".to_string(), dec("10"), dec("5")),
            CreditDetail::new("Petrol".to_string(), dec("0"), dec("5")),
        ];
        let totals = compute_credit_totals(&rows);
        assert_eq!(totals.total_liters, dec("10"));
        assert_eq!(totals.total_amount, dec("50"));

        let mut stale = CreditDetail::new("Diesel".to_string(), dec("4"), dec("90"));
        stale.amount = Some(dec("1"));
        let totals = compute_credit_totals(std::slice::from_ref(&stale));
        assert_eq!(totals.total_amount, dec("360"));

        stale.recompute_amount();
        assert_eq!(stale.amount, Some(dec("360")));
    }

    #[test]
    fn test_credit_row_without_rate_is_worth_zero() {
        let row = CreditDetail {
            customer: Some("Transport Co".to_string()),
            fuel_type: "Diesel".to_string(),
            liters: Some(dec("25")),
            rate: None,
            amount: Some(dec("2500")),
        };
        let totals = compute_credit_totals(&[row]);
        assert_eq!(totals.total_liters, dec("25"));
        assert_eq!(totals.total_amount, dec("0"));
    }
}
