//! Fuel drawn from nozzles for calibration tests
//!
//! Test fuel leaves the tanks without being sold, so it is valued at the
//! current rate and tracked per fuel type for the stock check.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::FuelTestingDetail;
use crate::utils::coerce;

/// Totals over a fuel testing sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelTestingSummary {
    pub total_test_liters: BigDecimal,
    pub total_amount: BigDecimal,
    /// Positive test liters per fuel type
    pub liters_by_fuel: BTreeMap<String, BigDecimal>,
}

/// Summarize test rows
pub fn summarize_fuel_testing(rows: &[FuelTestingDetail]) -> FuelTestingSummary {
    let zero = BigDecimal::from(0);
    let mut total_test_liters = BigDecimal::from(0);
    let mut total_amount = BigDecimal::from(0);
    let mut liters_by_fuel: BTreeMap<String, BigDecimal> = BTreeMap::new();

    for row in rows {
        let liters = coerce::or_zero(row.test_liters.as_ref());
        total_amount += row.amount();
        if liters > zero && !row.fuel_type.is_empty() {
            *liters_by_fuel.entry(row.fuel_type.clone()).or_default() += &liters;
        }
        total_test_liters += liters;
    }

    FuelTestingSummary {
        total_test_liters,
        total_amount,
        liters_by_fuel,
    }
}
