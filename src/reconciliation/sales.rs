//! Fuel sales derived from nozzle meter readings

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{CreditDetail, NozzleReading};

/// Liters and value sold across all nozzles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTotals {
    pub total_liters: BigDecimal,
    pub total_sales: BigDecimal,
}

/// Liters and value sold for one fuel type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelSales {
    pub liters: BigDecimal,
    pub amount: BigDecimal,
}

/// Sum dispensed liters and sales value over all readings
///
/// Liters are the raw meter differences; a reading entered backwards lowers
/// the liter total but adds nothing to sales.
pub fn compute_sales_totals(readings: &[NozzleReading]) -> SalesTotals {
    SalesTotals {
        total_liters: readings.iter().map(NozzleReading::dispensed_liters).sum(),
        total_sales: readings.iter().map(NozzleReading::amount).sum(),
    }
}

/// Group positive dispensing by fuel type
pub fn sales_by_fuel(readings: &[NozzleReading]) -> BTreeMap<String, FuelSales> {
    let zero = BigDecimal::from(0);
    let mut by_fuel: BTreeMap<String, FuelSales> = BTreeMap::new();
    for reading in readings {
        let liters = reading.dispensed_liters();
        if liters <= zero || reading.fuel_type.is_empty() {
            continue;
        }
        let entry = by_fuel.entry(reading.fuel_type.clone()).or_default();
        entry.amount += reading.amount();
        entry.liters += liters;
    }
    by_fuel
}

/// Cash portion of each fuel type's sales
///
/// Nozzle readings cover cash and credit together, so each fuel type's
/// credit liters and recomputed credit amount are taken back out. Credit on
/// a fuel type with no positive dispensing has nothing to net against and is
/// left out.
pub fn cash_sales_by_fuel(
    readings: &[NozzleReading],
    credit_details: &[CreditDetail],
) -> BTreeMap<String, FuelSales> {
    let zero = BigDecimal::from(0);
    let mut by_fuel = sales_by_fuel(readings);
    for row in credit_details {
        let liters = row.liters_or_zero();
        if liters <= zero {
            continue;
        }
        if let Some(entry) = by_fuel.get_mut(&row.fuel_type) {
            entry.liters -= liters;
            entry.amount -= row.computed_amount();
        }
    }
    by_fuel
}
