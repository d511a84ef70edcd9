//! Submit-time validation
//!
//! These checks run before the engine when a closing is about to be
//! finalized. The engine itself never rejects input.

use bigdecimal::BigDecimal;
use std::collections::BTreeMap;

use crate::fuel_testing::summarize_fuel_testing;
use crate::reconciliation::{compute_credit_totals, sales_by_fuel, sum_amounts};
use crate::types::*;
use crate::utils::coerce;

/// Every reading that dispensed fuel must carry a rate above zero
pub fn validate_prices(readings: &[NozzleReading]) -> ClosingResult<()> {
    let zero = BigDecimal::from(0);
    for reading in readings {
        if reading.dispensed_liters() > zero && !reading.has_rate() {
            return Err(ClosingError::MissingRate {
                nozzle: reading.nozzle.clone(),
                fuel_type: reading.fuel_type.clone(),
            });
        }
    }
    Ok(())
}

fn available_by_fuel(stock: &[StockLevel]) -> BTreeMap<&str, BigDecimal> {
    let mut available: BTreeMap<&str, BigDecimal> = BTreeMap::new();
    for level in stock {
        if level.warehouse.trim().is_empty() {
            continue;
        }
        *available.entry(level.fuel_type.as_str()).or_default() += &level.quantity;
    }
    available
}

/// Issuing today's dispensed fuel must leave every fuel type with stock
/// strictly above zero
pub fn validate_stock_availability(
    readings: &[NozzleReading],
    stock: &[StockLevel],
) -> ClosingResult<()> {
    let zero = BigDecimal::from(0);
    let available = available_by_fuel(stock);

    for (fuel_type, sales) in sales_by_fuel(readings) {
        let on_hand = available
            .get(fuel_type.as_str())
            .cloned()
            .unwrap_or_else(|| BigDecimal::from(0));
        if &on_hand - &sales.liters <= zero {
            return Err(ClosingError::InsufficientStock {
                fuel_type,
                available: on_hand,
                required: sales.liters,
            });
        }
    }
    Ok(())
}

/// Credit sales must be covered by what the nozzles dispensed
///
/// Per fuel type, credit liters may not exceed dispensed liters, and a
/// credit fuel type needs at least one reading. Credit plus card may not
/// exceed total sales when anything was sold.
pub fn validate_credit_sales(
    readings: &[NozzleReading],
    credit_details: &[CreditDetail],
    card_amount: &BigDecimal,
) -> ClosingResult<()> {
    let zero = BigDecimal::from(0);
    let sales = sales_by_fuel(readings);

    let mut credit_liters: BTreeMap<&str, BigDecimal> = BTreeMap::new();
    for row in credit_details {
        let liters = row.liters_or_zero();
        if row.fuel_type.is_empty() || liters <= zero {
            continue;
        }
        *credit_liters.entry(row.fuel_type.as_str()).or_default() += liters;
    }

    for (fuel_type, liters) in credit_liters {
        let dispensed = sales
            .get(fuel_type)
            .ok_or_else(|| ClosingError::CreditWithoutSales(fuel_type.to_string()))?;
        if liters > dispensed.liters {
            return Err(ClosingError::CreditExceedsDispensed {
                fuel_type: fuel_type.to_string(),
                credit_liters: liters,
                dispensed_liters: dispensed.liters.clone(),
            });
        }
    }

    let total_sales: BigDecimal = sales.values().map(|s| &s.amount).sum();
    let collections = compute_credit_totals(credit_details).total_amount + card_amount;
    if total_sales > zero && collections > total_sales {
        return Err(ClosingError::CollectionsExceedSales {
            collections,
            total_sales,
        });
    }
    Ok(())
}

/// Run all closing checks in submit order
pub fn validate_for_submit(snapshot: &DayClosingSnapshot, stock: &[StockLevel]) -> ClosingResult<()> {
    validate_prices(&snapshot.nozzle_readings)?;
    validate_stock_availability(&snapshot.nozzle_readings, stock)?;
    validate_credit_sales(
        &snapshot.nozzle_readings,
        &snapshot.credit_details,
        &sum_amounts(&snapshot.card_sales),
    )?;
    tracing::debug!(
        petrol_pump = %snapshot.petrol_pump,
        readings = snapshot.nozzle_readings.len(),
        "Day closing passed submit validation"
    );
    Ok(())
}

/// Every test row must draw a positive quantity
pub fn validate_test_liters(rows: &[FuelTestingDetail]) -> ClosingResult<()> {
    let zero = BigDecimal::from(0);
    for row in rows {
        if coerce::or_zero(row.test_liters.as_ref()) <= zero {
            return Err(ClosingError::Validation(format!(
                "Test liters must be greater than zero for nozzle {}",
                row.nozzle
            )));
        }
    }
    Ok(())
}

/// Stock must cover the fuel drawn for testing
///
/// Stock is pooled across every tank of a fuel type that has a warehouse,
/// the same way the closing stock check counts it.
pub fn validate_testing_stock(rows: &[FuelTestingDetail], stock: &[StockLevel]) -> ClosingResult<()> {
    let available = available_by_fuel(stock);
    for (fuel_type, required) in summarize_fuel_testing(rows).liters_by_fuel {
        let on_hand = available.get(fuel_type.as_str()).ok_or_else(|| {
            ClosingError::Validation(format!("No fuel tank with a warehouse found for {fuel_type}"))
        })?;
        if *on_hand < required {
            return Err(ClosingError::InsufficientStock {
                fuel_type,
                available: on_hand.clone(),
                required,
            });
        }
    }
    Ok(())
}
