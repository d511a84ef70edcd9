//! Physical dip readings against system stock

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::StockLevel;
use crate::utils::coerce::{self, lenient};

/// Smallest difference, in liters, that calls for a stock adjustment
pub fn default_dip_tolerance() -> BigDecimal {
    BigDecimal::new(1.into(), 1)
}

/// Dip measured in one tank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DipReading {
    #[serde(default, with = "lenient::text")]
    pub fuel_tank: String,
    #[serde(default, with = "lenient")]
    pub measured_dip: Option<BigDecimal>,
}

/// Outcome of comparing a dip with the books
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DipVariance {
    pub measured_dip: BigDecimal,
    pub system_stock: BigDecimal,
    /// Measured minus system; negative means fuel is missing from the tank
    pub difference: BigDecimal,
    pub needs_adjustment: bool,
}

/// Compare a measured dip with system stock
///
/// An adjustment is needed once the absolute difference reaches `tolerance`.
pub fn assess_dip(
    measured_dip: Option<&BigDecimal>,
    system_stock: Option<&BigDecimal>,
    tolerance: &BigDecimal,
) -> DipVariance {
    let measured_dip = coerce::or_zero(measured_dip);
    let system_stock = coerce::or_zero(system_stock);
    let difference = &measured_dip - &system_stock;
    let needs_adjustment = difference.abs() >= *tolerance;
    DipVariance {
        measured_dip,
        system_stock,
        difference,
        needs_adjustment,
    }
}

/// Assess a dip reading against the stock held in its tank
///
/// A tank without a warehouse, or missing from `stock`, holds zero on the
/// books.
pub fn assess_dip_reading(
    reading: &DipReading,
    stock: &[StockLevel],
    tolerance: &BigDecimal,
) -> DipVariance {
    let system_stock = stock
        .iter()
        .find(|level| level.tank == reading.fuel_tank && !level.warehouse.trim().is_empty())
        .map(|level| &level.quantity);
    let variance = assess_dip(reading.measured_dip.as_ref(), system_stock, tolerance);
    if variance.needs_adjustment {
        tracing::debug!(
            fuel_tank = %reading.fuel_tank,
            difference = %variance.difference,
            "Dip reading differs from system stock"
        );
    }
    variance
}
