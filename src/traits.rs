//! Traits for row abstraction and the caller-side lookups

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// A detail row that carries a money amount
///
/// Lets one summing routine serve every child table of a closing.
pub trait AmountRow {
    /// Stored amount, `None` when the row has not been filled in
    fn amount(&self) -> Option<&BigDecimal>;
}

impl<T: AmountRow + ?Sized> AmountRow for &T {
    fn amount(&self) -> Option<&BigDecimal> {
        (**self).amount()
    }
}

/// Price-per-liter lookup
///
/// Prices are effective-dated: the most recent price whose
/// `effective_from` is on or before `date` wins.
#[async_trait]
pub trait FuelRateLookup: Send + Sync {
    /// Get the price per liter, `None` when no price is in effect
    async fn rate_on(
        &self,
        fuel_type: &str,
        petrol_pump: &str,
        date: NaiveDate,
    ) -> ClosingResult<Option<BigDecimal>>;
}

/// Stock held in the tanks of a petrol pump
#[async_trait]
pub trait StockLookup: Send + Sync {
    /// List stock per tank for the pump
    async fn stock_levels(&self, petrol_pump: &str) -> ClosingResult<Vec<StockLevel>>;
}

/// Closing cash of the day before a given date
#[async_trait]
pub trait PreviousCashLookup: Send + Sync {
    /// Get the cash carried into `date`, zero when there is no earlier closing
    async fn previous_cash(&self, petrol_pump: &str, date: NaiveDate)
        -> ClosingResult<BigDecimal>;
}

/// Directory of the pump's active nozzles
#[async_trait]
pub trait NozzleDirectory: Send + Sync {
    /// List active nozzles with their last recorded meter value
    async fn active_nozzles(&self, petrol_pump: &str) -> ClosingResult<Vec<ActiveNozzle>>;
}

/// Everything the snapshot assembler needs from the host system
pub trait ClosingLookups: FuelRateLookup + StockLookup + PreviousCashLookup + NozzleDirectory {}

impl<T> ClosingLookups for T where
    T: FuelRateLookup + StockLookup + PreviousCashLookup + NozzleDirectory
{
}
