//! In-memory lookups for testing and development

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::traits::*;
use crate::types::*;

type PriceKey = (String, String);

#[derive(Debug, Default)]
struct LookupData {
    /// (petrol_pump, fuel_type) -> effective_from -> price per liter
    prices: HashMap<PriceKey, BTreeMap<NaiveDate, BigDecimal>>,
    stock: HashMap<String, Vec<StockLevel>>,
    /// petrol_pump -> closing date -> cash in hand at close
    closing_cash: HashMap<String, BTreeMap<NaiveDate, BigDecimal>>,
    nozzles: HashMap<String, Vec<ActiveNozzle>>,
}

/// In-memory implementation of every lookup the assembler needs
#[derive(Debug, Clone, Default)]
pub struct MemoryLookups {
    data: Arc<RwLock<LookupData>>,
}

impl MemoryLookups {
    /// Create an empty lookup set
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> ClosingResult<RwLockReadGuard<'_, LookupData>> {
        self.data
            .read()
            .map_err(|_| ClosingError::Lookup("lookup data lock poisoned".to_string()))
    }

    fn write(&self) -> ClosingResult<RwLockWriteGuard<'_, LookupData>> {
        self.data
            .write()
            .map_err(|_| ClosingError::Lookup("lookup data lock poisoned".to_string()))
    }

    /// Record a price that takes effect on `effective_from`
    pub fn set_price(
        &self,
        petrol_pump: &str,
        fuel_type: &str,
        effective_from: NaiveDate,
        price_per_liter: BigDecimal,
    ) -> ClosingResult<()> {
        self.write()?
            .prices
            .entry((petrol_pump.to_string(), fuel_type.to_string()))
            .or_default()
            .insert(effective_from, price_per_liter);
        Ok(())
    }

    /// Add a tank's stock level
    pub fn add_stock(&self, petrol_pump: &str, level: StockLevel) -> ClosingResult<()> {
        self.write()?
            .stock
            .entry(petrol_pump.to_string())
            .or_default()
            .push(level);
        Ok(())
    }

    /// Record the cash in hand at the end of a closed day
    pub fn record_closing_cash(
        &self,
        petrol_pump: &str,
        closing_date: NaiveDate,
        cash_in_hand: BigDecimal,
    ) -> ClosingResult<()> {
        self.write()?
            .closing_cash
            .entry(petrol_pump.to_string())
            .or_default()
            .insert(closing_date, cash_in_hand);
        Ok(())
    }

    /// Register an active nozzle
    pub fn add_nozzle(&self, petrol_pump: &str, nozzle: ActiveNozzle) -> ClosingResult<()> {
        self.write()?
            .nozzles
            .entry(petrol_pump.to_string())
            .or_default()
            .push(nozzle);
        Ok(())
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> ClosingResult<()> {
        *self.write()? = LookupData::default();
        Ok(())
    }
}

#[async_trait]
impl FuelRateLookup for MemoryLookups {
    async fn rate_on(
        &self,
        fuel_type: &str,
        petrol_pump: &str,
        date: NaiveDate,
    ) -> ClosingResult<Option<BigDecimal>> {
        let data = self.read()?;
        let rate = data
            .prices
            .get(&(petrol_pump.to_string(), fuel_type.to_string()))
            .and_then(|history| history.range(..=date).next_back())
            .map(|(_, price)| price.clone());
        Ok(rate)
    }
}

#[async_trait]
impl StockLookup for MemoryLookups {
    async fn stock_levels(&self, petrol_pump: &str) -> ClosingResult<Vec<StockLevel>> {
        Ok(self
            .read()?
            .stock
            .get(petrol_pump)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl PreviousCashLookup for MemoryLookups {
    async fn previous_cash(
        &self,
        petrol_pump: &str,
        date: NaiveDate,
    ) -> ClosingResult<BigDecimal> {
        let data = self.read()?;
        let cash = data
            .closing_cash
            .get(petrol_pump)
            .and_then(|history| history.range(..date).next_back())
            .map(|(_, cash)| cash.clone())
            .unwrap_or_else(|| BigDecimal::from(0));
        Ok(cash)
    }
}

#[async_trait]
impl NozzleDirectory for MemoryLookups {
    async fn active_nozzles(&self, petrol_pump: &str) -> ClosingResult<Vec<ActiveNozzle>> {
        Ok(self
            .read()?
            .nozzles
            .get(petrol_pump)
            .cloned()
            .unwrap_or_default())
    }
}
