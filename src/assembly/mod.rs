//! Snapshot assembly from host lookups
//!
//! The engine only ever sees a finished [`DayClosingSnapshot`]. This module
//! is the caller side: it seeds nozzle rows, fills in missing rates, derives
//! total sales and fetches yesterday's cash before the snapshot is frozen.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::reconciliation::compute_sales_totals;
use crate::traits::*;
use crate::types::*;
use crate::utils::coerce::lenient;
use crate::utils::validation::validate_for_submit;

/// A day closing as entered, before lookups have filled the gaps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayClosingDraft {
    pub petrol_pump: String,
    pub closing_date: NaiveDate,
    #[serde(default)]
    pub nozzle_readings: Vec<NozzleReading>,
    #[serde(default)]
    pub credit_details: Vec<CreditDetail>,
    #[serde(default)]
    pub expenses: Vec<ExpenseDetail>,
    #[serde(default)]
    pub card_sales: Vec<CardSaleDetail>,
    #[serde(default)]
    pub credit_collections: Vec<CreditCollectionDetail>,
    #[serde(default)]
    pub supplier_payments: Vec<SupplierPaymentDetail>,
    #[serde(default)]
    pub fund_transfers: Vec<FundTransferDetail>,
    /// Overrides the previous-cash lookup when set
    #[serde(default, with = "lenient")]
    pub previous_cash: Option<BigDecimal>,
    #[serde(default, with = "lenient")]
    pub cash_amount: Option<BigDecimal>,
}

impl DayClosingDraft {
    /// Create an empty draft
    pub fn new(petrol_pump: String, closing_date: NaiveDate) -> Self {
        Self {
            petrol_pump,
            closing_date,
            nozzle_readings: Vec::new(),
            credit_details: Vec::new(),
            expenses: Vec::new(),
            card_sales: Vec::new(),
            credit_collections: Vec::new(),
            supplier_payments: Vec::new(),
            fund_transfers: Vec::new(),
            previous_cash: None,
            cash_amount: None,
        }
    }
}

fn missing_rate(rate: Option<&BigDecimal>) -> bool {
    rate.is_none_or(|rate| *rate <= BigDecimal::from(0))
}

/// Builds snapshots using the host's lookups
pub struct SnapshotAssembler<L: ClosingLookups> {
    lookups: L,
}

impl<L: ClosingLookups> SnapshotAssembler<L> {
    /// Create a new assembler
    pub fn new(lookups: L) -> Self {
        Self { lookups }
    }

    /// Access the underlying lookups
    pub fn lookups(&self) -> &L {
        &self.lookups
    }

    /// One reading row per active nozzle, opening at its last meter value
    /// and priced for the closing date
    pub async fn seed_nozzle_readings(
        &self,
        petrol_pump: &str,
        closing_date: NaiveDate,
    ) -> ClosingResult<Vec<NozzleReading>> {
        let nozzles = self.lookups.active_nozzles(petrol_pump).await?;
        let mut readings = Vec::with_capacity(nozzles.len());
        for nozzle in nozzles {
            let rate = self
                .lookups
                .rate_on(&nozzle.fuel_type, petrol_pump, closing_date)
                .await?;
            readings.push(NozzleReading {
                nozzle: nozzle.nozzle,
                fuel_type: nozzle.fuel_type,
                previous_reading: nozzle.last_reading,
                current_reading: None,
                rate,
            });
        }
        Ok(readings)
    }

    /// Fill gaps in a draft and freeze it into a snapshot
    pub async fn assemble(&self, draft: DayClosingDraft) -> ClosingResult<DayClosingSnapshot> {
        let DayClosingDraft {
            petrol_pump,
            closing_date,
            mut nozzle_readings,
            mut credit_details,
            expenses,
            card_sales,
            credit_collections,
            supplier_payments,
            fund_transfers,
            previous_cash,
            cash_amount,
        } = draft;

        for reading in nozzle_readings.iter_mut() {
            if missing_rate(reading.rate.as_ref()) && !reading.fuel_type.is_empty() {
                reading.rate = self
                    .lookups
                    .rate_on(&reading.fuel_type, &petrol_pump, closing_date)
                    .await?;
            }
        }

        for row in credit_details.iter_mut() {
            if missing_rate(row.rate.as_ref()) && !row.fuel_type.is_empty() {
                row.rate = self
                    .lookups
                    .rate_on(&row.fuel_type, &petrol_pump, closing_date)
                    .await?;
            }
            row.recompute_amount();
        }

        let previous_cash = match previous_cash {
            Some(cash) => cash,
            None => {
                self.lookups
                    .previous_cash(&petrol_pump, closing_date)
                    .await?
            }
        };

        let sales = compute_sales_totals(&nozzle_readings);
        tracing::debug!(
            petrol_pump = %petrol_pump,
            closing_date = %closing_date,
            total_liters = %sales.total_liters,
            total_sales = %sales.total_sales,
            previous_cash = %previous_cash,
            "Assembled day closing snapshot"
        );

        Ok(DayClosingSnapshot {
            petrol_pump,
            closing_date: Some(closing_date),
            nozzle_readings,
            credit_details,
            expenses,
            card_sales,
            credit_collections,
            supplier_payments,
            fund_transfers,
            previous_cash,
            total_sales: sales.total_sales,
            cash_amount,
        })
    }

    /// Assemble a draft and run the submit-time checks against current stock
    pub async fn assemble_for_submit(
        &self,
        draft: DayClosingDraft,
    ) -> ClosingResult<DayClosingSnapshot> {
        let snapshot = self.assemble(draft).await?;
        let stock = self.lookups.stock_levels(&snapshot.petrol_pump).await?;
        validate_for_submit(&snapshot, &stock)?;
        Ok(snapshot)
    }
}
