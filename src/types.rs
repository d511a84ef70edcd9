//! Core types and data structures for the day-closing calculations

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::traits::AmountRow;
use crate::utils::coerce::{self, lenient};

/// Direction of a cash movement between the till and a bank account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum TransferType {
    /// Cash taken out of the bank into the till
    Withdraw,
    /// Cash taken out of the till into the bank
    Deposit,
    /// Any other value entered on the row, including null; contributes nothing
    #[default]
    Unrecognized,
}

impl<'de> Deserialize<'de> for TransferType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::text::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Withdraw" => TransferType::Withdraw,
            "Deposit" => TransferType::Deposit,
            _ => TransferType::Unrecognized,
        })
    }
}

/// Fuel sold on account and collected later
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditDetail {
    /// Credit customer, if recorded
    #[serde(default)]
    pub customer: Option<String>,
    /// Fuel type dispensed
    #[serde(default, with = "lenient::text")]
    pub fuel_type: String,
    /// Liters dispensed on credit
    #[serde(default, with = "lenient")]
    pub liters: Option<BigDecimal>,
    /// Price per liter
    #[serde(default, with = "lenient")]
    pub rate: Option<BigDecimal>,
    /// Stored line amount (may be stale until recomputed)
    #[serde(default, with = "lenient")]
    pub amount: Option<BigDecimal>,
}

impl CreditDetail {
    /// Create a credit row and compute its amount
    pub fn new(fuel_type: String, liters: BigDecimal, rate: BigDecimal) -> Self {
        let mut row = Self {
            customer: None,
            fuel_type,
            liters: Some(liters),
            rate: Some(rate),
            amount: None,
        };
        row.recompute_amount();
        row
    }

    /// Attach the credit customer
    pub fn with_customer(mut self, customer: String) -> Self {
        self.customer = Some(customer);
        self
    }

    /// Amount this row should carry given its liters and rate
    pub fn computed_amount(&self) -> BigDecimal {
        crate::reconciliation::compute_amount(self.liters.as_ref(), self.rate.as_ref())
    }

    /// Overwrite the stored amount with the computed one
    pub fn recompute_amount(&mut self) {
        self.amount = Some(self.computed_amount());
    }

    /// Liters with missing coerced to zero
    pub fn liters_or_zero(&self) -> BigDecimal {
        coerce::or_zero(self.liters.as_ref())
    }
}

impl AmountRow for CreditDetail {
    fn amount(&self) -> Option<&BigDecimal> {
        self.amount.as_ref()
    }
}

/// Petty expense paid out of the till
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDetail {
    /// Expense account charged
    #[serde(default, with = "lenient::text")]
    pub account: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "lenient")]
    pub amount: Option<BigDecimal>,
}

impl ExpenseDetail {
    pub fn new(account: String, amount: BigDecimal) -> Self {
        Self {
            account,
            description: None,
            amount: Some(amount),
        }
    }
}

impl AmountRow for ExpenseDetail {
    fn amount(&self) -> Option<&BigDecimal> {
        self.amount.as_ref()
    }
}

/// Card / POS settlement collected through a bank terminal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardSaleDetail {
    #[serde(default, with = "lenient::text")]
    pub bank: String,
    #[serde(default, with = "lenient::text")]
    pub bank_account: String,
    #[serde(default, with = "lenient")]
    pub amount: Option<BigDecimal>,
}

impl CardSaleDetail {
    pub fn new(bank: String, bank_account: String, amount: BigDecimal) -> Self {
        Self {
            bank,
            bank_account,
            amount: Some(amount),
        }
    }
}

impl AmountRow for CardSaleDetail {
    fn amount(&self) -> Option<&BigDecimal> {
        self.amount.as_ref()
    }
}

/// Cash received today against earlier credit sales
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditCollectionDetail {
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default, with = "lenient")]
    pub amount: Option<BigDecimal>,
}

impl CreditCollectionDetail {
    pub fn new(amount: BigDecimal) -> Self {
        Self {
            customer: None,
            amount: Some(amount),
        }
    }
}

impl AmountRow for CreditCollectionDetail {
    fn amount(&self) -> Option<&BigDecimal> {
        self.amount.as_ref()
    }
}

/// Cash paid to a supplier from the till
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierPaymentDetail {
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default, with = "lenient")]
    pub amount: Option<BigDecimal>,
}

impl SupplierPaymentDetail {
    pub fn new(amount: BigDecimal) -> Self {
        Self {
            supplier: None,
            amount: Some(amount),
        }
    }
}

impl AmountRow for SupplierPaymentDetail {
    fn amount(&self) -> Option<&BigDecimal> {
        self.amount.as_ref()
    }
}

/// Cash moved between the till and a bank account, independent of sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundTransferDetail {
    #[serde(default)]
    pub transfer_type: TransferType,
    #[serde(default, with = "lenient::text")]
    pub bank: String,
    #[serde(default, with = "lenient::text")]
    pub bank_account: String,
    #[serde(default, with = "lenient")]
    pub amount: Option<BigDecimal>,
}

impl FundTransferDetail {
    pub fn new(transfer_type: TransferType, amount: BigDecimal) -> Self {
        Self {
            transfer_type,
            bank: String::new(),
            bank_account: String::new(),
            amount: Some(amount),
        }
    }

    /// Withdraw from the bank into the till
    pub fn withdraw(amount: BigDecimal) -> Self {
        Self::new(TransferType::Withdraw, amount)
    }

    /// Deposit from the till into the bank
    pub fn deposit(amount: BigDecimal) -> Self {
        Self::new(TransferType::Deposit, amount)
    }
}

impl AmountRow for FundTransferDetail {
    fn amount(&self) -> Option<&BigDecimal> {
        self.amount.as_ref()
    }
}

/// Opening and closing meter values for one nozzle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NozzleReading {
    #[serde(default, with = "lenient::text")]
    pub nozzle: String,
    #[serde(default, with = "lenient::text")]
    pub fuel_type: String,
    #[serde(default, with = "lenient")]
    pub previous_reading: Option<BigDecimal>,
    #[serde(default, with = "lenient")]
    pub current_reading: Option<BigDecimal>,
    /// Price per liter; filled from the rate lookup when missing
    #[serde(default, with = "lenient")]
    pub rate: Option<BigDecimal>,
}

impl NozzleReading {
    /// Create a reading row
    pub fn new(
        nozzle: String,
        fuel_type: String,
        previous_reading: BigDecimal,
        current_reading: BigDecimal,
        rate: Option<BigDecimal>,
    ) -> Self {
        Self {
            nozzle,
            fuel_type,
            previous_reading: Some(previous_reading),
            current_reading: Some(current_reading),
            rate,
        }
    }

    /// Meter difference; negative when the meter was entered backwards
    pub fn dispensed_liters(&self) -> BigDecimal {
        coerce::or_zero(self.current_reading.as_ref())
            - coerce::or_zero(self.previous_reading.as_ref())
    }

    /// Sales value of the dispensed fuel
    pub fn amount(&self) -> BigDecimal {
        crate::reconciliation::compute_amount(Some(&self.dispensed_liters()), self.rate.as_ref())
    }

    /// Whether a rate greater than zero has been set
    pub fn has_rate(&self) -> bool {
        self.rate
            .as_ref()
            .is_some_and(|rate| *rate > BigDecimal::from(0))
    }
}

/// Fuel drawn from a nozzle for a calibration test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelTestingDetail {
    #[serde(default, with = "lenient::text")]
    pub nozzle: String,
    #[serde(default, with = "lenient::text")]
    pub fuel_type: String,
    #[serde(default, with = "lenient")]
    pub test_liters: Option<BigDecimal>,
    #[serde(default, with = "lenient")]
    pub rate: Option<BigDecimal>,
}

impl FuelTestingDetail {
    pub fn new(nozzle: String, fuel_type: String, test_liters: BigDecimal) -> Self {
        Self {
            nozzle,
            fuel_type,
            test_liters: Some(test_liters),
            rate: None,
        }
    }

    pub fn with_rate(mut self, rate: BigDecimal) -> Self {
        self.rate = Some(rate);
        self
    }

    /// Value of the fuel used for the test
    pub fn amount(&self) -> BigDecimal {
        crate::reconciliation::compute_amount(self.test_liters.as_ref(), self.rate.as_ref())
    }
}

/// Quantity held in one tank's warehouse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    #[serde(default, with = "lenient::text")]
    pub tank: String,
    #[serde(default, with = "lenient::text")]
    pub fuel_type: String,
    #[serde(default, with = "lenient::text")]
    pub warehouse: String,
    #[serde(default, with = "lenient::zero_if_missing")]
    pub quantity: BigDecimal,
}

impl StockLevel {
    pub fn new(tank: String, fuel_type: String, warehouse: String, quantity: BigDecimal) -> Self {
        Self {
            tank,
            fuel_type,
            warehouse,
            quantity,
        }
    }
}

/// Active nozzle with the last meter value recorded against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveNozzle {
    #[serde(default, with = "lenient::text")]
    pub nozzle: String,
    #[serde(default, with = "lenient::text")]
    pub fuel_type: String,
    #[serde(default, with = "lenient")]
    pub last_reading: Option<BigDecimal>,
}

/// Immutable set of values for one day's closing, assembled by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayClosingSnapshot {
    #[serde(default, with = "lenient::text")]
    pub petrol_pump: String,
    #[serde(default)]
    pub closing_date: Option<NaiveDate>,
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
    /// Closing cash carried over from the previous day
    #[serde(default, with = "lenient::zero_if_missing")]
    pub previous_cash: BigDecimal,
    /// Value of all fuel sold today, cash and credit combined
    #[serde(default, with = "lenient::zero_if_missing")]
    pub total_sales: BigDecimal,
    /// Cash actually counted in the till (variance-based closing only)
    #[serde(default, with = "lenient")]
    pub cash_amount: Option<BigDecimal>,
}

impl DayClosingSnapshot {
    /// Create an empty snapshot for a pump and date
    pub fn new(petrol_pump: String, closing_date: NaiveDate) -> Self {
        Self {
            petrol_pump,
            closing_date: Some(closing_date),
            ..Self::default()
        }
    }
}

/// Errors raised by the validation pass, the lookups and configuration
#[derive(Debug, thiserror::Error)]
pub enum ClosingError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Price is missing or zero for {fuel_type} on nozzle {nozzle}")]
    MissingRate { nozzle: String, fuel_type: String },
    #[error("Insufficient stock for {fuel_type}: available {available}, required {required}")]
    InsufficientStock {
        fuel_type: String,
        available: BigDecimal,
        required: BigDecimal,
    },
    #[error("Credit liters for {fuel_type} ({credit_liters}) exceed dispensed liters ({dispensed_liters})")]
    CreditExceedsDispensed {
        fuel_type: String,
        credit_liters: BigDecimal,
        dispensed_liters: BigDecimal,
    },
    #[error("Credit sale recorded for {0} but no nozzle readings exist for that fuel type")]
    CreditWithoutSales(String),
    #[error("Credit and card collections ({collections}) exceed total sales ({total_sales})")]
    CollectionsExceedSales {
        collections: BigDecimal,
        total_sales: BigDecimal,
    },
    #[error("Lookup error: {0}")]
    Lookup(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for day-closing operations
pub type ClosingResult<T> = Result<T, ClosingError>;
