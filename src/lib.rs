//! # Fuel Closing Core
//!
//! End-of-day calculations for a fuel station: cash reconciliation, nozzle
//! sales and fuel testing.
//!
//! ## Features
//!
//! - **Cash reconciliation**: effect-based and variance-based closing policies behind one engine
//! - **Credit sales**: liters and amounts recomputed from rate so stale rows never leak into totals
//! - **Nozzle sales**: dispensed liters and sales value from meter readings
//! - **Fuel testing**: valuation of fuel drawn for calibration tests
//! - **Nozzle meters**: last readings moved forward and back as closings and tests are submitted or cancelled
//! - **Dip readings**: measured tank levels compared with system stock
//! - **Submit validation**: price, stock and credit checks run before the engine
//! - **Lookup abstraction**: rate, stock, previous-cash and nozzle lookups behind async traits
//!
//! ## Quick Start
//!
//! ```rust
//! use fuel_closing_core::{
//!     CardSaleDetail, DayClosingSnapshot, ReconciliationEngine, ReconciliationStrategy,
//! };
//! use bigdecimal::BigDecimal;
//!
//! let mut snapshot = DayClosingSnapshot::default();
//! snapshot.total_sales = BigDecimal::from(1000);
//! snapshot.previous_cash = BigDecimal::from(500);
//! snapshot.card_sales.push(CardSaleDetail::new(
//!     "HDFC".to_string(),
//!     "HDFC-001".to_string(),
//!     BigDecimal::from(100),
//! ));
//!
//! let engine = ReconciliationEngine::with_strategy(ReconciliationStrategy::EffectBased);
//! let result = engine.compute_cash_reconciliation(&snapshot);
//! let closing = result.as_effect_based().unwrap();
//! assert_eq!(closing.cash_in_hand, BigDecimal::from(1400));
//! ```

pub mod assembly;
pub mod fuel_testing;
pub mod nozzles;
pub mod reconciliation;
pub mod stock;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use assembly::*;
pub use fuel_testing::*;
pub use nozzles::*;
pub use reconciliation::*;
pub use stock::*;
pub use traits::*;
pub use types::*;
