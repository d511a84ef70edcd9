//! Day closing example

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use fuel_closing_core::utils::MemoryLookups;
use fuel_closing_core::{
    ActiveNozzle, CardSaleDetail, CreditDetail, DayClosingDraft, ExpenseDetail,
    ReconciliationConfig, ReconciliationEngine, ReconciliationResult, ReconciliationStrategy,
    SnapshotAssembler, StockLevel,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("⛽ Fuel Closing Core - Day Closing Example\n");

    let pump = "PUMP-01";
    let date = NaiveDate::from_ymd_opt(2024, 3, 15).ok_or("invalid date")?;

    // 1. Host data the closing depends on
    let lookups = MemoryLookups::new();
    let price_date = NaiveDate::from_ymd_opt(2024, 3, 1).ok_or("invalid date")?;
    lookups.set_price(pump, "Petrol", price_date, BigDecimal::from(102))?;
    lookups.set_price(pump, "Diesel", price_date, BigDecimal::from(90))?;
    lookups.add_nozzle(
        pump,
        ActiveNozzle {
            nozzle: "N1".to_string(),
            fuel_type: "Petrol".to_string(),
            last_reading: Some(BigDecimal::from(12000)),
        },
    )?;
    lookups.add_nozzle(
        pump,
        ActiveNozzle {
            nozzle: "N2".to_string(),
            fuel_type: "Diesel".to_string(),
            last_reading: Some(BigDecimal::from(8000)),
        },
    )?;
    lookups.add_stock(
        pump,
        StockLevel::new(
            "Tank 1".to_string(),
            "Petrol".to_string(),
            "Petrol WH".to_string(),
            BigDecimal::from(6000),
        ),
    )?;
    lookups.add_stock(
        pump,
        StockLevel::new(
            "Tank 2".to_string(),
            "Diesel".to_string(),
            "Diesel WH".to_string(),
            BigDecimal::from(9000),
        ),
    )?;
    lookups.record_closing_cash(
        pump,
        NaiveDate::from_ymd_opt(2024, 3, 14).ok_or("invalid date")?,
        BigDecimal::from(4200),
    )?;

    let assembler = SnapshotAssembler::new(lookups);

    // 2. Seed nozzle rows and enter today's meter values
    println!("📟 Nozzle readings:");
    let mut readings = assembler.seed_nozzle_readings(pump, date).await?;
    readings[0].current_reading = Some(BigDecimal::from(12450));
    readings[1].current_reading = Some(BigDecimal::from(8320));
    for reading in &readings {
        println!(
            "  {} ({}): {} L @ ₹{} = ₹{}",
            reading.nozzle,
            reading.fuel_type,
            reading.dispensed_liters(),
            reading.rate.clone().unwrap_or_default(),
            reading.amount()
        );
    }
    println!();

    let mut draft = DayClosingDraft::new(pump.to_string(), date);
    draft.nozzle_readings = readings;
    draft.credit_details.push(
        CreditDetail::new("Diesel".to_string(), BigDecimal::from(60), BigDecimal::from(90))
            .with_customer("City Transport".to_string()),
    );
    draft.card_sales.push(CardSaleDetail::new(
        "HDFC".to_string(),
        "HDFC-POS".to_string(),
        BigDecimal::from(12500),
    ));
    draft.expenses.push(ExpenseDetail::new(
        "Indirect Expenses - Tea".to_string(),
        BigDecimal::from(240),
    ));
    draft.cash_amount = Some(BigDecimal::from(52000));

    let snapshot = assembler.assemble_for_submit(draft).await?;

    // 3. Reconcile with both policies
    for strategy in [
        ReconciliationStrategy::EffectBased,
        ReconciliationStrategy::VarianceBased,
    ] {
        let engine = ReconciliationEngine::new(ReconciliationConfig::new(strategy).with_currency_scale(2))?;
        match engine.compute_cash_reconciliation(&snapshot) {
            ReconciliationResult::EffectBased(r) => {
                println!("💰 Effect-based closing:");
                println!("  Total Sales:   ₹{}", r.total_sales);
                println!("  Credit Sales:  ₹{}", r.totals.credit_amount);
                println!("  Card/POS:      ₹{}", r.totals.card_amount);
                println!("  Expenses:      ₹{}", r.totals.total_expenses);
                println!("  Cash Amount:   ₹{}", r.cash_amount);
                println!("  Previous Cash: ₹{}", r.previous_cash);
                println!("  Cash in Hand:  ₹{}", r.cash_in_hand);
            }
            ReconciliationResult::VarianceBased(r) => {
                println!("🧮 Variance-based closing:");
                println!("  Payments Received:   ₹{}", r.total_payments_received);
                println!("  Expected Collection: ₹{}", r.expected_collection);
                println!("  Variance:            ₹{} ({:?})", r.cash_variance, r.variance_kind());
                println!("  Severity:            {:?} ({}%)", r.severity, r.variance_pct);
            }
        }
        println!();
    }

    Ok(())
}
