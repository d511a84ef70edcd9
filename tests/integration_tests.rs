//! Integration tests for fuel-closing-core

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use fuel_closing_core::{
    apply_closing_readings, apply_fuel_testing, assess_dip_reading, cash_sales_by_fuel,
    default_dip_tolerance, sum_amounts,
    utils::{validate_testing_stock, MemoryLookups},
    ActiveNozzle, CardSaleDetail, CashVarianceKind, ClosingError, CreditDetail, DayClosingDraft,
    DayClosingSnapshot, DipReading, ExpenseDetail, FuelTestingDetail, FundTransferDetail,
    NozzleDirectory, ReconciliationConfig, ReconciliationEngine, ReconciliationResult,
    ReconciliationStrategy, SnapshotAssembler, StockLevel, StockLookup, SupplierPaymentDetail,
    TransferType, VarianceSeverity,
};
use std::str::FromStr;

fn dec(raw: &str) -> BigDecimal {
    BigDecimal::from_str(raw).unwrap()
}

fn closing_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn seeded_lookups() -> MemoryLookups {
    let lookups = MemoryLookups::new();
    let pump = "PUMP-01";

    lookups
        .set_price(pump, "Petrol", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec("100"))
        .unwrap();
    lookups
        .set_price(pump, "Petrol", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), dec("102"))
        .unwrap();
    lookups
        .set_price(pump, "Diesel", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), dec("90"))
        .unwrap();
    lookups
        .set_price(pump, "Diesel", NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), dec("95"))
        .unwrap();

    for (nozzle, fuel, last) in [("N1", "Petrol", "1000"), ("N2", "Diesel", "5000")] {
        lookups
            .add_nozzle(
                pump,
                ActiveNozzle {
                    nozzle: nozzle.to_string(),
                    fuel_type: fuel.to_string(),
                    last_reading: Some(dec(last)),
                },
            )
            .unwrap();
    }

    lookups
        .add_stock(
            pump,
            StockLevel::new(
                "Tank-P".to_string(),
                "Petrol".to_string(),
                "Petrol WH".to_string(),
                dec("3000"),
            ),
        )
        .unwrap();
    lookups
        .add_stock(
            pump,
            StockLevel::new(
                "Tank-D".to_string(),
                "Diesel".to_string(),
                "Diesel WH".to_string(),
                dec("4000"),
            ),
        )
        .unwrap();

    lookups
        .record_closing_cash(pump, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(), dec("2500"))
        .unwrap();

    lookups
}

#[tokio::test]
async fn test_complete_day_closing_workflow() {
    let assembler = SnapshotAssembler::new(seeded_lookups());

    // Seed readings from the nozzle directory
    let mut readings = assembler
        .seed_nozzle_readings("PUMP-01", closing_date())
        .await
        .unwrap();
    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].rate, Some(dec("102")));
    assert_eq!(readings[1].rate, Some(dec("90")));
    assert_eq!(readings[0].previous_reading, Some(dec("1000")));

    // Attendant enters closing meter values
    readings[0].current_reading = Some(dec("1200"));
    readings[1].current_reading = Some(dec("5100"));

    let mut draft = DayClosingDraft::new("PUMP-01".to_string(), closing_date());
    draft.nozzle_readings = readings;
    draft.credit_details = vec![CreditDetail {
        customer: Some("City Transport".to_string()),
        fuel_type: "Diesel".to_string(),
        liters: Some(dec("20")),
        rate: None,
        amount: None,
    }];
    draft.card_sales = vec![CardSaleDetail::new(
        "HDFC".to_string(),
        "HDFC-POS".to_string(),
        dec("5000"),
    )];
    draft.expenses = vec![ExpenseDetail::new("Tea and snacks".to_string(), dec("150"))];
    draft.supplier_payments = vec![SupplierPaymentDetail::new(dec("1000"))];
    draft.fund_transfers = vec![FundTransferDetail::deposit(dec("10000"))];

    let snapshot = assembler.assemble_for_submit(draft).await.unwrap();

    // 200 L petrol at 102 + 100 L diesel at 90
    assert_eq!(snapshot.total_sales, dec("29400"));
    assert_eq!(snapshot.previous_cash, dec("2500"));
    assert_eq!(snapshot.credit_details[0].rate, Some(dec("90")));
    assert_eq!(snapshot.credit_details[0].amount, Some(dec("1800")));

    let engine = ReconciliationEngine::with_strategy(ReconciliationStrategy::EffectBased);
    let result = engine.compute_cash_reconciliation(&snapshot);
    let closing = result.as_effect_based().unwrap();

    // 29400 - 1800 - 5000 - 150 - 1000 + 0 - 10000
    assert_eq!(closing.cash_amount, dec("11450"));
    assert_eq!(closing.cash_in_hand, dec("13950"));
    assert_eq!(result.totals().credit_liters, dec("20"));
    assert_eq!(result.totals().total_fund_transfer_effect, dec("-10000"));
}

#[tokio::test]
async fn test_submit_rejects_credit_above_dispensed() {
    let assembler = SnapshotAssembler::new(seeded_lookups());

    let mut draft = DayClosingDraft::new("PUMP-01".to_string(), closing_date());
    let mut readings = assembler
        .seed_nozzle_readings("PUMP-01", closing_date())
        .await
        .unwrap();
    readings[0].current_reading = Some(dec("1010"));
    readings[1].current_reading = Some(dec("5000"));
    draft.nozzle_readings = readings;
    draft.credit_details = vec![CreditDetail::new("Petrol".to_string(), dec("15"), dec("102"))];

    let err = assembler.assemble_for_submit(draft).await.unwrap_err();
    assert!(matches!(err, ClosingError::CreditExceedsDispensed { .. }));
}

#[tokio::test]
async fn test_submit_rejects_depleting_stock() {
    let assembler = SnapshotAssembler::new(seeded_lookups());

    let mut draft = DayClosingDraft::new("PUMP-01".to_string(), closing_date());
    let mut readings = assembler
        .seed_nozzle_readings("PUMP-01", closing_date())
        .await
        .unwrap();
    readings[0].current_reading = Some(dec("4000"));
    draft.nozzle_readings = readings;

    let err = assembler.assemble_for_submit(draft).await.unwrap_err();
    match err {
        ClosingError::InsufficientStock {
            fuel_type,
            available,
            required,
        } => {
            assert_eq!(fuel_type, "Petrol");
            assert_eq!(available, dec("3000"));
            assert_eq!(required, dec("3000"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_explicit_previous_cash_skips_lookup() {
    let assembler = SnapshotAssembler::new(seeded_lookups());
    let mut draft = DayClosingDraft::new("PUMP-01".to_string(), closing_date());
    draft.previous_cash = Some(dec("75"));

    let snapshot = assembler.assemble(draft).await.unwrap();
    assert_eq!(snapshot.previous_cash, dec("75"));
    assert_eq!(snapshot.total_sales, dec("0"));
}

#[test]
fn test_variance_closing_from_json() {
    let config: ReconciliationConfig =
        serde_json::from_str(r#"{ "strategy": "variance_based", "currency_scale": 2 }"#).unwrap();
    let engine = ReconciliationEngine::new(config).unwrap();
    assert_eq!(engine.strategy(), ReconciliationStrategy::VarianceBased);

    let snapshot: DayClosingSnapshot = serde_json::from_str(
        r#"{
            "petrol_pump": "PUMP-02",
            "closing_date": "2024-03-15",
            "previous_cash": "500",
            "total_sales": 1000,
            "cash_amount": "600",
            "credit_details": [
                { "fuel_type": "Petrol", "liters": 2, "rate": "100", "amount": "" }
            ],
            "card_sales": [
                { "bank": "SBI", "bank_account": "SBI-POS", "amount": 100 }
            ],
            "expenses": [
                { "account": "Repairs", "amount": 50.0 },
                { "account": "Misc", "amount": "n/a" }
            ],
            "fund_transfers": [
                { "transfer_type": "Swap", "amount": 400 }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(snapshot.fund_transfers[0].transfer_type, TransferType::Unrecognized);
    assert_eq!(snapshot.expenses[1].amount, None);

    let result = engine.compute_cash_reconciliation(&snapshot);
    let variance = result.as_variance_based().unwrap();
    assert_eq!(variance.total_payments_received, dec("1200"));
    assert_eq!(variance.expected_collection, dec("1250"));
    assert_eq!(variance.cash_variance, dec("-50"));
    assert_eq!(variance.variance_kind(), CashVarianceKind::Shortage);
    assert_eq!(variance.severity, VarianceSeverity::Minor);
    assert_eq!(variance.variance_pct, dec("-4.00"));
    assert_eq!(variance.totals.total_fund_transfer_effect, dec("0"));
}

#[test]
fn test_transfer_types_from_json() {
    let snapshot: DayClosingSnapshot = serde_json::from_str(
        r#"{
            "previous_cash": 100,
            "total_sales": 0,
            "fund_transfers": [
                { "transfer_type": "Withdraw", "bank": "SBI", "amount": "250" },
                { "transfer_type": "Deposit", "bank_account": "SBI-CUR", "amount": 80 },
                { "transfer_type": "withdraw", "amount": 1000 }
            ]
        }"#,
    )
    .unwrap();

    let kinds: Vec<TransferType> = snapshot
        .fund_transfers
        .iter()
        .map(|row| row.transfer_type)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TransferType::Withdraw,
            TransferType::Deposit,
            TransferType::Unrecognized
        ]
    );

    let engine = ReconciliationEngine::with_strategy(ReconciliationStrategy::EffectBased);
    let result = engine.compute_cash_reconciliation(&snapshot);
    let closing = result.as_effect_based().unwrap();
    assert_eq!(closing.totals.total_fund_transfer_effect, dec("170"));
    assert_eq!(closing.cash_in_hand, dec("270"));
}

#[test]
fn test_null_fields_do_not_reject_snapshot() {
    let snapshot: DayClosingSnapshot = serde_json::from_str(
        r#"{
            "petrol_pump": null,
            "fund_transfers": [
                { "transfer_type": null, "bank": null, "amount": 100 },
                { "transfer_type": 7, "amount": 100 },
                { "transfer_type": "Withdraw", "amount": 30 }
            ],
            "credit_details": [
                { "fuel_type": null, "liters": 2, "rate": 100 }
            ],
            "card_sales": [
                { "bank": null, "bank_account": null, "amount": 40 }
            ],
            "expenses": [
                { "account": null, "amount": 5 }
            ],
            "total_sales": 1000
        }"#,
    )
    .unwrap();

    assert_eq!(snapshot.petrol_pump, "");
    assert_eq!(snapshot.fund_transfers[0].transfer_type, TransferType::Unrecognized);
    assert_eq!(snapshot.fund_transfers[0].bank, "");
    assert_eq!(snapshot.fund_transfers[1].transfer_type, TransferType::Unrecognized);
    assert_eq!(snapshot.credit_details[0].fuel_type, "");
    assert_eq!(snapshot.card_sales[0].bank_account, "");
    assert_eq!(snapshot.expenses[0].account, "");

    let engine = ReconciliationEngine::with_strategy(ReconciliationStrategy::EffectBased);
    let result = engine.compute_cash_reconciliation(&snapshot);
    // 1000 - 200 - 40 - 5 + 30
    assert_eq!(result.as_effect_based().unwrap().cash_amount, dec("785"));
}

#[test]
fn test_extreme_exponent_amount_is_ignored() {
    let snapshot: DayClosingSnapshot = serde_json::from_str(
        r#"{
            "expenses": [
                { "account": "x", "amount": "1e4000000000" },
                { "account": "y", "amount": "12.5" }
            ],
            "previous_cash": "-1e-4000000000"
        }"#,
    )
    .unwrap();

    assert_eq!(snapshot.expenses[0].amount, None);
    assert_eq!(snapshot.previous_cash, dec("0"));
    assert_eq!(sum_amounts(&snapshot.expenses), dec("12.5"));
}

#[tokio::test]
async fn test_next_day_opens_at_closing_readings() {
    let lookups = seeded_lookups();
    let assembler = SnapshotAssembler::new(lookups.clone());

    let mut readings = assembler
        .seed_nozzle_readings("PUMP-01", closing_date())
        .await
        .unwrap();
    readings[0].current_reading = Some(dec("1200"));
    readings[1].current_reading = Some(dec("5100"));

    let credit = vec![CreditDetail::new("Petrol".to_string(), dec("50"), dec("102"))];
    let cash = cash_sales_by_fuel(&readings, &credit);
    assert_eq!(cash["Petrol"].liters, dec("150"));
    assert_eq!(cash["Petrol"].amount, dec("15300"));
    assert_eq!(cash["Diesel"].amount, dec("9000"));

    let mut nozzles = lookups.active_nozzles("PUMP-01").await.unwrap();
    assert_eq!(apply_closing_readings(&mut nozzles, &readings), 2);

    let tests = vec![FuelTestingDetail::new(
        "N1".to_string(),
        "Petrol".to_string(),
        dec("5"),
    )];
    apply_fuel_testing(&mut nozzles, &tests);

    let next_day = MemoryLookups::new();
    for nozzle in nozzles {
        next_day.add_nozzle("PUMP-01", nozzle).unwrap();
    }
    let next = SnapshotAssembler::new(next_day)
        .seed_nozzle_readings("PUMP-01", closing_date())
        .await
        .unwrap();
    assert_eq!(next[0].previous_reading, Some(dec("1205")));
    assert_eq!(next[1].previous_reading, Some(dec("5100")));
}

#[tokio::test]
async fn test_dip_reading_against_stored_stock() {
    let lookups = seeded_lookups();
    let stock = lookups.stock_levels("PUMP-01").await.unwrap();

    let dip: DipReading =
        serde_json::from_str(r#"{ "fuel_tank": "Tank-D", "measured_dip": "3999.95" }"#).unwrap();
    let variance = assess_dip_reading(&dip, &stock, &default_dip_tolerance());
    assert_eq!(variance.system_stock, dec("4000"));
    assert_eq!(variance.difference, dec("-0.05"));
    assert!(!variance.needs_adjustment);
}

#[test]
fn test_config_without_strategy_is_rejected() {
    let parsed = serde_json::from_str::<ReconciliationConfig>(r#"{ "currency_scale": 2 }"#);
    assert!(parsed.is_err());
}

#[test]
fn test_result_serializes_with_strategy_tag() {
    let engine = ReconciliationEngine::with_strategy(ReconciliationStrategy::EffectBased);
    let result = engine.compute_cash_reconciliation(&DayClosingSnapshot::default());
    assert!(matches!(result, ReconciliationResult::EffectBased(_)));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["strategy"], "effect_based");
    assert!(json.get("cash_in_hand").is_some());
    assert!(json.get("cash_variance").is_none());
}

#[test]
fn test_fuel_testing_stock_check() {
    let rows = vec![
        FuelTestingDetail::new("N1".to_string(), "Petrol".to_string(), dec("5")),
        FuelTestingDetail::new("N3".to_string(), "Petrol".to_string(), dec("5")),
    ];
    let stock = vec![StockLevel::new(
        "Tank-P".to_string(),
        "Petrol".to_string(),
        "Petrol WH".to_string(),
        dec("8"),
    )];
    assert!(matches!(
        validate_testing_stock(&rows, &stock),
        Err(ClosingError::InsufficientStock { .. })
    ));
}
