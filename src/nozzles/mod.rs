//! Nozzle meter bookkeeping
//!
//! Each active nozzle remembers the last meter value it was closed at. A
//! submitted closing moves it to the closing reading, a fuel test moves it
//! forward by the liters drawn, and cancelling either one moves it back.
//! Nozzles are matched by name.

use bigdecimal::BigDecimal;

use crate::types::{ActiveNozzle, FuelTestingDetail, NozzleReading};
use crate::utils::coerce;

fn find<'a>(nozzles: &'a mut [ActiveNozzle], name: &str) -> Option<&'a mut ActiveNozzle> {
    if name.is_empty() {
        return None;
    }
    nozzles.iter_mut().find(|nozzle| nozzle.nozzle == name)
}

/// Move each nozzle to the closing reading entered for it
///
/// Rows without a closing reading leave the nozzle untouched. Returns the
/// number of nozzles updated.
pub fn apply_closing_readings(nozzles: &mut [ActiveNozzle], readings: &[NozzleReading]) -> usize {
    let mut updated = 0;
    for reading in readings {
        let Some(current) = reading.current_reading.as_ref() else {
            continue;
        };
        if let Some(nozzle) = find(nozzles, &reading.nozzle) {
            nozzle.last_reading = Some(current.clone());
            updated += 1;
        }
    }
    updated
}

/// Put each nozzle back on the opening reading of a cancelled closing
pub fn revert_closing_readings(nozzles: &mut [ActiveNozzle], readings: &[NozzleReading]) -> usize {
    let mut updated = 0;
    for reading in readings {
        if let Some(nozzle) = find(nozzles, &reading.nozzle) {
            nozzle.last_reading = Some(coerce::or_zero(reading.previous_reading.as_ref()));
            updated += 1;
        }
    }
    updated
}

/// Advance nozzles by the fuel drawn in a submitted test
pub fn apply_fuel_testing(nozzles: &mut [ActiveNozzle], rows: &[FuelTestingDetail]) -> usize {
    let zero = BigDecimal::from(0);
    let mut updated = 0;
    for row in rows {
        let liters = coerce::or_zero(row.test_liters.as_ref());
        if liters <= zero {
            continue;
        }
        if let Some(nozzle) = find(nozzles, &row.nozzle) {
            let advanced = coerce::or_zero(nozzle.last_reading.as_ref()) + liters;
            tracing::debug!(
                nozzle = %nozzle.nozzle,
                last_reading = %advanced,
                "Advanced nozzle for fuel testing"
            );
            nozzle.last_reading = Some(advanced);
            updated += 1;
        }
    }
    updated
}

/// Undo a cancelled test; a nozzle never goes below zero
pub fn revert_fuel_testing(nozzles: &mut [ActiveNozzle], rows: &[FuelTestingDetail]) -> usize {
    let zero = BigDecimal::from(0);
    let mut updated = 0;
    for row in rows {
        let liters = coerce::or_zero(row.test_liters.as_ref());
        if liters <= zero {
            continue;
        }
        if let Some(nozzle) = find(nozzles, &row.nozzle) {
            let reverted = coerce::or_zero(nozzle.last_reading.as_ref()) - liters;
            nozzle.last_reading = Some(if reverted < zero { zero.clone() } else { reverted });
            updated += 1;
        }
    }
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    fn nozzle(name: &str, last: Option<&str>) -> ActiveNozzle {
        ActiveNozzle {
            nozzle: name.to_string(),
            fuel_type: "Petrol".to_string(),
            last_reading: last.map(dec),
        }
    }

    #[test]
    fn test_closing_moves_to_current_reading() {
        let mut nozzles = vec![nozzle("N1", Some("1000")), nozzle("N2", Some("500"))];
        let mut open = NozzleReading::new(
            "N2".to_string(),
            "Petrol".to_string(),
            dec("500"),
            dec("0"),
            None,
        );
        open.current_reading = None;
        let readings = vec![
            NozzleReading::new(
                "N1".to_string(),
                "Petrol".to_string(),
                dec("1000"),
                dec("1250.5"),
                None,
            ),
            open,
            NozzleReading::new(
                "N9".to_string(),
                "Petrol".to_string(),
                dec("0"),
                dec("10"),
                None,
            ),
        ];

        assert_eq!(apply_closing_readings(&mut nozzles, &readings), 1);
        assert_eq!(nozzles[0].last_reading, Some(dec("1250.5")));
        assert_eq!(nozzles[1].last_reading, Some(dec("500")));

        assert_eq!(revert_closing_readings(&mut nozzles, &readings), 2);
        assert_eq!(nozzles[0].last_reading, Some(dec("1000")));
        assert_eq!(nozzles[1].last_reading, Some(dec("500")));
    }

    #[test]
    fn test_fuel_testing_advance_and_revert() {
        let mut nozzles = vec![nozzle("N1", Some("1000")), nozzle("N2", None)];
        let rows = vec![
            FuelTestingDetail::new("N1".to_string(), "Petrol".to_string(), dec("5")),
            FuelTestingDetail::new("N2".to_string(), "Petrol".to_string(), dec("2.5")),
            FuelTestingDetail::new("N1".to_string(), "Petrol".to_string(), dec("0")),
        ];

        assert_eq!(apply_fuel_testing(&mut nozzles, &rows), 2);
        assert_eq!(nozzles[0].last_reading, Some(dec("1005")));
        assert_eq!(nozzles[1].last_reading, Some(dec("2.5")));

        assert_eq!(revert_fuel_testing(&mut nozzles, &rows), 2);
        assert_eq!(nozzles[0].last_reading, Some(dec("1000")));
        assert_eq!(nozzles[1].last_reading, Some(dec("0")));
    }

    #[test]
    fn test_revert_clamps_at_zero() {
        let mut nozzles = vec![nozzle("N1", Some("3"))];
        let rows = vec![FuelTestingDetail::new(
            "N1".to_string(),
            "Petrol".to_string(),
            dec("5"),
        )];
        revert_fuel_testing(&mut nozzles, &rows);
        assert_eq!(nozzles[0].last_reading, Some(dec("0")));
    }
}
