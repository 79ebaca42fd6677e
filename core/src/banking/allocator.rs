use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A quantity of compliance units set aside for later use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankedUnit {
    pub id: String,
    pub units: f64,
    pub banked_at: DateTime<Utc>,
    /// Last instant at which the unit may still be applied.
    pub expiry_date: DateTime<Utc>,
}

impl BankedUnit {
    pub fn is_usable_at(&self, date: DateTime<Utc>) -> bool {
        self.expiry_date >= date
    }
}

/// Amount drawn from one banked unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsedBankedUnit {
    pub banked_unit_id: String,
    pub applied_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResult {
    pub applied_units: f64,
    pub remaining_deficit: f64,
    /// Consumption ledger in the order units were drawn.
    pub used_banked_units: Vec<UsedBankedUnit>,
    /// Untouched units and residuals of partially consumed ones.
    pub unused_banked_units: Vec<BankedUnit>,
}

/// Cover `deficit` from `available`, oldest `banked_at` first.
///
/// Units whose expiry lies before `application_date` are dropped from the
/// result entirely; reaping them is the caller's job. Units banked at the
/// same instant keep their input order. A partially consumed unit comes back
/// in `unused_banked_units` with the same id and dates and the leftover
/// quantity.
pub fn apply_banked(
    deficit: f64,
    available: &[BankedUnit],
    application_date: DateTime<Utc>,
) -> ApplicationResult {
    let mut usable: Vec<&BankedUnit> = available
        .iter()
        .filter(|unit| unit.is_usable_at(application_date))
        .collect();
    usable.sort_by_key(|unit| unit.banked_at);

    let mut remaining = deficit;
    let mut used_banked_units = Vec::new();
    let mut unused_banked_units = Vec::new();

    for unit in usable {
        if remaining <= 0.0 {
            unused_banked_units.push(unit.clone());
            continue;
        }

        let applied_amount = unit.units.min(remaining);
        remaining -= applied_amount;
        used_banked_units.push(UsedBankedUnit {
            banked_unit_id: unit.id.clone(),
            applied_amount,
        });

        if applied_amount < unit.units {
            unused_banked_units.push(BankedUnit {
                units: unit.units - applied_amount,
                ..unit.clone()
            });
        }
    }

    ApplicationResult {
        applied_units: deficit - remaining,
        remaining_deficit: remaining.max(0.0),
        used_banked_units,
        unused_banked_units,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn application_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
    }

    /// Unit valid for two years from `banked_at`.
    fn unit(id: &str, units: f64, banked_at: DateTime<Utc>) -> BankedUnit {
        BankedUnit {
            id: id.to_string(),
            units,
            banked_at,
            expiry_date: crate::banking::add_years(banked_at, 2),
        }
    }

    fn used_ids(result: &ApplicationResult) -> Vec<&str> {
        result
            .used_banked_units
            .iter()
            .map(|u| u.banked_unit_id.as_str())
            .collect()
    }

    #[test]
    fn test_exact_deficit() {
        let units = vec![unit("unit1", 1000.0, date(2023, 1, 1))];
        let result = apply_banked(1000.0, &units, application_date());

        assert_eq!(result.applied_units, 1000.0);
        assert_eq!(result.remaining_deficit, 0.0);
        assert_eq!(used_ids(&result), vec!["unit1"]);
        assert_eq!(result.used_banked_units[0].applied_amount, 1000.0);
        assert!(result.unused_banked_units.is_empty());
    }

    #[test]
    fn test_partial_consumption_emits_residual() {
        let u1 = BankedUnit {
            id: "u1".to_string(),
            units: 1000.0,
            banked_at: date(2023, 1, 1),
            expiry_date: date(2025, 1, 1),
        };
        let result = apply_banked(500.0, &[u1.clone()], application_date());

        assert_eq!(result.applied_units, 500.0);
        assert_eq!(result.remaining_deficit, 0.0);
        assert_eq!(
            result.used_banked_units,
            vec![UsedBankedUnit {
                banked_unit_id: "u1".to_string(),
                applied_amount: 500.0,
            }]
        );
        assert_eq!(
            result.unused_banked_units,
            vec![BankedUnit {
                units: 500.0,
                ..u1
            }]
        );
    }

    #[test]
    fn test_fifo_regardless_of_input_order() {
        let units = vec![
            unit("newest", 200.0, date(2023, 12, 1)),
            unit("oldest", 500.0, date(2023, 1, 1)),
            unit("middle", 300.0, date(2023, 6, 1)),
        ];
        let result = apply_banked(800.0, &units, application_date());

        assert_eq!(used_ids(&result), vec!["oldest", "middle"]);
        assert_eq!(result.applied_units, 800.0);
        assert_eq!(result.unused_banked_units.len(), 1);
        assert_eq!(result.unused_banked_units[0].id, "newest");
        assert_eq!(result.unused_banked_units[0].units, 200.0);
    }

    #[test]
    fn test_equal_banked_at_keeps_input_order() {
        let same = date(2023, 3, 1);
        let units = vec![
            unit("b", 100.0, same),
            unit("a", 100.0, same),
            unit("c", 100.0, same),
        ];
        let result = apply_banked(150.0, &units, application_date());

        assert_eq!(used_ids(&result), vec!["b", "a"]);
        assert_eq!(result.used_banked_units[1].applied_amount, 50.0);
        let unused: Vec<_> = result.unused_banked_units.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(unused, vec!["a", "c"]);
    }

    #[test]
    fn test_expired_units_disappear() {
        let units = vec![
            BankedUnit {
                id: "expired".to_string(),
                units: 1000.0,
                banked_at: date(2020, 1, 1),
                expiry_date: date(2022, 1, 1),
            },
            unit("valid", 100.0, date(2023, 1, 1)),
        ];
        let result = apply_banked(500.0, &units, application_date());

        assert_eq!(used_ids(&result), vec!["valid"]);
        assert_eq!(result.applied_units, 100.0);
        assert_eq!(result.remaining_deficit, 400.0);
        assert!(result.unused_banked_units.iter().all(|u| u.id != "expired"));
    }

    #[test]
    fn test_expiry_on_application_date_is_usable() {
        let when = application_date();
        let units = vec![BankedUnit {
            id: "edge".to_string(),
            units: 10.0,
            banked_at: date(2022, 1, 15),
            expiry_date: when,
        }];
        let result = apply_banked(10.0, &units, when);

        assert_eq!(result.applied_units, 10.0);
        assert_eq!(used_ids(&result), vec!["edge"]);
    }

    #[test]
    fn test_zero_deficit_applies_nothing() {
        let units = vec![
            unit("u1", 100.0, date(2023, 1, 1)),
            unit("u2", 200.0, date(2023, 2, 1)),
        ];
        let result = apply_banked(0.0, &units, application_date());

        assert_eq!(result.applied_units, 0.0);
        assert_eq!(result.remaining_deficit, 0.0);
        assert!(result.used_banked_units.is_empty());
        assert_eq!(result.unused_banked_units, units);
    }

    #[test]
    fn test_negative_deficit_is_clamped() {
        let units = vec![unit("u1", 100.0, date(2023, 1, 1))];
        let result = apply_banked(-25.0, &units, application_date());

        assert_eq!(result.applied_units, 0.0);
        assert_eq!(result.remaining_deficit, 0.0);
        assert_eq!(result.unused_banked_units.len(), 1);
    }

    #[test]
    fn test_deficit_exceeds_available() {
        let units = vec![
            unit("u1", 100.0, date(2023, 1, 1)),
            unit("u2", 250.0, date(2023, 2, 1)),
        ];
        let result = apply_banked(1000.0, &units, application_date());

        assert_eq!(result.applied_units, 350.0);
        assert_eq!(result.remaining_deficit, 650.0);
        assert!(result.unused_banked_units.is_empty());
    }

    #[test]
    fn test_no_units_available() {
        let result = apply_banked(75.5, &[], application_date());

        assert_eq!(result.applied_units, 0.0);
        assert_eq!(result.remaining_deficit, 75.5);
        assert!(result.used_banked_units.is_empty());
    }

    #[test]
    fn test_fractional_deficit_conservation() {
        let units = vec![
            unit("u1", 0.3, date(2023, 1, 1)),
            unit("u2", 0.7, date(2023, 2, 1)),
            unit("u3", 10.0, date(2023, 3, 1)),
        ];
        let deficit = 1.234_567;
        let result = apply_banked(deficit, &units, application_date());

        let applied: f64 = result.used_banked_units.iter().map(|u| u.applied_amount).sum();
        assert!((result.applied_units + result.remaining_deficit - deficit).abs() < 1e-12);
        assert!((applied - result.applied_units).abs() < 1e-12);
        assert_eq!(result.remaining_deficit, 0.0);
        assert_eq!(result.unused_banked_units.len(), 1);
        assert!((result.unused_banked_units[0].units - (10.0 - (deficit - 1.0))).abs() < 1e-12);
    }
}
