//! Compliance Balance computation.
//!
//! Pure functions over GHG intensity and fuel figures. Nothing here validates
//! ranges: negative or zero inputs are computed through and simply scale the
//! result. Range checks belong to the caller (see `wire`).

use serde::{Deserialize, Serialize};

use crate::models::{ComplianceRecord, ComplianceStatus};

/// Regulatory target GHG intensity in gCO2eq/MJ.
pub const TARGET_GHG_INTENSITY: f64 = 89.3368;

/// Energy conversion factor applied per tonne of fuel (MJ/t).
pub const ENERGY_PER_TONNE_MJ: f64 = 41_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceBalanceResult {
    /// Compliance Balance; positive is a surplus, negative a deficit.
    pub cb: f64,
    pub target: f64,
    /// Actual GHG intensity (gCO2eq/MJ)
    pub actual: f64,
    /// Fuel consumption (t)
    pub fuel_consumption: f64,
    pub is_surplus: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub actual: f64,
    pub target: f64,
    /// `target - actual`
    pub difference: f64,
    pub is_compliant: bool,
}

/// Compute the Compliance Balance: `(target - actual) * fuel * 41000`.
///
/// `cb == 0` is not a surplus.
pub fn compute_cb(actual_ghg_intensity: f64, fuel_consumption: f64) -> ComplianceBalanceResult {
    let cb = (TARGET_GHG_INTENSITY - actual_ghg_intensity) * fuel_consumption * ENERGY_PER_TONNE_MJ;
    ComplianceBalanceResult {
        cb,
        target: TARGET_GHG_INTENSITY,
        actual: actual_ghg_intensity,
        fuel_consumption,
        is_surplus: cb > 0.0,
    }
}

/// Compare an actual intensity against the target. Equality is compliant.
pub fn compute_comparison(actual_ghg_intensity: f64) -> ComparisonResult {
    ComparisonResult {
        actual: actual_ghg_intensity,
        target: TARGET_GHG_INTENSITY,
        difference: TARGET_GHG_INTENSITY - actual_ghg_intensity,
        is_compliant: actual_ghg_intensity <= TARGET_GHG_INTENSITY,
    }
}

/// Status assigned to a freshly reported voyage.
pub fn status_for_intensity(actual_ghg_intensity: f64) -> ComplianceStatus {
    if compute_comparison(actual_ghg_intensity).is_compliant {
        ComplianceStatus::Compliant
    } else {
        ComplianceStatus::NonCompliant
    }
}

/// Aggregated figures over a set of compliance records.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceMetrics {
    /// gCO2eq
    pub total_ghg_emissions: f64,
    /// Energy-weighted intensity (gCO2eq/MJ)
    pub average_ghg_intensity: f64,
    /// MJ
    pub total_energy_consumed: f64,
    /// Share of compliant records, in percent.
    pub compliance_rate: f64,
}

impl ComplianceMetrics {
    pub fn compute<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ComplianceRecord>,
    {
        let mut count = 0usize;
        let mut compliant = 0usize;
        let mut total_energy_consumed = 0.0;
        let mut total_ghg_emissions = 0.0;

        for record in records {
            count += 1;
            total_energy_consumed += record.energy_content;
            total_ghg_emissions += record.energy_content * record.ghg_intensity;
            if record.compliance_status == ComplianceStatus::Compliant {
                compliant += 1;
            }
        }

        if count == 0 {
            return Self::default();
        }

        let average_ghg_intensity = if total_energy_consumed > 0.0 {
            total_ghg_emissions / total_energy_consumed
        } else {
            0.0
        };

        ComplianceMetrics {
            total_ghg_emissions,
            average_ghg_intensity,
            total_energy_consumed,
            compliance_rate: compliant as f64 / count as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ComplianceId, FuelType, RouteId, ShipId};
    use crate::period::ReportingPeriod;
    use chrono::Utc;

    fn record(energy: f64, intensity: f64) -> ComplianceRecord {
        let now = Utc::now();
        ComplianceRecord {
            id: ComplianceId("c".to_string()),
            ship_id: ShipId::new("V001"),
            route_id: RouteId("r".to_string()),
            voyage_id: "voy".to_string(),
            fuel_type: FuelType::Hfo,
            fuel_consumption: 10.0,
            energy_content: energy,
            ghg_intensity: intensity,
            compliance_status: status_for_intensity(intensity),
            reporting_period: ReportingPeriod::new(2024, 1).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_compute_cb_surplus() {
        let result = compute_cb(75.0, 100.0);
        assert_eq!(result.cb, (89.3368 - 75.0) * 100.0 * 41000.0);
        assert!((result.cb - 58_780_880.0).abs() < 1e-3);
        assert!(result.is_surplus);
        assert_eq!(result.target, TARGET_GHG_INTENSITY);
        assert_eq!(result.actual, 75.0);
        assert_eq!(result.fuel_consumption, 100.0);
    }

    #[test]
    fn test_compute_cb_deficit() {
        let result = compute_cb(95.0, 50.0);
        assert!(result.cb < 0.0);
        assert!(!result.is_surplus);
    }

    #[test]
    fn test_compute_cb_at_target_is_not_surplus() {
        let result = compute_cb(TARGET_GHG_INTENSITY, 1000.0);
        assert_eq!(result.cb, 0.0);
        assert!(!result.is_surplus);
    }

    #[test]
    fn test_compute_cb_degenerate_fuel() {
        assert_eq!(compute_cb(80.0, 0.0).cb, 0.0);
        assert!(!compute_cb(80.0, 0.0).is_surplus);

        // Negative consumption flips the sign instead of being rejected.
        let result = compute_cb(80.0, -1.0);
        assert!(result.cb < 0.0);
    }

    #[test]
    fn test_compute_cb_keeps_full_precision() {
        let result = compute_cb(89.3, 0.001);
        let expected = (89.3368 - 89.3) * 0.001 * 41000.0;
        assert_eq!(result.cb, expected);
    }

    #[test]
    fn test_comparison_boundary() {
        let equal = compute_comparison(89.3368);
        assert!(equal.is_compliant);
        assert_eq!(equal.difference, 0.0);

        let above = compute_comparison(89.3369);
        assert!(!above.is_compliant);
        assert!(above.difference < 0.0);

        let below = compute_comparison(80.0);
        assert!(below.is_compliant);
        assert!((below.difference - 9.3368).abs() < 1e-9);
    }

    #[test]
    fn test_status_for_intensity() {
        assert_eq!(status_for_intensity(89.3368), ComplianceStatus::Compliant);
        assert_eq!(status_for_intensity(91.0), ComplianceStatus::NonCompliant);
    }

    #[test]
    fn test_metrics_empty() {
        let metrics = ComplianceMetrics::compute(&[]);
        assert_eq!(metrics, ComplianceMetrics::default());
    }

    #[test]
    fn test_metrics_weighted_average() {
        let records = vec![record(1000.0, 80.0), record(3000.0, 100.0)];
        let metrics = ComplianceMetrics::compute(&records);

        assert_eq!(metrics.total_energy_consumed, 4000.0);
        assert_eq!(metrics.total_ghg_emissions, 80_000.0 + 300_000.0);
        assert!((metrics.average_ghg_intensity - 95.0).abs() < 1e-9);
        assert!((metrics.compliance_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_zero_energy() {
        let records = vec![record(0.0, 80.0)];
        let metrics = ComplianceMetrics::compute(&records);
        assert_eq!(metrics.average_ghg_intensity, 0.0);
        assert_eq!(metrics.compliance_rate, 100.0);
    }
}
