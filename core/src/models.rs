use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::banking::BankedUnit;
use crate::period::ReportingPeriod;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComplianceId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolMemberId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankEntryId(pub String);

/// Fresh opaque identifier for a new record.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

impl ShipId {
    pub fn new(id: impl Into<String>) -> Self {
        ShipId(id.into())
    }
}

impl PoolId {
    pub fn new(id: impl Into<String>) -> Self {
        PoolId(id.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteType {
    IntraEu,
    ExtraEu,
    Mixed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: RouteId,
    pub origin_port: String,
    pub destination_port: String,
    /// Nautical miles.
    pub distance: f64,
    pub route_type: RouteType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FuelType {
    /// Marine gas oil
    Mgo,
    /// Marine diesel oil
    Mdo,
    /// Heavy fuel oil
    Hfo,
    /// Liquefied natural gas
    Lng,
    /// Liquefied petroleum gas
    Lpg,
    Methanol,
    Ethanol,
    Hydrogen,
    Ammonia,
    Electricity,
    Biofuel,
    SyntheticFuel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    Pending,
    UnderReview,
}

/// Fuel consumption reported for one voyage of one ship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceRecord {
    pub id: ComplianceId,
    pub ship_id: ShipId,
    pub route_id: RouteId,
    pub voyage_id: String,
    pub fuel_type: FuelType,
    /// Metric tonnes.
    pub fuel_consumption: f64,
    /// MJ.
    pub energy_content: f64,
    /// gCO2eq/MJ.
    pub ghg_intensity: f64,
    pub compliance_status: ComplianceStatus,
    pub reporting_period: ReportingPeriod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolType {
    Voluntary,
    Mandatory,
    Company,
    Fleet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PoolStatus {
    Pending,
    Active,
    Closed,
    Suspended,
}

impl PoolStatus {
    /// Whether a pool may move from `self` to `next`.
    pub fn can_transition_to(self, next: PoolStatus) -> bool {
        use PoolStatus::*;
        matches!(
            (self, next),
            (Pending, Active)
                | (Active, Suspended)
                | (Suspended, Active)
                | (Pending, Closed)
                | (Active, Closed)
                | (Suspended, Closed)
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pool_type: PoolType,
    pub status: PoolStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_compliance_units: f64,
    pub allocated_compliance_units: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMember {
    pub id: PoolMemberId,
    pub pool_id: PoolId,
    pub ship_id: ShipId,
    pub allocated_units: f64,
    /// Percentage of the units allocated across all members of the pool.
    pub contribution: f64,
    pub joined_at: DateTime<Utc>,
}

/// A persisted quantity of banked compliance units owned by one ship.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankEntry {
    pub id: BankEntryId,
    pub ship_id: ShipId,
    pub reporting_period: ReportingPeriod,
    pub units: f64,
    pub banked_at: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

impl BankEntry {
    pub fn is_expired_at(&self, date: DateTime<Utc>) -> bool {
        self.expiry_date < date
    }

    pub fn as_banked_unit(&self) -> BankedUnit {
        BankedUnit {
            id: self.id.0.clone(),
            units: self.units,
            banked_at: self.banked_at,
            expiry_date: self.expiry_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_pool_status_transitions() {
        assert!(PoolStatus::Pending.can_transition_to(PoolStatus::Active));
        assert!(PoolStatus::Active.can_transition_to(PoolStatus::Suspended));
        assert!(PoolStatus::Suspended.can_transition_to(PoolStatus::Active));
        assert!(PoolStatus::Active.can_transition_to(PoolStatus::Closed));
        assert!(!PoolStatus::Closed.can_transition_to(PoolStatus::Active));
        assert!(!PoolStatus::Pending.can_transition_to(PoolStatus::Suspended));
        assert!(!PoolStatus::Active.can_transition_to(PoolStatus::Pending));
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&FuelType::SyntheticFuel).unwrap(),
            "\"SYNTHETIC_FUEL\""
        );
        assert_eq!(
            serde_json::to_string(&RouteType::IntraEu).unwrap(),
            "\"INTRA_EU\""
        );
        assert_eq!(
            serde_json::from_str::<ComplianceStatus>("\"NON_COMPLIANT\"").unwrap(),
            ComplianceStatus::NonCompliant
        );
    }

    #[test]
    fn test_bank_entry_expiry_is_inclusive() {
        let expiry = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let entry = BankEntry {
            id: BankEntryId("b-1".to_string()),
            ship_id: ShipId::new("V001"),
            reporting_period: ReportingPeriod::new(2024, 1).unwrap(),
            units: 100.0,
            banked_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            expiry_date: expiry,
        };
        assert!(!entry.is_expired_at(expiry));
        assert!(entry.is_expired_at(expiry + chrono::Duration::seconds(1)));

        let unit = entry.as_banked_unit();
        assert_eq!(unit.id, "b-1");
        assert_eq!(unit.units, 100.0);
    }
}
