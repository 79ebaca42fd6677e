//! JSON boundary.
//!
//! Request bodies are decoded into typed structs, then validated field by
//! field; the first violation is returned. Successful responses are wrapped
//! as `{"result": ...}`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::banking::{apply_banked as apply_banked_units, bank_surplus as bank, BankedUnit};
use crate::compliance;
use crate::config::LedgerConfig;
use crate::error::BoundaryError;
use crate::models::{PoolId, PoolType, ShipId};
use crate::pooling::PoolAllocation;
use crate::service::{LedgerService, NewPool};
use crate::storage::Storage;

const MAX_VALIDITY_YEARS: f64 = 10.0;

/// Boundary checks run after decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), BoundaryError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub result: T,
}

pub fn decode<T>(body: &str) -> Result<T, BoundaryError>
where
    T: DeserializeOwned + Validate,
{
    let request: T = serde_json::from_str(body)?;
    request.validate()?;
    Ok(request)
}

pub fn respond<T: Serialize>(result: T) -> Result<String, BoundaryError> {
    Ok(serde_json::to_string(&Envelope { result })?)
}

fn ensure(condition: bool, field: &str, message: &str) -> Result<(), BoundaryError> {
    if condition {
        Ok(())
    } else {
        Err(BoundaryError::field(field, message))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeCbRequest {
    pub actual_ghg_intensity: f64,
    pub fuel_consumption: f64,
}

impl Validate for ComputeCbRequest {
    fn validate(&self) -> Result<(), BoundaryError> {
        ensure(
            self.actual_ghg_intensity >= 0.0,
            "actualGhgIntensity",
            "must not be negative",
        )?;
        ensure(self.fuel_consumption > 0.0, "fuelConsumption", "must be positive")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeComparisonRequest {
    pub actual_ghg_intensity: f64,
}

impl Validate for ComputeComparisonRequest {
    fn validate(&self) -> Result<(), BoundaryError> {
        ensure(
            self.actual_ghg_intensity >= 0.0,
            "actualGhgIntensity",
            "must not be negative",
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSurplusRequest {
    pub surplus_units: f64,
    pub banking_date: DateTime<Utc>,
    #[serde(default)]
    pub max_banking_capacity: Option<f64>,
    /// Decoded as a number so fractional years are rejected by validation
    /// rather than by the decoder.
    #[serde(default)]
    pub banking_validity_years: Option<f64>,
}

impl BankSurplusRequest {
    pub fn validity_years(&self) -> Option<u32> {
        self.banking_validity_years.map(|years| years as u32)
    }
}

impl Validate for BankSurplusRequest {
    fn validate(&self) -> Result<(), BoundaryError> {
        ensure(self.surplus_units > 0.0, "surplusUnits", "must be positive")?;
        if let Some(capacity) = self.max_banking_capacity {
            ensure(capacity > 0.0, "maxBankingCapacity", "must be positive")?;
        }
        if let Some(years) = self.banking_validity_years {
            ensure(
                years.fract() == 0.0 && (1.0..=MAX_VALIDITY_YEARS).contains(&years),
                "bankingValidityYears",
                "must be a whole number of years between 1 and 10",
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyBankedRequest {
    pub deficit: f64,
    pub application_date: DateTime<Utc>,
    pub available_banked_units: Vec<BankedUnit>,
}

impl Validate for ApplyBankedRequest {
    fn validate(&self) -> Result<(), BoundaryError> {
        ensure(self.deficit > 0.0, "deficit", "must be positive")?;
        for (i, unit) in self.available_banked_units.iter().enumerate() {
            ensure(
                Uuid::parse_str(&unit.id).is_ok(),
                &format!("availableBankedUnits[{i}].id"),
                "must be a UUID",
            )?;
            ensure(
                unit.units > 0.0,
                &format!("availableBankedUnits[{i}].units"),
                "must be positive",
            )?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePoolRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub pool_type: PoolType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub total_compliance_units: Option<f64>,
    #[serde(default)]
    pub allocated_compliance_units: Option<f64>,
}

impl Validate for CreatePoolRequest {
    // Blank-but-present names and date order are left to the pool rules so
    // the caller sees their exact messages.
    fn validate(&self) -> Result<(), BoundaryError> {
        ensure(!self.name.is_empty(), "name", "is required")?;
        if let Some(total) = self.total_compliance_units {
            ensure(total >= 0.0, "totalComplianceUnits", "must not be negative")?;
        }
        if let Some(allocated) = self.allocated_compliance_units {
            ensure(
                allocated >= 0.0,
                "allocatedComplianceUnits",
                "must not be negative",
            )?;
        }
        Ok(())
    }
}

impl From<CreatePoolRequest> for NewPool {
    fn from(request: CreatePoolRequest) -> Self {
        NewPool {
            name: request.name,
            description: request.description,
            pool_type: request.pool_type,
            start_date: request.start_date,
            end_date: request.end_date,
            total_compliance_units: request.total_compliance_units,
            allocated_compliance_units: request.allocated_compliance_units,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub ship_id: String,
    pub units: f64,
}

impl Validate for AddMemberRequest {
    fn validate(&self) -> Result<(), BoundaryError> {
        ensure(!self.ship_id.is_empty(), "shipId", "is required")?;
        ensure(self.units > 0.0, "units", "must be positive")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocateUnitsRequest {
    pub ship_id: String,
    pub units: f64,
    #[serde(default)]
    pub allocation_date: Option<DateTime<Utc>>,
}

impl Validate for AllocateUnitsRequest {
    fn validate(&self) -> Result<(), BoundaryError> {
        ensure(!self.ship_id.is_empty(), "shipId", "is required")?;
        ensure(self.units > 0.0, "units", "must be positive")
    }
}

// Calculator endpoints

pub fn compute_cb(body: &str) -> Result<String, BoundaryError> {
    let request: ComputeCbRequest = decode(body)?;
    respond(compliance::compute_cb(
        request.actual_ghg_intensity,
        request.fuel_consumption,
    ))
}

pub fn compute_comparison(body: &str) -> Result<String, BoundaryError> {
    let request: ComputeComparisonRequest = decode(body)?;
    respond(compliance::compute_comparison(request.actual_ghg_intensity))
}

/// Bank a surplus under `config`; request fields override the policy.
pub fn bank_surplus(config: &LedgerConfig, body: &str) -> Result<String, BoundaryError> {
    let request: BankSurplusRequest = decode(body)?;
    let input = config.banking_input(
        request.surplus_units,
        request.banking_date,
        request.max_banking_capacity,
        request.validity_years(),
    );
    respond(bank(&input))
}

pub fn apply_banked(body: &str) -> Result<String, BoundaryError> {
    let request: ApplyBankedRequest = decode(body)?;
    respond(apply_banked_units(
        request.deficit,
        &request.available_banked_units,
        request.application_date,
    ))
}

// Pool endpoints

pub fn create_pool<S: Storage>(
    service: &mut LedgerService<S>,
    body: &str,
    now: DateTime<Utc>,
) -> Result<String, BoundaryError> {
    let request: CreatePoolRequest = decode(body)?;
    respond(service.create_pool(request.into(), now)?)
}

pub fn add_member<S: Storage>(
    service: &mut LedgerService<S>,
    pool_id: &str,
    body: &str,
    now: DateTime<Utc>,
) -> Result<String, BoundaryError> {
    let request: AddMemberRequest = decode(body)?;
    let member = service.add_member(
        &PoolId::new(pool_id),
        ShipId::new(request.ship_id),
        request.units,
        now,
    )?;
    respond(member)
}

pub fn allocate_units<S: Storage>(
    service: &mut LedgerService<S>,
    pool_id: &str,
    body: &str,
    now: DateTime<Utc>,
) -> Result<String, BoundaryError> {
    let request: AllocateUnitsRequest = decode(body)?;
    let pool_id = PoolId::new(pool_id);
    service.allocate_units(&PoolAllocation {
        pool_id: pool_id.clone(),
        ship_id: ShipId::new(request.ship_id),
        units: request.units,
        allocation_date: request.allocation_date.unwrap_or(now),
    })?;
    respond(service.members(&pool_id)?)
}

pub fn remove_member<S: Storage>(
    service: &mut LedgerService<S>,
    pool_id: &str,
    ship_id: &str,
    now: DateTime<Utc>,
) -> Result<String, BoundaryError> {
    let pool_id = PoolId::new(pool_id);
    service.remove_member(&pool_id, &ShipId::new(ship_id), now)?;
    respond(service.get_pool(&pool_id)?)
}
