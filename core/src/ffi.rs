//! Host-language bindings.
//!
//! The two compliance calculators cross as records. Banking and pool calls
//! take and return the same JSON bodies as the wire boundary.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::compliance::{self, ComparisonResult, ComplianceBalanceResult};
use crate::config::LedgerConfig;
use crate::error::BoundaryError;
use crate::memory_storage::MemoryStorage;
use crate::models::PoolId;
use crate::service::LedgerService;
use crate::wire;

#[uniffi::export]
pub fn compute_cb(actual_ghg_intensity: f64, fuel_consumption: f64) -> ComplianceBalanceResult {
    compliance::compute_cb(actual_ghg_intensity, fuel_consumption)
}

#[uniffi::export]
pub fn compute_comparison(actual_ghg_intensity: f64) -> ComparisonResult {
    compliance::compute_comparison(actual_ghg_intensity)
}

/// Bank a surplus under the default policy.
#[uniffi::export]
pub fn bank_surplus_json(body: String) -> Result<String, BoundaryError> {
    wire::bank_surplus(&LedgerConfig::default(), &body)
}

#[uniffi::export]
pub fn apply_banked_json(body: String) -> Result<String, BoundaryError> {
    wire::apply_banked(&body)
}

/// In-memory ledger owned by the host.
///
/// Calls from different threads are serialised by the inner lock, which
/// covers each whole load, compute, persist cycle.
#[derive(uniffi::Object)]
pub struct ComplianceLedger {
    service: Mutex<LedgerService<MemoryStorage>>,
}

#[uniffi::export]
impl ComplianceLedger {
    /// `config_json` is a `LedgerConfig` document; `None` uses the defaults.
    #[uniffi::constructor]
    pub fn new(config_json: Option<String>) -> Result<Arc<Self>, BoundaryError> {
        let config = match config_json {
            Some(raw) => LedgerConfig::from_json_str(&raw)?,
            None => LedgerConfig::default(),
        };
        Ok(Arc::new(Self {
            service: Mutex::new(LedgerService::new(MemoryStorage::new(), config)),
        }))
    }

    pub fn bank_surplus(&self, body: String) -> Result<String, BoundaryError> {
        let service = self.service.lock();
        wire::bank_surplus(service.config(), &body)
    }

    pub fn create_pool(&self, body: String) -> Result<String, BoundaryError> {
        wire::create_pool(&mut *self.service.lock(), &body, Utc::now())
    }

    pub fn get_pool(&self, pool_id: String) -> Result<String, BoundaryError> {
        let pool = self.service.lock().get_pool(&PoolId::new(pool_id))?;
        wire::respond(pool)
    }

    pub fn list_members(&self, pool_id: String) -> Result<String, BoundaryError> {
        let members = self.service.lock().members(&PoolId::new(pool_id))?;
        wire::respond(members)
    }

    pub fn add_member(&self, pool_id: String, body: String) -> Result<String, BoundaryError> {
        wire::add_member(&mut *self.service.lock(), &pool_id, &body, Utc::now())
    }

    pub fn allocate_units(&self, pool_id: String, body: String) -> Result<String, BoundaryError> {
        wire::allocate_units(&mut *self.service.lock(), &pool_id, &body, Utc::now())
    }

    pub fn remove_member(&self, pool_id: String, ship_id: String) -> Result<String, BoundaryError> {
        wire::remove_member(&mut *self.service.lock(), &pool_id, &ship_id, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_exported_calculators() {
        let cb = compute_cb(95.0, 50.0);
        assert!(!cb.is_surplus);
        assert!(compute_comparison(80.0).is_compliant);
    }

    #[test]
    fn test_ledger_config_is_applied() {
        let ledger = ComplianceLedger::new(Some(r#"{"banking":{"validityYears":5}}"#.to_string()))
            .unwrap();
        let out = ledger
            .bank_surplus(r#"{"surplusUnits":10,"bankingDate":"2024-01-01T00:00:00Z"}"#.to_string())
            .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["result"]["expiryDate"], "2029-01-01T00:00:00Z");

        assert!(matches!(
            ComplianceLedger::new(Some("not json".to_string())),
            Err(BoundaryError::Json(_))
        ));
    }

    #[test]
    fn test_ledger_pool_round() {
        let ledger = ComplianceLedger::new(None).unwrap();
        let body = serde_json::json!({
            "name": "Baltic",
            "poolType": "COMPANY",
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": "2025-01-01T00:00:00Z"
        });
        let created = ledger.create_pool(body.to_string()).unwrap();
        let value: Value = serde_json::from_str(&created).unwrap();
        let pool_id = value["result"]["id"].as_str().unwrap().to_string();

        ledger
            .add_member(pool_id.clone(), r#"{"shipId":"V001","units":10}"#.to_string())
            .unwrap();
        let members: Value =
            serde_json::from_str(&ledger.list_members(pool_id.clone()).unwrap()).unwrap();
        assert_eq!(members["result"][0]["shipId"], "V001");

        let pool: Value = serde_json::from_str(&ledger.get_pool(pool_id).unwrap()).unwrap();
        assert_eq!(pool["result"]["allocatedComplianceUnits"], 10.0);
    }
}
