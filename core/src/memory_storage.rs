use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};

use crate::error::StorageError;
use crate::models::{
    BankEntry, BankEntryId, ComplianceId, ComplianceRecord, Pool, PoolId, PoolMember, PoolStatus,
    Route, RouteId, RouteType, ShipId,
};
use crate::period::ReportingPeriod;
use crate::storage::{ComplianceQuery, Storage};

/// `Storage` kept in process memory. Used by the bindings and in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    pub routes: BTreeMap<RouteId, Route>,
    pub compliance: BTreeMap<ComplianceId, ComplianceRecord>,
    pub pools: BTreeMap<PoolId, Pool>,
    pub members: BTreeMap<PoolId, Vec<PoolMember>>,
    pub bank_entries: BTreeMap<BankEntryId, BankEntry>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_data() -> Self {
        let created = midnight(2024, 1, 1);
        let mut storage = Self::new();
        for (id, origin, destination, distance) in [
            ("R001", "Mumbai", "Goa", 318.57),
            ("R002", "Kolkata", "Chennai", 901.3),
            ("R003", "Rotterdam", "Hamburg", 275.0),
        ] {
            storage.routes.insert(
                RouteId(id.to_string()),
                Route {
                    id: RouteId(id.to_string()),
                    origin_port: origin.to_string(),
                    destination_port: destination.to_string(),
                    distance,
                    route_type: if id == "R003" {
                        RouteType::IntraEu
                    } else {
                        RouteType::ExtraEu
                    },
                    created_at: created,
                    updated_at: created,
                },
            );
        }

        if let Ok(reporting_period) = ReportingPeriod::new(2024, 3) {
            storage.bank_entries.insert(
                BankEntryId("bank-001".to_string()),
                BankEntry {
                    id: BankEntryId("bank-001".to_string()),
                    ship_id: ShipId::new("V001"),
                    reporting_period,
                    units: 1_500_000.0,
                    banked_at: midnight(2024, 3, 31),
                    expiry_date: midnight(2026, 3, 31),
                },
            );
        }
        storage
    }
}

fn midnight(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

impl Storage for MemoryStorage {
    fn upsert_route(&mut self, route: Route) -> Result<(), StorageError> {
        self.routes.insert(route.id.clone(), route);
        Ok(())
    }

    fn list_routes(&self) -> Result<Vec<Route>, StorageError> {
        Ok(self.routes.values().cloned().collect())
    }

    fn load_route(&self, id: &RouteId) -> Result<Option<Route>, StorageError> {
        Ok(self.routes.get(id).cloned())
    }

    fn upsert_compliance(&mut self, record: ComplianceRecord) -> Result<(), StorageError> {
        self.compliance.insert(record.id.clone(), record);
        Ok(())
    }

    fn list_compliance(
        &self,
        query: &ComplianceQuery,
    ) -> Result<Vec<ComplianceRecord>, StorageError> {
        Ok(self
            .compliance
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    fn upsert_pool(&mut self, pool: Pool) -> Result<(), StorageError> {
        self.pools.insert(pool.id.clone(), pool);
        Ok(())
    }

    fn list_pools(&self, status: Option<PoolStatus>) -> Result<Vec<Pool>, StorageError> {
        Ok(self
            .pools
            .values()
            .filter(|p| status.map_or(true, |s| p.status == s))
            .cloned()
            .collect())
    }

    fn load_pool(&self, id: &PoolId) -> Result<Option<Pool>, StorageError> {
        Ok(self.pools.get(id).cloned())
    }

    fn list_members(&self, pool_id: &PoolId) -> Result<Vec<PoolMember>, StorageError> {
        Ok(self.members.get(pool_id).cloned().unwrap_or_default())
    }

    fn save_pool_snapshot(
        &mut self,
        pool: Pool,
        members: Vec<PoolMember>,
    ) -> Result<(), StorageError> {
        if let Some(stray) = members.iter().find(|m| m.pool_id != pool.id) {
            return Err(StorageError::Conflict(format!(
                "member {} belongs to pool {}",
                stray.id.0, stray.pool_id.0
            )));
        }
        self.members.insert(pool.id.clone(), members);
        self.pools.insert(pool.id.clone(), pool);
        Ok(())
    }

    fn list_memberships(&self, ship_id: &ShipId) -> Result<Vec<PoolMember>, StorageError> {
        Ok(self
            .members
            .values()
            .flatten()
            .filter(|m| &m.ship_id == ship_id)
            .cloned()
            .collect())
    }

    fn upsert_bank_entry(&mut self, entry: BankEntry) -> Result<(), StorageError> {
        self.bank_entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    fn list_bank_entries(&self, ship_id: Option<&ShipId>) -> Result<Vec<BankEntry>, StorageError> {
        Ok(self
            .bank_entries
            .values()
            .filter(|e| ship_id.map_or(true, |id| &e.ship_id == id))
            .cloned()
            .collect())
    }

    fn delete_bank_entry(&mut self, id: &BankEntryId) -> Result<(), StorageError> {
        self.bank_entries.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PoolMemberId, PoolType};

    #[test]
    fn test_sample_data() {
        let storage = MemoryStorage::with_sample_data();
        assert_eq!(storage.list_routes().unwrap().len(), 3);
        let entries = storage.list_bank_entries(Some(&ShipId::new("V001"))).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(storage
            .list_bank_entries(Some(&ShipId::new("V002")))
            .unwrap()
            .is_empty());
    }

    fn pool(id: &str, allocated: f64) -> Pool {
        let now = Utc::now();
        Pool {
            id: PoolId::new(id),
            name: "Fleet".to_string(),
            description: None,
            pool_type: PoolType::Fleet,
            status: PoolStatus::Pending,
            start_date: midnight(2024, 1, 1),
            end_date: midnight(2024, 12, 31),
            total_compliance_units: 0.0,
            allocated_compliance_units: allocated,
            created_at: now,
            updated_at: now,
        }
    }

    fn member(pool_id: &str, ship_id: &str, units: f64) -> PoolMember {
        PoolMember {
            id: PoolMemberId(format!("{pool_id}:{ship_id}")),
            pool_id: PoolId::new(pool_id),
            ship_id: ShipId::new(ship_id),
            allocated_units: units,
            contribution: 100.0,
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn test_pool_snapshot_is_written_together() {
        let mut storage = MemoryStorage::new();
        storage
            .save_pool_snapshot(pool("p1", 5.0), vec![member("p1", "V001", 5.0)])
            .unwrap();

        let stored = storage.load_pool(&PoolId::new("p1")).unwrap().unwrap();
        assert_eq!(stored.allocated_compliance_units, 5.0);
        assert_eq!(storage.list_members(&PoolId::new("p1")).unwrap().len(), 1);
    }

    #[test]
    fn test_pool_snapshot_with_foreign_member_writes_nothing() {
        let mut storage = MemoryStorage::new();
        storage
            .save_pool_snapshot(pool("p1", 5.0), vec![member("p1", "V001", 5.0)])
            .unwrap();

        let result = storage.save_pool_snapshot(
            pool("p1", 6.0),
            vec![member("p1", "V001", 5.0), member("p2", "V002", 1.0)],
        );
        assert!(matches!(result, Err(StorageError::Conflict(_))));

        let stored = storage.load_pool(&PoolId::new("p1")).unwrap().unwrap();
        assert_eq!(stored.allocated_compliance_units, 5.0);
        assert_eq!(storage.list_members(&PoolId::new("p1")).unwrap().len(), 1);
    }
}
