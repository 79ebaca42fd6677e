use crate::error::StorageError;
use crate::models::{
    BankEntry, BankEntryId, ComplianceRecord, ComplianceStatus, Pool, PoolId, PoolMember,
    PoolStatus, Route, RouteId, ShipId,
};
use crate::period::ReportingPeriod;

#[derive(Clone, Debug, Default)]
pub struct ComplianceQuery {
    pub ship_id: Option<ShipId>,
    pub route_id: Option<RouteId>,
    pub reporting_period: Option<ReportingPeriod>,
    pub status: Option<ComplianceStatus>,
}

impl ComplianceQuery {
    pub fn matches(&self, record: &ComplianceRecord) -> bool {
        self.ship_id.as_ref().map_or(true, |id| &record.ship_id == id)
            && self.route_id.as_ref().map_or(true, |id| &record.route_id == id)
            && self
                .reporting_period
                .map_or(true, |p| record.reporting_period == p)
            && self.status.map_or(true, |s| record.compliance_status == s)
    }
}

/// Persistence collaborator. One row per record, one field per column.
///
/// Implementations are not expected to coordinate concurrent writers; callers
/// serialise read-modify-write cycles (see `LedgerService`).
pub trait Storage {
    fn upsert_route(&mut self, route: Route) -> Result<(), StorageError>;
    fn list_routes(&self) -> Result<Vec<Route>, StorageError>;
    fn load_route(&self, id: &RouteId) -> Result<Option<Route>, StorageError>;

    fn upsert_compliance(&mut self, record: ComplianceRecord) -> Result<(), StorageError>;
    fn list_compliance(
        &self,
        query: &ComplianceQuery,
    ) -> Result<Vec<ComplianceRecord>, StorageError>;

    fn upsert_pool(&mut self, pool: Pool) -> Result<(), StorageError>;
    fn list_pools(&self, status: Option<PoolStatus>) -> Result<Vec<Pool>, StorageError>;
    fn load_pool(&self, id: &PoolId) -> Result<Option<Pool>, StorageError>;

    /// Members of a pool in joining order.
    fn list_members(&self, pool_id: &PoolId) -> Result<Vec<PoolMember>, StorageError>;
    /// Write a pool and its full member list as one unit. Either both are
    /// stored or neither is.
    fn save_pool_snapshot(
        &mut self,
        pool: Pool,
        members: Vec<PoolMember>,
    ) -> Result<(), StorageError>;
    fn list_memberships(&self, ship_id: &ShipId) -> Result<Vec<PoolMember>, StorageError>;

    fn upsert_bank_entry(&mut self, entry: BankEntry) -> Result<(), StorageError>;
    fn list_bank_entries(&self, ship_id: Option<&ShipId>) -> Result<Vec<BankEntry>, StorageError>;
    fn delete_bank_entry(&mut self, id: &BankEntryId) -> Result<(), StorageError>;
}
