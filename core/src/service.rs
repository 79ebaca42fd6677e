//! Record-keeping service.
//!
//! Wires the pure calculators and the pool ledger to a [`Storage`]. Every
//! mutating method takes `&mut self`: holding the service exclusively is what
//! serialises the load, compute, persist cycle for a pool or a ship's bank.
//! Hosts that share one service between threads put it behind a mutex.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::banking::{apply_banked, bank_surplus, ApplicationResult, BankingResult};
use crate::compliance::{status_for_intensity, ComplianceMetrics};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::models::{
    generate_id, BankEntry, BankEntryId, ComplianceId, ComplianceRecord, FuelType, Pool, PoolId,
    PoolMember, PoolStatus, PoolType, Route, RouteId, RouteType, ShipId,
};
use crate::period::ReportingPeriod;
use crate::pooling::{
    create_pool, update_pool, CreatePoolInput, PoolAllocation, PoolLedger, PoolUpdate,
};
use crate::storage::{ComplianceQuery, Storage};

#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    pub origin_port: String,
    pub destination_port: String,
    pub distance: f64,
    pub route_type: RouteType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComplianceRecord {
    pub ship_id: ShipId,
    pub route_id: RouteId,
    pub voyage_id: String,
    pub fuel_type: FuelType,
    pub fuel_consumption: f64,
    pub energy_content: f64,
    pub ghg_intensity: f64,
    pub reporting_period: ReportingPeriod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPool {
    pub name: String,
    pub description: Option<String>,
    pub pool_type: PoolType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_compliance_units: Option<f64>,
    pub allocated_compliance_units: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BankSurplusCommand {
    pub ship_id: ShipId,
    pub reporting_period: ReportingPeriod,
    pub surplus_units: f64,
    pub banking_date: DateTime<Utc>,
    pub max_banking_capacity: Option<f64>,
    pub banking_validity_years: Option<u32>,
}

pub struct LedgerService<S: Storage> {
    storage: S,
    config: LedgerConfig,
}

impl<S: Storage> LedgerService<S> {
    pub fn new(storage: S, config: LedgerConfig) -> Self {
        Self { storage, config }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    // Routes

    pub fn create_route(
        &mut self,
        input: NewRoute,
        now: DateTime<Utc>,
    ) -> Result<Route, LedgerError> {
        let origin_port = input.origin_port.trim();
        let destination_port = input.destination_port.trim();
        if origin_port.is_empty() {
            return Err(LedgerError::validation("Origin port is required"));
        }
        if destination_port.is_empty() {
            return Err(LedgerError::validation("Destination port is required"));
        }
        if !(input.distance > 0.0) {
            return Err(LedgerError::validation("Distance must be positive"));
        }

        let route = Route {
            id: RouteId(generate_id()),
            origin_port: origin_port.to_string(),
            destination_port: destination_port.to_string(),
            distance: input.distance,
            route_type: input.route_type,
            created_at: now,
            updated_at: now,
        };
        self.storage.upsert_route(route.clone())?;
        info!(
            route_id = %route.id.0,
            origin = %route.origin_port,
            destination = %route.destination_port,
            "route created"
        );
        Ok(route)
    }

    pub fn list_routes(&self) -> Result<Vec<Route>, LedgerError> {
        Ok(self.storage.list_routes()?)
    }

    pub fn find_routes_by_ports(
        &self,
        origin_port: &str,
        destination_port: &str,
    ) -> Result<Vec<Route>, LedgerError> {
        Ok(self
            .storage
            .list_routes()?
            .into_iter()
            .filter(|r| {
                r.origin_port.eq_ignore_ascii_case(origin_port)
                    && r.destination_port.eq_ignore_ascii_case(destination_port)
            })
            .collect())
    }

    // Compliance records

    /// Store a voyage report; its status follows the intensity comparison.
    pub fn record_compliance(
        &mut self,
        input: NewComplianceRecord,
        now: DateTime<Utc>,
    ) -> Result<ComplianceRecord, LedgerError> {
        if input.ship_id.0.trim().is_empty() {
            return Err(LedgerError::validation("Ship ID is required"));
        }
        if input.voyage_id.trim().is_empty() {
            return Err(LedgerError::validation("Voyage ID is required"));
        }
        if !(input.fuel_consumption > 0.0) {
            return Err(LedgerError::validation("Fuel consumption must be positive"));
        }
        if !(input.energy_content > 0.0) {
            return Err(LedgerError::validation("Energy content must be positive"));
        }
        if !(input.ghg_intensity >= 0.0) {
            return Err(LedgerError::validation("GHG intensity must be non-negative"));
        }
        if self.storage.load_route(&input.route_id)?.is_none() {
            return Err(LedgerError::not_found("route", input.route_id.0));
        }

        let record = ComplianceRecord {
            id: ComplianceId(generate_id()),
            compliance_status: status_for_intensity(input.ghg_intensity),
            ship_id: input.ship_id,
            route_id: input.route_id,
            voyage_id: input.voyage_id,
            fuel_type: input.fuel_type,
            fuel_consumption: input.fuel_consumption,
            energy_content: input.energy_content,
            ghg_intensity: input.ghg_intensity,
            reporting_period: input.reporting_period,
            created_at: now,
            updated_at: now,
        };
        self.storage.upsert_compliance(record.clone())?;
        info!(
            record_id = %record.id.0,
            ship_id = %record.ship_id.0,
            period = %record.reporting_period,
            status = ?record.compliance_status,
            "compliance recorded"
        );
        Ok(record)
    }

    pub fn compliance_metrics_for_ship(
        &self,
        ship_id: &ShipId,
        period: Option<ReportingPeriod>,
    ) -> Result<ComplianceMetrics, LedgerError> {
        let query = ComplianceQuery {
            ship_id: Some(ship_id.clone()),
            reporting_period: period,
            ..Default::default()
        };
        let records = self.storage.list_compliance(&query)?;
        Ok(ComplianceMetrics::compute(&records))
    }

    pub fn compliance_metrics_for_route(
        &self,
        route_id: &RouteId,
        period: Option<ReportingPeriod>,
    ) -> Result<ComplianceMetrics, LedgerError> {
        let query = ComplianceQuery {
            route_id: Some(route_id.clone()),
            reporting_period: period,
            ..Default::default()
        };
        let records = self.storage.list_compliance(&query)?;
        Ok(ComplianceMetrics::compute(&records))
    }

    // Banking

    /// Bank a ship's surplus under the configured policy. An entry is
    /// persisted only when something positive was banked.
    pub fn bank_surplus_for_ship(
        &mut self,
        command: BankSurplusCommand,
    ) -> Result<(BankingResult, Option<BankEntry>), LedgerError> {
        let input = self.config.banking_input(
            command.surplus_units,
            command.banking_date,
            command.max_banking_capacity,
            command.banking_validity_years,
        );
        let result = bank_surplus(&input);
        debug!(
            ship_id = %command.ship_id.0,
            banked = result.banked_units,
            remaining = result.remaining_surplus,
            "surplus banked"
        );

        if result.banked_units <= 0.0 {
            return Ok((result, None));
        }

        let entry = BankEntry {
            id: BankEntryId(generate_id()),
            ship_id: command.ship_id,
            reporting_period: command.reporting_period,
            units: result.banked_units,
            banked_at: result.banked_at,
            expiry_date: result.expiry_date,
        };
        self.storage.upsert_bank_entry(entry.clone())?;
        info!(
            entry_id = %entry.id.0,
            ship_id = %entry.ship_id.0,
            units = entry.units,
            expiry = %entry.expiry_date,
            "bank entry stored"
        );
        Ok((result, Some(entry)))
    }

    /// Cover a ship's deficit from its bank. Consumed entries are deleted,
    /// partially consumed ones shrink, expired ones are left for
    /// [`reap_expired`](Self::reap_expired).
    pub fn apply_banked_for_ship(
        &mut self,
        ship_id: &ShipId,
        deficit: f64,
        application_date: DateTime<Utc>,
    ) -> Result<ApplicationResult, LedgerError> {
        let entries = self.storage.list_bank_entries(Some(ship_id))?;
        let units: Vec<_> = entries.iter().map(BankEntry::as_banked_unit).collect();
        let result = apply_banked(deficit, &units, application_date);

        for used in &result.used_banked_units {
            let id = BankEntryId(used.banked_unit_id.clone());
            match result
                .unused_banked_units
                .iter()
                .find(|u| u.id == used.banked_unit_id)
            {
                Some(residual) => {
                    if let Some(entry) = entries.iter().find(|e| e.id == id) {
                        self.storage.upsert_bank_entry(BankEntry {
                            units: residual.units,
                            ..entry.clone()
                        })?;
                    }
                }
                None => self.storage.delete_bank_entry(&id)?,
            }
        }

        info!(
            ship_id = %ship_id.0,
            applied = result.applied_units,
            remaining_deficit = result.remaining_deficit,
            entries_used = result.used_banked_units.len(),
            "banked units applied"
        );
        Ok(result)
    }

    /// Delete and return every bank entry that expired before `date`.
    pub fn reap_expired(&mut self, date: DateTime<Utc>) -> Result<Vec<BankEntry>, LedgerError> {
        let expired: Vec<_> = self
            .storage
            .list_bank_entries(None)?
            .into_iter()
            .filter(|e| e.is_expired_at(date))
            .collect();
        for entry in &expired {
            self.storage.delete_bank_entry(&entry.id)?;
            warn!(
                entry_id = %entry.id.0,
                ship_id = %entry.ship_id.0,
                units = entry.units,
                "bank entry expired"
            );
        }
        Ok(expired)
    }

    pub fn bank_entries(&self, ship_id: Option<&ShipId>) -> Result<Vec<BankEntry>, LedgerError> {
        Ok(self.storage.list_bank_entries(ship_id)?)
    }

    // Pools

    pub fn create_pool(&mut self, input: NewPool, now: DateTime<Utc>) -> Result<Pool, LedgerError> {
        let pool = create_pool(CreatePoolInput {
            id: PoolId(generate_id()),
            name: input.name,
            description: input.description,
            pool_type: input.pool_type,
            start_date: input.start_date,
            end_date: input.end_date,
            total_compliance_units: input.total_compliance_units,
            allocated_compliance_units: input.allocated_compliance_units,
            created_at: now,
        })?;
        self.storage.upsert_pool(pool.clone())?;
        info!(pool_id = %pool.id.0, name = %pool.name, "pool created");
        Ok(pool)
    }

    pub fn update_pool(
        &mut self,
        pool_id: &PoolId,
        update: PoolUpdate,
        now: DateTime<Utc>,
    ) -> Result<Pool, LedgerError> {
        let pool = self.get_pool(pool_id)?;
        let next = update_pool(&pool, update, now)?;
        self.storage.upsert_pool(next.clone())?;
        info!(pool_id = %next.id.0, status = ?next.status, "pool updated");
        Ok(next)
    }

    pub fn get_pool(&self, pool_id: &PoolId) -> Result<Pool, LedgerError> {
        self.storage
            .load_pool(pool_id)?
            .ok_or_else(|| LedgerError::not_found("pool", pool_id.0.clone()))
    }

    pub fn list_pools(&self, status: Option<PoolStatus>) -> Result<Vec<Pool>, LedgerError> {
        Ok(self.storage.list_pools(status)?)
    }

    pub fn members(&self, pool_id: &PoolId) -> Result<Vec<PoolMember>, LedgerError> {
        self.get_pool(pool_id)?;
        Ok(self.storage.list_members(pool_id)?)
    }

    /// Pools the ship holds a seat in.
    pub fn pools_for_ship(&self, ship_id: &ShipId) -> Result<Vec<Pool>, LedgerError> {
        let mut pools = Vec::new();
        for membership in self.storage.list_memberships(ship_id)? {
            if let Some(pool) = self.storage.load_pool(&membership.pool_id)? {
                pools.push(pool);
            }
        }
        Ok(pools)
    }

    pub fn add_member(
        &mut self,
        pool_id: &PoolId,
        ship_id: ShipId,
        units: f64,
        now: DateTime<Utc>,
    ) -> Result<PoolMember, LedgerError> {
        let ledger = self.load_ledger(pool_id)?;
        let ledger = ledger.add_member(ship_id.clone(), units, now)?;
        let member = ledger
            .member(&ship_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found("pool member", ship_id.0.clone()))?;
        self.store_ledger(ledger)?;
        info!(
            pool_id = %pool_id.0,
            ship_id = %ship_id.0,
            units,
            contribution = member.contribution,
            "member added"
        );
        Ok(member)
    }

    /// Remove a ship from a pool. Unknown ships are a no-op; unknown pools
    /// are not.
    pub fn remove_member(
        &mut self,
        pool_id: &PoolId,
        ship_id: &ShipId,
        now: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let ledger = self.load_ledger(pool_id)?;
        if ledger.member(ship_id).is_none() {
            warn!(pool_id = %pool_id.0, ship_id = %ship_id.0, "no member to remove");
            return Ok(());
        }
        self.store_ledger(ledger.remove_member(ship_id, now))?;
        info!(pool_id = %pool_id.0, ship_id = %ship_id.0, "member removed");
        Ok(())
    }

    pub fn allocate_units(&mut self, allocation: &PoolAllocation) -> Result<(), LedgerError> {
        let ledger = self.load_ledger(&allocation.pool_id)?;
        let ledger = ledger.allocate_units(allocation)?;
        debug!(
            pool_id = %allocation.pool_id.0,
            allocated = ledger.pool().allocated_compliance_units,
            "pool allocation recomputed"
        );
        self.store_ledger(ledger)?;
        info!(
            pool_id = %allocation.pool_id.0,
            ship_id = %allocation.ship_id.0,
            units = allocation.units,
            "units allocated"
        );
        Ok(())
    }

    fn load_ledger(&self, pool_id: &PoolId) -> Result<PoolLedger, LedgerError> {
        let pool = self.get_pool(pool_id)?;
        let members = self.storage.list_members(pool_id)?;
        Ok(PoolLedger::new(pool, members))
    }

    fn store_ledger(&mut self, ledger: PoolLedger) -> Result<(), LedgerError> {
        let (pool, members) = ledger.into_parts();
        self.storage.save_pool_snapshot(pool, members)?;
        Ok(())
    }
}
