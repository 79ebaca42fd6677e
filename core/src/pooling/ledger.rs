use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::models::{Pool, PoolId, PoolMember, PoolMemberId, ShipId};

/// Request to move `units` into a ship's share of a pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolAllocation {
    pub pool_id: PoolId,
    pub ship_id: ShipId,
    pub units: f64,
    pub allocation_date: DateTime<Utc>,
}

/// Snapshot of one pool and its members.
///
/// Every operation consumes the snapshot and returns the next one. The
/// caller must hold exclusive access to the pool's stored state between
/// loading the snapshot and persisting the result.
///
/// Invariants after each operation:
/// - `pool.allocated_compliance_units` moves by exactly the units added to or
///   removed from members, so `allocated - Σ member.allocated_units` is
///   constant (zero for a pool opened without pre-allocated units);
/// - each member's `contribution` is `allocated_units / Σ allocated_units * 100`.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolLedger {
    pool: Pool,
    members: Vec<PoolMember>,
}

impl PoolLedger {
    pub fn new(pool: Pool, members: Vec<PoolMember>) -> Self {
        Self { pool, members }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn members(&self) -> &[PoolMember] {
        &self.members
    }

    pub fn member(&self, ship_id: &ShipId) -> Option<&PoolMember> {
        self.members.iter().find(|m| &m.ship_id == ship_id)
    }

    pub fn into_parts(self) -> (Pool, Vec<PoolMember>) {
        (self.pool, self.members)
    }

    /// Sum of units held by members.
    pub fn member_units(&self) -> f64 {
        self.members.iter().map(|m| m.allocated_units).sum()
    }

    /// Pool units not attributed to any member.
    pub fn unattributed_units(&self) -> f64 {
        self.pool.allocated_compliance_units - self.member_units()
    }

    /// Deterministic member id for a ship's seat in a pool.
    pub fn member_id(pool_id: &PoolId, ship_id: &ShipId) -> PoolMemberId {
        PoolMemberId(format!("{}:{}", pool_id.0, ship_id.0))
    }

    /// Admit `ship_id` with `units`.
    ///
    /// The new member's contribution is `units / (Σ existing + units) * 100`;
    /// existing members' shares are rescaled against the same total.
    pub fn add_member(
        mut self,
        ship_id: ShipId,
        units: f64,
        joined_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if self.member(&ship_id).is_some() {
            return Err(LedgerError::validation(format!(
                "Ship {} is already a member of this pool",
                ship_id.0
            )));
        }

        self.members.push(PoolMember {
            id: Self::member_id(&self.pool.id, &ship_id),
            pool_id: self.pool.id.clone(),
            ship_id,
            allocated_units: units,
            contribution: 0.0,
            joined_at,
        });
        self.pool.allocated_compliance_units += units;
        self.pool.updated_at = joined_at;
        self.recompute_contributions();
        Ok(self)
    }

    /// Drop the member seated for `ship_id` and release its units.
    ///
    /// Unknown ships leave the ledger untouched.
    pub fn remove_member(mut self, ship_id: &ShipId, removed_at: DateTime<Utc>) -> Self {
        let Some(index) = self.members.iter().position(|m| &m.ship_id == ship_id) else {
            return self;
        };

        let removed = self.members.remove(index);
        self.pool.allocated_compliance_units -= removed.allocated_units;
        self.pool.updated_at = removed_at;
        self.recompute_contributions();
        self
    }

    /// Add units to a ship's share, admitting the ship if it has no seat yet.
    pub fn allocate_units(mut self, allocation: &PoolAllocation) -> Result<Self, LedgerError> {
        if allocation.pool_id != self.pool.id {
            return Err(LedgerError::validation(format!(
                "Allocation for pool {} applied to pool {}",
                allocation.pool_id.0, self.pool.id.0
            )));
        }

        let Some(index) = self
            .members
            .iter()
            .position(|m| m.ship_id == allocation.ship_id)
        else {
            return self.add_member(
                allocation.ship_id.clone(),
                allocation.units,
                allocation.allocation_date,
            );
        };

        self.members[index].allocated_units += allocation.units;
        self.pool.allocated_compliance_units += allocation.units;
        self.pool.updated_at = allocation.allocation_date;
        self.recompute_contributions();
        Ok(self)
    }

    fn recompute_contributions(&mut self) {
        let total = self.member_units();
        for member in &mut self.members {
            member.contribution = if total > 0.0 {
                member.allocated_units / total * 100.0
            } else {
                0.0
            };
        }
    }
}
