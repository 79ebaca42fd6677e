use chrono::{DateTime, Utc};

use crate::error::LedgerError;
use crate::models::{Pool, PoolId, PoolStatus, PoolType};

pub const ERR_DATE_ORDER: &str = "Start date must be before end date";
pub const ERR_EMPTY_NAME: &str = "Pool name cannot be empty";
pub const ERR_OVER_ALLOCATED: &str = "Allocated units cannot exceed total units";

#[derive(Debug, Clone, PartialEq)]
pub struct CreatePoolInput {
    pub id: PoolId,
    pub name: String,
    pub description: Option<String>,
    pub pool_type: PoolType,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_compliance_units: Option<f64>,
    pub allocated_compliance_units: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Validate a pool definition and build the pool in `Pending` status.
///
/// Checks run in order and the first violation is returned: start strictly
/// before end, non-blank name, allocated not above total when both are given.
pub fn create_pool(input: CreatePoolInput) -> Result<Pool, LedgerError> {
    if input.start_date >= input.end_date {
        return Err(LedgerError::validation(ERR_DATE_ORDER));
    }

    let name = input.name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation(ERR_EMPTY_NAME));
    }

    if let (Some(allocated), Some(total)) =
        (input.allocated_compliance_units, input.total_compliance_units)
    {
        if allocated > total {
            return Err(LedgerError::validation(ERR_OVER_ALLOCATED));
        }
    }

    Ok(Pool {
        id: input.id,
        name: name.to_string(),
        description: input.description.map(|d| d.trim().to_string()),
        pool_type: input.pool_type,
        status: PoolStatus::Pending,
        start_date: input.start_date,
        end_date: input.end_date,
        total_compliance_units: input.total_compliance_units.unwrap_or(0.0),
        allocated_compliance_units: input.allocated_compliance_units.unwrap_or(0.0),
        created_at: input.created_at,
        updated_at: input.created_at,
    })
}

/// Partial change to a pool definition. Unit totals are owned by the ledger
/// and cannot be edited here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub pool_type: Option<PoolType>,
    pub status: Option<PoolStatus>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Apply `update` to `pool`, re-validating the resulting definition.
pub fn update_pool(
    pool: &Pool,
    update: PoolUpdate,
    updated_at: DateTime<Utc>,
) -> Result<Pool, LedgerError> {
    let mut next = pool.clone();

    if let Some(name) = update.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation(ERR_EMPTY_NAME));
        }
        next.name = name.to_string();
    }
    if let Some(description) = update.description {
        next.description = Some(description.trim().to_string());
    }
    if let Some(pool_type) = update.pool_type {
        next.pool_type = pool_type;
    }
    if let Some(start) = update.start_date {
        next.start_date = start;
    }
    if let Some(end) = update.end_date {
        next.end_date = end;
    }
    if next.start_date >= next.end_date {
        return Err(LedgerError::validation(ERR_DATE_ORDER));
    }

    if let Some(status) = update.status {
        if status != pool.status && !pool.status.can_transition_to(status) {
            return Err(LedgerError::validation(format!(
                "Cannot change pool status from {:?} to {:?}",
                pool.status, status
            )));
        }
        next.status = status;
    }

    next.updated_at = updated_at;
    Ok(next)
}
