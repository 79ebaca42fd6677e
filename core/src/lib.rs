pub mod banking;
pub mod compliance;
pub mod config;
pub mod error;
pub mod ffi;
pub mod memory_storage;
pub mod models;
pub mod period;
pub mod pooling;
pub mod service;
pub mod storage;
pub mod wire;

uniffi::setup_scaffolding!();

pub use banking::{
    apply_banked, bank_surplus, ApplicationResult, BankedUnit, BankingInput, BankingResult,
    UsedBankedUnit,
};
pub use compliance::{
    compute_cb, compute_comparison, ComparisonResult, ComplianceBalanceResult, ComplianceMetrics,
    TARGET_GHG_INTENSITY,
};
pub use config::{BankingPolicy, LedgerConfig};
pub use error::{BoundaryError, LedgerError, PeriodError, StorageError};
pub use memory_storage::MemoryStorage;
pub use models::{
    BankEntry, BankEntryId, ComplianceId, ComplianceRecord, ComplianceStatus, FuelType, Pool,
    PoolId, PoolMember, PoolMemberId, PoolStatus, PoolType, Route, RouteId, RouteType, ShipId,
};
pub use period::ReportingPeriod;
pub use pooling::{create_pool, CreatePoolInput, PoolAllocation, PoolLedger, PoolUpdate};
pub use service::{BankSurplusCommand, LedgerService, NewComplianceRecord, NewPool, NewRoute};
pub use storage::{ComplianceQuery, Storage};
