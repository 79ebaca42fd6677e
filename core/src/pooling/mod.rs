//! Compliance pools.
//!
//! A pool groups ships that share compliance units. [`create_pool`] and
//! [`update_pool`] validate pool definitions; [`PoolLedger`] keeps the pool's
//! allocated total and each member's contribution share consistent as units
//! are added, removed or reallocated.

pub mod ledger;
pub mod pool;

pub use ledger::{PoolAllocation, PoolLedger};
pub use pool::{create_pool, update_pool, CreatePoolInput, PoolUpdate};
