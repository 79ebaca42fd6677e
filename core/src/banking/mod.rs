//! Compliance-surplus banking.
//!
//! Two pure transforms over plain records:
//!
//! - [`bank_surplus`] turns a positive Compliance Balance into a banked
//!   quantity with an expiry date, honouring an optional capacity cap.
//! - [`apply_banked`] covers a deficit from previously banked units, oldest
//!   first, skipping anything already expired.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use fueleu_compute::banking::{apply_banked, bank_surplus, BankingInput};
//!
//! let banked_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let banking = bank_surplus(&BankingInput::new(1000.0, banked_at));
//! let unit = banking.banked_unit("u1");
//!
//! let applied_on = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
//! let result = apply_banked(400.0, &[unit], applied_on);
//! assert_eq!(result.applied_units, 400.0);
//! assert_eq!(result.unused_banked_units[0].units, 600.0);
//! ```

pub mod allocator;
pub mod surplus;

pub use allocator::{apply_banked, ApplicationResult, BankedUnit, UsedBankedUnit};
pub use surplus::{add_years, bank_surplus, BankingInput, BankingResult, DEFAULT_VALIDITY_YEARS};
