use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::banking::BankedUnit;

/// Years a banked surplus stays usable when no validity is given.
pub const DEFAULT_VALIDITY_YEARS: u32 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct BankingInput {
    pub surplus_units: f64,
    pub banking_date: DateTime<Utc>,
    /// Upper bound on the banked quantity. Unbounded by default.
    pub max_banking_capacity: f64,
    pub banking_validity_years: u32,
}

impl BankingInput {
    pub fn new(surplus_units: f64, banking_date: DateTime<Utc>) -> Self {
        Self {
            surplus_units,
            banking_date,
            max_banking_capacity: f64::INFINITY,
            banking_validity_years: DEFAULT_VALIDITY_YEARS,
        }
    }

    pub fn with_capacity(mut self, max_banking_capacity: f64) -> Self {
        self.max_banking_capacity = max_banking_capacity;
        self
    }

    pub fn with_validity_years(mut self, years: u32) -> Self {
        self.banking_validity_years = years;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankingResult {
    pub banked_units: f64,
    pub original_surplus: f64,
    pub banked_at: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    /// Part of the surplus left over once the capacity cap is hit.
    pub remaining_surplus: f64,
}

impl BankingResult {
    /// The banked quantity as an allocatable unit.
    pub fn banked_unit(&self, id: impl Into<String>) -> BankedUnit {
        BankedUnit {
            id: id.into(),
            units: self.banked_units,
            banked_at: self.banked_at,
            expiry_date: self.expiry_date,
        }
    }
}

/// Bank a surplus.
///
/// `banked = min(surplus, capacity)` and `remaining = max(0, surplus - capacity)`,
/// taken literally: a negative capacity yields a negative banked quantity and
/// a remainder larger than the surplus. `banked + remaining == surplus` holds
/// for every capacity.
pub fn bank_surplus(input: &BankingInput) -> BankingResult {
    let surplus = input.surplus_units;
    let capacity = input.max_banking_capacity;

    let banked_units = if surplus <= capacity { surplus } else { capacity };
    let overflow = surplus - capacity;
    let remaining_surplus = if overflow > 0.0 { overflow } else { 0.0 };

    BankingResult {
        banked_units,
        original_surplus: surplus,
        banked_at: input.banking_date,
        expiry_date: add_years(input.banking_date, input.banking_validity_years),
        remaining_surplus,
    }
}

/// Add whole calendar years, keeping the time of day.
///
/// Feb 29 lands on Feb 28 when the target year is not a leap year. Dates past
/// the representable range saturate at the maximum timestamp.
pub fn add_years(date: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    years
        .checked_mul(12)
        .and_then(|months| date.checked_add_months(Months::new(months)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
