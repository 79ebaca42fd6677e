//! Ledger configuration.
//!
//! Only policy knobs live here. The regulatory target and the energy
//! conversion factor are fixed in `compliance`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::banking::{BankingInput, DEFAULT_VALIDITY_YEARS};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankingPolicy {
    /// Years a banked surplus stays usable.
    pub validity_years: u32,
    /// Cap on a single banking operation; `None` is unbounded.
    pub max_capacity: Option<f64>,
}

impl Default for BankingPolicy {
    fn default() -> Self {
        Self {
            validity_years: DEFAULT_VALIDITY_YEARS,
            max_capacity: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerConfig {
    pub banking: BankingPolicy,
}

impl LedgerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Banking input under this policy. Per-request values win over policy.
    pub fn banking_input(
        &self,
        surplus_units: f64,
        banking_date: DateTime<Utc>,
        max_capacity: Option<f64>,
        validity_years: Option<u32>,
    ) -> BankingInput {
        let input = BankingInput::new(surplus_units, banking_date)
            .with_validity_years(validity_years.unwrap_or(self.banking.validity_years));
        match max_capacity.or(self.banking.max_capacity) {
            Some(capacity) => input.with_capacity(capacity),
            None => input,
        }
    }
}
