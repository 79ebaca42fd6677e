//! Reporting periods.
//!
//! Fuel and voyage data is aggregated per ship over a calendar month,
//! written `YYYY-MM` (e.g. `2024-03`).

use std::fmt;
use std::str::FromStr;

use nom::{
    bytes::complete::take_while_m_n,
    character::complete::char,
    combinator::{all_consuming, map_res},
    sequence::separated_pair,
    IResult, Parser,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PeriodError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportingPeriod {
    year: i32,
    month: u32,
}

impl ReportingPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Parse a `YYYY-MM` string.
    pub fn parse(input: &str) -> Result<Self, PeriodError> {
        match all_consuming(year_month).parse(input) {
            Ok((_, (year, month))) => Self::new(year, month),
            Err(_) => Err(PeriodError::Format(input.to_string())),
        }
    }
}

fn four_digits(input: &str) -> IResult<&str, &str> {
    take_while_m_n(4, 4, |c: char| c.is_ascii_digit()).parse(input)
}

fn two_digits(input: &str) -> IResult<&str, &str> {
    take_while_m_n(2, 2, |c: char| c.is_ascii_digit()).parse(input)
}

fn year_month(input: &str) -> IResult<&str, (i32, u32)> {
    separated_pair(
        map_res(four_digits, |s: &str| s.parse::<i32>()),
        char('-'),
        map_res(two_digits, |s: &str| s.parse::<u32>()),
    )
    .parse(input)
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for ReportingPeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for ReportingPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReportingPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
