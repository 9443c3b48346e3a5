//! Validity windows derived from a query's temporal extent.

use chrono::{Months, NaiveDate};
use sdmx_model::Granularity;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// First and last calendar day covered by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ValidityWindow {
    pub fn valid_from(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    pub fn valid_to(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }
}

/// Compute the window spanned by `values` at the given granularity.
///
/// Empty values are ignored; the extremes are the lexicographic minimum and
/// maximum, which order correctly for `YYYY`, `YYYYMM` and `YYYY-MM`.
/// Returns `None` when no value is present or an extreme does not parse.
pub fn validity_window<S: AsRef<str>>(values: &[S], granularity: Granularity) -> Option<ValidityWindow> {
    let present = values.iter().map(AsRef::as_ref).filter(|value| !value.is_empty());
    let min = present.clone().min()?;
    let max = present.max()?;
    let (first_year, first_month) = parse_period(min)?;
    let (last_year, last_month) = parse_period(max)?;

    let (from_month, to_month) = match granularity {
        Granularity::Year => (1, 12),
        Granularity::Month => (first_month?, last_month?),
        Granularity::Quarter => {
            let first = first_month?;
            let last = last_month?;
            (quarter_start(first), quarter_start(last) + 2)
        }
        Granularity::Inferred => (first_month.unwrap_or(1), last_month.unwrap_or(12)),
    };

    Some(ValidityWindow {
        from: NaiveDate::from_ymd_opt(first_year, from_month, 1)?,
        to: last_day_of_month(last_year, to_month)?,
    })
}

/// Split `YYYY`, `YYYYMM` or `YYYY-MM` into year and optional month.
fn parse_period(value: &str) -> Option<(i32, Option<u32>)> {
    let digits: String = value.chars().filter(|c| *c != '-').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    match digits.len() {
        4 => Some((digits.parse().ok()?, None)),
        6 => {
            let year = digits[..4].parse().ok()?;
            let month: u32 = digits[4..].parse().ok()?;
            (1..=12).contains(&month).then_some((year, Some(month)))
        }
        _ => None,
    }
}

fn quarter_start(month: u32) -> u32 {
    (month - 1) / 3 * 3 + 1
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}
