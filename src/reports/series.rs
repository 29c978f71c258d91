//! Monthly transfer series
//!
//! Agreements are bucketed by the calendar month of their validity start;
//! those without a start date are left out.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::models::money::decimal;
use crate::models::{Agreement, Money, MoneyOverflow};

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The `count` months ending at `current`, oldest first
    pub fn trailing(current: Month, count: usize) -> Vec<Month> {
        let mut months = Vec::with_capacity(count);
        let mut month = current;
        for _ in 0..count {
            months.push(month);
            month = month.previous();
        }
        months.reverse();
        months
    }
}

/// `YYYY-MM`
impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One point of the sparse series
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTransfer {
    #[serde(rename = "mes")]
    pub month: String,
    #[serde(rename = "repasse", with = "decimal")]
    pub amount: Money,
}

fn totals_by_month<'a, I>(agreements: I) -> Result<BTreeMap<Month, Money>, MoneyOverflow>
where
    I: IntoIterator<Item = &'a Agreement>,
{
    let mut totals = BTreeMap::new();
    for agreement in agreements {
        if let Some(start) = agreement.validity_start {
            let total = totals.entry(Month::of(start)).or_insert_with(Money::zero);
            *total = total
                .checked_add(agreement.transfer_amount)
                .ok_or(MoneyOverflow)?;
        }
    }
    Ok(totals)
}

/// Only months that have data, ascending
pub fn sparse<'a, I>(agreements: I) -> Result<Vec<MonthlyTransfer>, MoneyOverflow>
where
    I: IntoIterator<Item = &'a Agreement>,
{
    Ok(totals_by_month(agreements)?
        .into_iter()
        .map(|(month, amount)| MonthlyTransfer {
            month: month.to_string(),
            amount,
        })
        .collect())
}

/// Exactly `count` months ending at the month of `today`, zero-filled
pub fn trailing<'a, I>(
    agreements: I,
    today: NaiveDate,
    count: usize,
) -> Result<Vec<(Month, Money)>, MoneyOverflow>
where
    I: IntoIterator<Item = &'a Agreement>,
{
    let totals = totals_by_month(agreements)?;
    Ok(Month::trailing(Month::of(today), count)
        .into_iter()
        .map(|month| (month, totals.get(&month).copied().unwrap_or_default()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AgreementType;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn agreement(start: Option<NaiveDate>, cents: i64) -> Agreement {
        let mut a = Agreement::new(AgreementType::State, "SES", "Obj", date(2030, 1, 1));
        a.validity_start = start;
        a.transfer_amount = Money::from_cents(cents);
        a
    }

    #[test]
    fn test_month_label_and_wrap() {
        let jan = Month::of(date(2025, 1, 15));
        assert_eq!(jan.to_string(), "2025-01");
        assert_eq!(jan.previous().to_string(), "2024-12");
    }

    #[test]
    fn test_sparse_groups_and_sorts() {
        let agreements = vec![
            agreement(Some(date(2025, 3, 20)), 500),
            agreement(Some(date(2024, 11, 2)), 100),
            agreement(Some(date(2025, 3, 1)), 250),
            agreement(None, 9_999),
        ];

        let series = sparse(&agreements).unwrap();
        assert_eq!(
            series,
            vec![
                MonthlyTransfer { month: "2024-11".into(), amount: Money::from_cents(100) },
                MonthlyTransfer { month: "2025-03".into(), amount: Money::from_cents(750) },
            ]
        );
        assert!(sparse(&Vec::<Agreement>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_trailing_twelve_months_zero_filled() {
        let agreements = vec![
            agreement(Some(date(2025, 2, 10)), 1_000),
            agreement(Some(date(2024, 2, 10)), 7_000), // outside the window
        ];

        let series = trailing(&agreements, date(2025, 3, 31), 12).unwrap();
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].0.to_string(), "2024-04");
        assert_eq!(series[11].0.to_string(), "2025-03");
        assert!(series.windows(2).all(|w| w[0].0 < w[1].0));

        let feb = series.iter().find(|(m, _)| m.to_string() == "2025-02").unwrap();
        assert_eq!(feb.1, Money::from_cents(1_000));
        let total = Money::checked_sum(series.iter().map(|(_, m)| *m)).unwrap();
        assert_eq!(total, Money::from_cents(1_000));
    }

    #[test]
    fn test_sparse_serializes_with_report_keys() {
        let series = sparse(&vec![agreement(Some(date(2025, 1, 1)), 150_050)]).unwrap();
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json[0]["mes"], "2025-01");
        assert_eq!(json[0]["repasse"], 1500.5);
    }
}
