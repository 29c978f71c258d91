//! Dashboard
//!
//! Headline cards, counts per agreement type, the trailing 12-month transfer
//! series and the alert-bucket distribution, over every agreement.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::error::ConvenioResult;
use crate::models::alert::{RED_THRESHOLD_DAYS, YELLOW_THRESHOLD_DAYS};
use crate::models::money::decimal;
use crate::models::{Agreement, AlertBucket, Money, MoneyOverflow};
use crate::storage::Storage;

use super::series;

/// Months shown in the dashboard transfer series
pub const DASHBOARD_MONTHS: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardCards {
    #[serde(rename = "total_convenios")]
    pub total_agreements: usize,
    #[serde(rename = "total_repasse", with = "decimal")]
    pub total_transfer: Money,
    #[serde(rename = "total_contrapartida", with = "decimal")]
    pub total_counterpart: Money,
    /// Validity end within the next 30 days (today included)
    #[serde(rename = "vencendo_30")]
    pub expiring_30: usize,
    /// Validity end within the next 90 days (today included)
    #[serde(rename = "vencendo_90")]
    pub expiring_90: usize,
    #[serde(rename = "vencidos")]
    pub expired: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeTotal {
    #[serde(rename = "tipo")]
    pub type_code: String,
    #[serde(rename = "qtd")]
    pub count: usize,
    #[serde(rename = "repasse", with = "decimal")]
    pub transfer: Money,
}

/// Parallel label/value arrays, the shape chart widgets consume
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledSeries<T> {
    pub labels: Vec<String>,
    pub values: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub cards: DashboardCards,
    #[serde(rename = "por_tipo")]
    pub by_type: Vec<TypeTotal>,
    #[serde(rename = "repasse_por_mes")]
    pub transfer_by_month: LabeledSeries<f64>,
    #[serde(rename = "alertas")]
    pub alerts: LabeledSeries<usize>,
}

impl Dashboard {
    pub fn generate(storage: &Storage, today: NaiveDate) -> ConvenioResult<Self> {
        let agreements = storage.agreements.get_all()?;
        Ok(Self::from_agreements(&agreements, today)?)
    }

    pub fn from_agreements(agreements: &[Agreement], today: NaiveDate) -> Result<Self, MoneyOverflow> {
        let within = |days: i64| {
            let horizon = today + Duration::days(days);
            agreements
                .iter()
                .filter(|a| today <= a.validity_end && a.validity_end <= horizon)
                .count()
        };

        let cards = DashboardCards {
            total_agreements: agreements.len(),
            total_transfer: Money::checked_sum(agreements.iter().map(|a| a.transfer_amount))?,
            total_counterpart: Money::checked_sum(agreements.iter().map(|a| a.counterpart_amount))?,
            expiring_30: within(RED_THRESHOLD_DAYS),
            expiring_90: within(YELLOW_THRESHOLD_DAYS),
            expired: agreements.iter().filter(|a| a.validity_end < today).count(),
        };

        let mut by_type: BTreeMap<&'static str, (usize, Money)> = BTreeMap::new();
        for agreement in agreements {
            let entry = by_type
                .entry(agreement.agreement_type.code())
                .or_insert((0, Money::zero()));
            entry.0 += 1;
            entry.1 = entry.1.checked_add(agreement.transfer_amount).ok_or(MoneyOverflow)?;
        }
        let by_type = by_type
            .into_iter()
            .map(|(code, (count, transfer))| TypeTotal {
                type_code: code.to_string(),
                count,
                transfer,
            })
            .collect();

        let (labels, values): (Vec<String>, Vec<f64>) = series::trailing(agreements, today, DASHBOARD_MONTHS)?
            .into_iter()
            .map(|(month, amount)| (month.to_string(), amount.to_f64()))
            .unzip();

        let mut bucket_counts = [0usize; 4];
        for agreement in agreements {
            let bucket = agreement.alert(today);
            if let Some(slot) = AlertBucket::ALL.iter().position(|b| *b == bucket) {
                bucket_counts[slot] += 1;
            }
        }

        Ok(Self {
            cards,
            by_type,
            transfer_by_month: LabeledSeries { labels, values },
            alerts: LabeledSeries {
                labels: AlertBucket::ALL.iter().map(|b| b.label().to_string()).collect(),
                values: bucket_counts.to_vec(),
            },
        })
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str("Painel de Convênios\n");
        output.push_str(&"=".repeat(60));
        output.push('\n');

        let c = &self.cards;
        output.push_str(&format!("Convênios:          {:>20}\n", c.total_agreements));
        output.push_str(&format!("Total repasse:      {:>20}\n", c.total_transfer));
        output.push_str(&format!("Total contrapartida:{:>20}\n", c.total_counterpart));
        output.push_str(&format!("Vencendo em 30d:    {:>20}\n", c.expiring_30));
        output.push_str(&format!("Vencendo em 90d:    {:>20}\n", c.expiring_90));
        output.push_str(&format!("Vencidos:           {:>20}\n", c.expired));
        output.push('\n');

        output.push_str(&format!("{:<20} {:>8} {:>20}\n", "Tipo", "Qtd", "Repasse"));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for row in &self.by_type {
            output.push_str(&format!(
                "{:<20} {:>8} {:>20}\n",
                row.type_code, row.count, row.transfer
            ));
        }
        output.push('\n');

        output.push_str("Alertas\n");
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for (label, value) in self.alerts.labels.iter().zip(&self.alerts.values) {
            output.push_str(&format!("{:<20} {:>8}\n", label, value));
        }

        output
    }
}
