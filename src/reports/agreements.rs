//! Filtered agreement report
//!
//! Totals, breakdowns by type and status, the sparse monthly transfer series
//! and a capped listing over the agreements matching an [`AgreementFilter`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ConvenioResult;
use crate::models::money::decimal;
use crate::models::{Agreement, AgreementId, Money, MoneyOverflow};
use crate::storage::Storage;

use super::filter::AgreementFilter;
use super::series::{self, MonthlyTransfer};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeCount {
    #[serde(rename = "tipo")]
    pub type_code: String,
    #[serde(rename = "qtd")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    #[serde(rename = "status")]
    pub status_code: String,
    #[serde(rename = "qtd")]
    pub count: usize,
}

/// One line of the report listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: AgreementId,
    #[serde(rename = "numero_convenio")]
    pub instrument_number: Option<String>,
    #[serde(rename = "numero_proposta")]
    pub proposal_number: Option<String>,
    #[serde(rename = "numero_indicacao")]
    pub indication_number: Option<String>,
    #[serde(rename = "orgao_concedente")]
    pub agency: String,
    #[serde(rename = "parlamentar_nome")]
    pub legislator_name: Option<String>,
    #[serde(rename = "tipo")]
    pub type_code: &'static str,
    pub status: &'static str,
    #[serde(rename = "repasse_recebido")]
    pub transfer_received: bool,
    #[serde(rename = "valor_repasse", with = "decimal")]
    pub transfer_amount: Money,
    #[serde(rename = "valor_contrapartida", with = "decimal")]
    pub counterpart_amount: Money,
    #[serde(rename = "vigencia_inicio")]
    pub validity_start: Option<NaiveDate>,
    #[serde(rename = "vigencia_fim")]
    pub validity_end: NaiveDate,
}

impl From<&Agreement> for ReportRow {
    fn from(a: &Agreement) -> Self {
        Self {
            id: a.id,
            instrument_number: a.instrument_number.clone(),
            proposal_number: a.proposal_number.clone(),
            indication_number: a.indication_number.clone(),
            agency: a.agency.clone(),
            legislator_name: a.legislator_name.clone(),
            type_code: a.agreement_type.code(),
            status: a.status.code(),
            transfer_received: a.transfer_received,
            transfer_amount: a.transfer_amount,
            counterpart_amount: a.counterpart_amount,
            validity_start: a.validity_start,
            validity_end: a.validity_end,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgreementReport {
    #[serde(skip)]
    pub filter: AgreementFilter,
    #[serde(rename = "qtd_total")]
    pub total_count: usize,
    #[serde(rename = "total_repasse", with = "decimal")]
    pub total_transfer: Money,
    #[serde(rename = "total_contrapartida", with = "decimal")]
    pub total_counterpart: Money,
    #[serde(rename = "total_geral", with = "decimal")]
    pub grand_total: Money,
    #[serde(rename = "por_tipo")]
    pub by_type: Vec<TypeCount>,
    #[serde(rename = "por_status")]
    pub by_status: Vec<StatusCount>,
    #[serde(rename = "repasse_por_mes")]
    pub transfer_by_month: Vec<MonthlyTransfer>,
    /// First `list_limit` matches, latest validity end first
    #[serde(rename = "lista")]
    pub listing: Vec<ReportRow>,
    /// Every match, in listing order (PDF and CSV exports are not capped)
    #[serde(skip)]
    pub agreements: Vec<Agreement>,
}

impl AgreementReport {
    pub fn generate(
        storage: &Storage,
        filter: AgreementFilter,
        today: NaiveDate,
        list_limit: usize,
    ) -> ConvenioResult<Self> {
        let agreements = filter.apply(storage.agreements.get_all()?, today);
        tracing::debug!(matched = agreements.len(), "report generated");
        Ok(Self::from_matches(filter, agreements, list_limit)?)
    }

    /// Build from agreements that already passed `filter`
    pub fn from_matches(
        filter: AgreementFilter,
        mut agreements: Vec<Agreement>,
        list_limit: usize,
    ) -> Result<Self, MoneyOverflow> {
        agreements.sort_by(|a, b| {
            b.validity_end
                .cmp(&a.validity_end)
                .then_with(|| a.agency.cmp(&b.agency))
        });

        let total_transfer = Money::checked_sum(agreements.iter().map(|a| a.transfer_amount))?;
        let total_counterpart = Money::checked_sum(agreements.iter().map(|a| a.counterpart_amount))?;
        let grand_total = total_transfer
            .checked_add(total_counterpart)
            .ok_or(MoneyOverflow)?;

        let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
        let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
        for agreement in &agreements {
            *by_type.entry(agreement.agreement_type.code()).or_default() += 1;
            *by_status.entry(agreement.status.code()).or_default() += 1;
        }

        Ok(Self {
            total_count: agreements.len(),
            total_transfer,
            total_counterpart,
            grand_total,
            by_type: by_type
                .into_iter()
                .map(|(code, count)| TypeCount {
                    type_code: code.to_string(),
                    count,
                })
                .collect(),
            by_status: by_status
                .into_iter()
                .map(|(code, count)| StatusCount {
                    status_code: code.to_string(),
                    count,
                })
                .collect(),
            transfer_by_month: series::sparse(&agreements)?,
            listing: agreements.iter().take(list_limit).map(ReportRow::from).collect(),
            agreements,
            filter,
        })
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str("Relatório Geral de Convênios\n");
        output.push_str(&"=".repeat(96));
        output.push('\n');

        let params = self.filter.params();
        if !params.is_empty() {
            let applied: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            output.push_str(&format!("Filtros: {}\n", applied.join(", ")));
        }

        output.push_str(&format!("Convênios:           {:>20}\n", self.total_count));
        output.push_str(&format!("Total repasse:       {:>20}\n", self.total_transfer));
        output.push_str(&format!("Total contrapartida: {:>20}\n", self.total_counterpart));
        output.push_str(&format!("Total geral:         {:>20}\n", self.grand_total));
        output.push('\n');

        if self.agreements.is_empty() {
            output.push_str("Nenhum convênio encontrado.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<14} {:<30} {:<13} {:<11} {:>18} {:>10}\n",
            "Número", "Órgão", "Tipo", "Status", "Repasse", "Fim"
        ));
        output.push_str(&"-".repeat(96));
        output.push('\n');

        for agreement in self.agreements.iter().take(self.listing.len()) {
            output.push_str(&format!(
                "{:<14} {:<30} {:<13} {:<11} {:>18} {:>10}\n",
                truncate(agreement.reference(), 14),
                truncate(&agreement.agency, 30),
                agreement.agreement_type.code(),
                agreement.status.code(),
                agreement.transfer_amount,
                agreement.validity_end.format("%d/%m/%Y")
            ));
        }

        if self.listing.len() < self.agreements.len() {
            output.push_str(&format!(
                "... {} more\n",
                self.agreements.len() - self.listing.len()
            ));
        }

        output
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgreementStatus, AgreementType};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn agreement(kind: AgreementType, status: AgreementStatus, end: NaiveDate) -> Agreement {
        let mut a = Agreement::new(kind, "Ministério", "Objeto", end);
        a.status = status;
        a.transfer_amount = Money::from_cents(100_000);
        a.counterpart_amount = Money::from_cents(50_000);
        a
    }

    fn sample() -> Vec<Agreement> {
        vec![
            agreement(AgreementType::State, AgreementStatus::Proposed, date(2025, 1, 1)),
            agreement(AgreementType::Federal, AgreementStatus::Proposed, date(2026, 1, 1)),
            agreement(AgreementType::Federal, AgreementStatus::InExecution, date(2025, 6, 1)),
        ]
    }

    #[test]
    fn test_totals_and_breakdowns() {
        let report = AgreementReport::from_matches(AgreementFilter::default(), sample(), 200).unwrap();

        assert_eq!(report.total_count, 3);
        assert_eq!(report.total_transfer, Money::from_cents(300_000));
        assert_eq!(report.total_counterpart, Money::from_cents(150_000));
        assert_eq!(report.grand_total, Money::from_cents(450_000));
        assert_eq!(
            report.by_type,
            vec![
                TypeCount { type_code: "ESTADUAL".into(), count: 1 },
                TypeCount { type_code: "FEDERAL".into(), count: 2 },
            ]
        );
        assert_eq!(report.by_status[0].status_code, "EXECUCAO");
        assert_eq!(report.by_status[1].count, 2);
    }

    #[test]
    fn test_listing_latest_end_first_and_capped() {
        let report = AgreementReport::from_matches(AgreementFilter::default(), sample(), 2).unwrap();

        let ends: Vec<NaiveDate> = report.listing.iter().map(|r| r.validity_end).collect();
        assert_eq!(ends, vec![date(2026, 1, 1), date(2025, 6, 1)]);
        assert_eq!(report.agreements.len(), 3);
        assert_eq!(report.total_count, 3);
    }

    #[test]
    fn test_totals_past_i64_are_an_error() {
        let mut huge = sample();
        for a in &mut huge {
            a.transfer_amount = Money::from_cents(i64::MAX / 2);
        }
        let result = AgreementReport::from_matches(AgreementFilter::default(), huge, 200);
        assert_eq!(result.unwrap_err(), MoneyOverflow);
    }

    #[test]
    fn test_empty_report() {
        let report = AgreementReport::from_matches(AgreementFilter::default(), Vec::new(), 200).unwrap();
        assert_eq!(report.total_count, 0);
        assert!(report.by_type.is_empty());
        assert!(report.transfer_by_month.is_empty());
        assert_eq!(report.grand_total, Money::zero());
        assert!(report.format_terminal().contains("Nenhum convênio"));
    }

    #[test]
    fn test_json_keys() {
        let report = AgreementReport::from_matches(AgreementFilter::default(), sample(), 200).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["qtd_total"], 3);
        assert_eq!(json["total_geral"], 4500.0);
        assert_eq!(json["por_tipo"][0]["tipo"], "ESTADUAL");
        assert_eq!(json["por_status"][0]["status"], "EXECUCAO");
        let row = &json["lista"][0];
        assert_eq!(row["orgao_concedente"], "Ministério");
        assert_eq!(row["valor_repasse"], 1000.0);
        assert_eq!(row["vigencia_fim"], "2026-01-01");
        assert_eq!(row["repasse_recebido"], false);
        assert!(json.get("agreements").is_none());
    }
}
